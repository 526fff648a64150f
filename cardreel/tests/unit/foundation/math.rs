use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn premultiply_leaves_opaque_pixels_alone() {
    let mut px = vec![200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[128, 128, 128, 128]);
}
