use super::*;

fn frame(data: Vec<u8>, width: u32, height: u32) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data,
    }
}

#[test]
fn unpremultiply_restores_straight_color() {
    let f = frame(vec![128, 0, 64, 128, 10, 20, 30, 255, 0, 0, 0, 0], 3, 1);
    let out = unpremultiply(&f);
    assert_eq!(&out[0..4], &[255, 0, 128, 128]);
    assert_eq!(&out[4..8], &[10, 20, 30, 255]);
    assert_eq!(&out[8..12], &[0, 0, 0, 0]);
}

#[test]
fn writes_a_readable_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("frame.png");
    let f = frame([255u8, 0, 0, 255].repeat(4), 2, 2);
    frame_to_png(&f, &path).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
}

#[test]
fn rejects_short_buffers() {
    let dir = tempfile::tempdir().unwrap();
    let f = frame(vec![0; 4], 2, 2);
    assert!(frame_to_png(&f, &dir.path().join("x.png")).is_err());
}
