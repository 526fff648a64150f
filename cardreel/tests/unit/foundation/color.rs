use super::*;

#[test]
fn parses_hex_short_long_and_alpha() {
    assert_eq!(parse_css_color("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(
        parse_css_color("#FF8000").unwrap(),
        Rgba8::rgb(255, 128, 0)
    );
    let c = parse_css_color("#0000ff80").unwrap();
    assert_eq!(c.b, 255);
    assert_eq!(c.a, 128);
}

#[test]
fn parses_rgb_functions() {
    assert_eq!(
        parse_css_color("rgb(10, 20, 30)").unwrap(),
        Rgba8::rgb(10, 20, 30)
    );
    let c = parse_css_color("rgba(0,0,0,0.5)").unwrap();
    assert_eq!(c.a, 128);
    let c = parse_css_color("RGBA(0,0,0,50%)").unwrap();
    assert_eq!(c.a, 128);
}

#[test]
fn parses_names_and_transparent() {
    assert_eq!(parse_css_color("transparent").unwrap().a, 0);
    assert_eq!(parse_css_color(" White ").unwrap(), Rgba8::WHITE);
}

#[test]
fn rejects_garbage() {
    assert!(parse_css_color("").is_err());
    assert!(parse_css_color("#12").is_err());
    assert!(parse_css_color("#gggggg").is_err());
    assert!(parse_css_color("rgb(1,2)").is_err());
    assert!(parse_css_color("rgb(1,2,3").is_err());
    assert!(parse_css_color("chartreuse-ish").is_err());
}

#[test]
fn premultiply_and_svg_hex() {
    let c = Rgba8 {
        r: 255,
        g: 0,
        b: 0,
        a: 128,
    };
    assert_eq!(c.premultiplied(), [128, 0, 0, 128]);
    assert_eq!(Rgba8::rgb(1, 2, 255).svg_hex(), "#0102ff");
}
