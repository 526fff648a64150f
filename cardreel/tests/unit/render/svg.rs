use super::*;

#[test]
fn xml_escape_handles_markup_and_controls() {
    assert_eq!(
        xml_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
    );
    assert_eq!(xml_escape("a\u{0}b\tc"), "ab\tc");
    assert_eq!(xml_escape("한글"), "한글");
}

#[test]
fn font_spec_attrs_include_spacing_only_when_set() {
    let spec = FontSpec {
        family: "Noto Sans KR, sans-serif",
        size: 72.0,
        weight: 700,
        letter_spacing: 0.0,
    };
    let attrs = spec.svg_attrs();
    assert!(attrs.contains(r#"font-size="72.000""#));
    assert!(attrs.contains(r#"font-weight="700""#));
    assert!(!attrs.contains("letter-spacing"));

    let spaced = FontSpec {
        letter_spacing: 1.5,
        ..spec
    };
    assert!(spaced.svg_attrs().contains(r#"letter-spacing="1.500""#));
}

#[test]
fn rasterizes_shapes_at_intrinsic_size() {
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    let tree = fonts
        .parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
                 <rect x="0" y="0" width="4" height="4" fill="#ff0000"/>
               </svg>"##,
        )
        .unwrap();
    let pm = rasterize(&tree).unwrap();
    assert_eq!((pm.width(), pm.height()), (8, 4));
    let px = pm.pixel(1, 1).unwrap();
    assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 0, 0, 255));
    assert_eq!(pm.pixel(6, 1).unwrap().alpha(), 0);
}

#[test]
fn blank_lines_measure_zero() {
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    assert_eq!(fonts.face_count(), 0);
    let spec = FontSpec {
        family: "sans-serif",
        size: 20.0,
        weight: 400,
        letter_spacing: 0.0,
    };
    assert_eq!(fonts.measure_line("   ", &spec).unwrap(), 0.0);
}

#[test]
fn invalid_markup_is_an_error() {
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    assert!(fonts.parse("<svg").is_err());
}
