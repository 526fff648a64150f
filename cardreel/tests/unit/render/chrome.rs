use super::*;
use std::path::Path;

fn fixture() -> Project {
    Project::from_json(include_str!("../../fixtures/project_basic.json")).unwrap()
}

#[test]
fn groups_thousands() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1000), "1,000");
    assert_eq!(group_thousands(1234567), "1,234,567");
}

#[test]
fn meta_line_uses_author_and_views() {
    assert_eq!(meta_line(&fixture()), "cardreel | 조회수 12,345");
}

#[test]
fn layout_stacks_header_and_info_block() {
    let layout = ChromeLayout::new(&fixture());
    let expected_info = 16.0 + 20.0 * 1.3 + 5.0 + 13.0 * 1.3 + 16.0 + 1.0;
    assert!((layout.info_height - expected_info).abs() < 1e-9);
    assert!((layout.height() - (65.0 + expected_info)).abs() < 1e-9);
    assert!((layout.content_top - (65.0 + expected_info + 16.0)).abs() < 1e-9);
}

#[test]
fn chrome_paints_header_page_and_divider() {
    let project = fixture();
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    let pm = render_chrome(&fonts, &project, None).unwrap();

    let expected_h = (ChromeLayout::new(&project).height() * 3.0).ceil() as u32;
    assert_eq!((pm.width(), pm.height()), (1080, expected_h));

    let header = pm.pixel(5, 100).unwrap();
    assert_eq!((header.red(), header.alpha()), (255, 255));
    let page = pm.pixel(5, 300).unwrap();
    assert_eq!((page.red(), page.alpha()), (0xfa, 255));
    let divider = pm.pixel(5, expected_h - 1).unwrap();
    assert_eq!(divider.red(), 0xe5);
}

#[test]
fn logo_is_drawn_at_the_right_of_the_header() {
    let project = fixture();
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    let logo = tiny_skia::Pixmap::from_vec(
        [0u8, 0, 255, 255].repeat(4),
        tiny_skia::IntSize::from_wh(2, 2).unwrap(),
    )
    .unwrap();
    let pm = render_chrome(&fonts, &project, Some(&logo)).unwrap();

    // 28 units square at scale 3, right padding 15 units, centered in the 65 unit bar.
    let cx = 1080 - 45 - 42;
    let cy = 195 / 2;
    assert!(pm.pixel(cx, cy).unwrap().blue() >= 250);
    assert_eq!(pm.pixel(cx, cy).unwrap().red(), 0);
}

#[test]
fn invalid_colors_fail() {
    let mut project = fixture();
    project.project_settings.header.background_color = "not-a-color".into();
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    assert!(render_chrome(&fonts, &project, None).is_err());
}
