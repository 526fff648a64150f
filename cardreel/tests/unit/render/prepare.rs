use super::*;
use std::path::Path;

fn fixture() -> Project {
    Project::from_json(include_str!("../../fixtures/project_basic.json")).unwrap()
}

fn no_fonts() -> FontSet {
    FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"))
}

#[test]
fn missing_assets_are_skipped_with_warnings() {
    let prepared = PreparedProject::prepare(&fixture(), &LocalAssets::new(), &no_fonts()).unwrap();
    assert_eq!(prepared.warnings().len(), 1);
    assert!(prepared.warnings()[0].contains("photo.png"));
    assert!(prepared.media_layer(1).is_none());
    assert_eq!(prepared.total_frames(), 135);
    assert_eq!(prepared.background(), Rgba8::rgb(0xfa, 0xfa, 0xfa));
}

#[test]
fn text_layers_exist_per_reveal_step() {
    let prepared = PreparedProject::prepare(&fixture(), &LocalAssets::new(), &no_fonts()).unwrap();
    assert!(prepared.text_layer(0, 0).is_some());
    // Segment card: step 0 shows nothing, steps 1 and 2 show one and two lines.
    assert!(prepared.text_layer(1, 0).is_none());
    let one = prepared.text_layer(1, 1).unwrap();
    let two = prepared.text_layer(1, 2).unwrap();
    assert!(two.height() > one.height());
    assert!(prepared.text_layer(1, 3).is_none());
    assert!(prepared.text_layer(9, 0).is_none());
}

#[test]
fn image_media_is_fitted_to_its_box() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 255, 0, 255]))
        .save(&path)
        .unwrap();

    let mut assets = LocalAssets::new();
    assets.insert("https://cdn.example.com/photo.png", &path);
    let prepared = PreparedProject::prepare(&fixture(), &assets, &no_fonts()).unwrap();

    assert!(prepared.warnings().is_empty());
    // Default box: 360 x 202.5 preview units at scale 3.
    match prepared.media_layer(1).unwrap() {
        MediaLayer::Image(p) => assert_eq!((p.width(), p.height()), (1080, 608)),
        MediaLayer::Video(_) => panic!("expected image layer"),
    }
}

#[test]
fn video_media_is_deferred_to_render_time() {
    let mut project = fixture();
    project.script_cards[1].media.kind = MediaKind::Video;
    project.script_cards[1].media.width = Some(100.0);
    project.script_cards[1].media.height = Some(50.0);

    let mut assets = LocalAssets::new();
    assets.insert("https://cdn.example.com/photo.png", "/tmp/clip.mp4");
    let prepared = PreparedProject::prepare(&project, &assets, &no_fonts()).unwrap();
    let layer = prepared.media_layer(1).unwrap();
    assert!(matches!(layer, MediaLayer::Video(_)));
    assert_eq!(layer.size(), (300, 150));
}

#[test]
fn undecodable_media_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    std::fs::write(&path, b"nope").unwrap();
    let mut assets = LocalAssets::new();
    assets.insert("https://cdn.example.com/photo.png", &path);
    assert!(PreparedProject::prepare(&fixture(), &assets, &no_fonts()).is_err());
}

#[test]
fn invalid_projects_are_rejected() {
    let mut project = fixture();
    project.script_cards[0].duration = 0.0;
    let err = PreparedProject::prepare(&project, &LocalAssets::new(), &no_fonts()).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}
