use super::*;

const BASIC: &str = include_str!("../../fixtures/project_basic.json");

#[test]
fn basic_fixture_parses_with_defaults() {
    let p = Project::from_json(BASIC).unwrap();
    assert_eq!(p.version, 1);
    assert_eq!(p.script_cards.len(), 3);
    assert_eq!(p.output, OutputSettings::default());
    assert!((p.scale() - 3.0).abs() < 1e-12);
    assert!((p.total_duration_secs() - 4.5).abs() < 1e-12);
    assert_eq!(p.title(), Some("Morning Recap"));

    let header = &p.project_settings.header;
    assert_eq!(header.icon, HeaderIcon::Back);
    assert!((header.font_size - 18.0).abs() < 1e-12);
    assert!(header.logo.url.is_none(), "blank url reads as none");

    let c1 = &p.script_cards[0];
    assert!((c1.style.font_size - 24.0).abs() < 1e-12);
    assert!(c1.media.url.is_none());
    assert_eq!(c1.style.text_align, TextAlign::Center);
}

#[test]
fn numeric_ids_and_lenient_fields() {
    let p = Project::from_json(BASIC).unwrap();
    let c2 = &p.script_cards[1];
    assert_eq!(c2.id, "1700000000000");
    assert_eq!(c2.media.fit, MediaFit::Cover);
    assert_eq!(c2.media.persist_until_card_id.as_deref(), Some("c3"));
    assert!((c2.tts_volume - 1.0).abs() < 1e-12);

    let c3 = &p.script_cards[2];
    assert_eq!(c3.style.font_weight, 700);
    assert_eq!(c3.media.show_on_segment, 1);
    assert_eq!(c3.media.kind, MediaKind::Image);
}

#[test]
fn asset_urls_are_deduplicated_in_order() {
    let mut p = Project::from_json(BASIC).unwrap();
    p.script_cards[2].sfx_url = Some("https://cdn.example.com/whoosh.mp3".to_owned());
    assert_eq!(
        p.asset_urls(),
        vec![
            "https://cdn.example.com/bgm.mp3",
            "data:audio/mp3;base64,SUQz",
            "https://cdn.example.com/photo.png",
            "https://cdn.example.com/whoosh.mp3",
        ]
    );
}

#[test]
fn bgm_volume_defaults_to_point_three() {
    let p = Project::from_json(
        r#"{"globalBGM":{"url":"a.mp3"},"scriptCards":[{"id":"a","duration":1}]}"#,
    )
    .unwrap();
    let bgm = p.global_bgm.unwrap();
    assert!((bgm.volume - 0.3).abs() < 1e-12);
}

#[test]
fn placement_scale_zero_reads_as_one() {
    let pl = Placement {
        scale: 0.0,
        ..Placement::default()
    };
    assert_eq!(pl.effective_scale(), 1.0);
    let pl = Placement {
        scale: 1.5,
        ..Placement::default()
    };
    assert_eq!(pl.effective_scale(), 1.5);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Project::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ReelError::Serde(_)));
    let err = Project::from_json(r#"{"scriptCards":[{"id":"a"}]}"#).unwrap_err();
    assert!(err.to_string().contains("duration"));
}

#[test]
fn unknown_fields_are_ignored() {
    let p = Project::from_json(
        r#"{"scriptCards":[{"id":"a","duration":1,"editorOnly":true}],"whatever":{}}"#,
    )
    .unwrap();
    assert_eq!(p.script_cards.len(), 1);
}
