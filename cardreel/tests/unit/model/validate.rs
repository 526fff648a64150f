use super::*;
use crate::model::project::Project;

const BASIC: &str = include_str!("../../fixtures/project_basic.json");

fn paths(p: &Project) -> Vec<String> {
    match validate_project(p) {
        Ok(()) => Vec::new(),
        Err(e) => e.errors.iter().map(|e| e.path()).collect(),
    }
}

#[test]
fn basic_fixture_is_valid() {
    let p = Project::from_json(BASIC).unwrap();
    validate_project(&p).unwrap();
    p.validate().unwrap();
}

#[test]
fn empty_card_list_is_rejected() {
    let p = Project::from_json(r#"{"scriptCards":[]}"#).unwrap();
    assert_eq!(paths(&p), vec!["$.scriptCards".to_owned()]);
}

#[test]
fn collects_every_problem_with_paths() {
    let mut p = Project::from_json(BASIC).unwrap();
    p.version = 2;
    p.output.width = 1081;
    p.script_cards[0].duration = 0.0;
    p.script_cards[1].tts_volume = 9.0;
    p.script_cards[2].style.color = "not-a-color".to_owned();
    p.script_cards[2].media.show_on_segment = 0;

    let got = paths(&p);
    for want in [
        "$.version",
        "$.output.width",
        "$.scriptCards[0].duration",
        "$.scriptCards[1].ttsVolume",
        "$.scriptCards[2].style.color",
        "$.scriptCards[2].media.showOnSegment",
    ] {
        assert!(got.iter().any(|g| g == want), "missing {want} in {got:?}");
    }
}

#[test]
fn duplicate_and_blank_ids_are_rejected() {
    let mut p = Project::from_json(BASIC).unwrap();
    p.script_cards[2].id = "c1".to_owned();
    p.script_cards[1].id = " ".to_owned();
    let got = paths(&p);
    assert!(got.contains(&"$.scriptCards[2].id".to_owned()));
    assert!(got.contains(&"$.scriptCards[1].id".to_owned()));
}

#[test]
fn persist_target_must_exist_and_not_precede() {
    let mut p = Project::from_json(BASIC).unwrap();
    p.script_cards[1].media.persist_until_card_id = Some("c1".to_owned());
    assert_eq!(
        paths(&p),
        vec!["$.scriptCards[1].media.persistUntilCardId".to_owned()]
    );

    p.script_cards[1].media.persist_until_card_id = Some("nope".to_owned());
    let err = validate_project(&p).unwrap_err();
    assert!(err.to_string().contains("unknown card id \"nope\""));

    // A card may end its own persistence.
    let own = p.script_cards[1].id.clone();
    p.script_cards[1].media.persist_until_card_id = Some(own);
    validate_project(&p).unwrap();
}

#[test]
fn animation_names_must_fit_their_slot() {
    let mut p = Project::from_json(BASIC).unwrap();
    p.script_cards[0].animations.text.enter.name = AnimName::FadeOut;
    p.script_cards[0].animations.media.exit.name = AnimName::Unknown;
    let got = paths(&p);
    assert!(got.contains(&"$.scriptCards[0].animations.text.in.name".to_owned()));
    assert!(got.contains(&"$.scriptCards[0].animations.media.out.name".to_owned()));
}

#[test]
fn validate_maps_into_validation_error() {
    let mut p = Project::from_json(BASIC).unwrap();
    p.render_metadata.source_width = 0.0;
    let err = p.validate().unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert!(err.to_string().contains("$.renderMetadata.sourceWidth"));
}
