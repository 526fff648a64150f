use super::*;
use crate::model::project::Project;

fn card(json: &str) -> ScriptCard {
    let p = Project::from_json(&format!(r#"{{"scriptCards":[{json}]}}"#)).unwrap();
    p.script_cards.into_iter().next().unwrap()
}

#[test]
fn plain_mode_splits_on_newlines() {
    let c = card(r#"{"id":"a","duration":1,"text":"one\n\nthree"}"#);
    assert_eq!(step_count(&c), 1);
    assert_eq!(lines_at_step(&c, 0), vec!["one", " ", "three"]);
}

#[test]
fn segment_mode_reveals_by_start_time() {
    let c = card(
        r#"{"id":"a","duration":3,"animationSequence":["x"],
            "segments":[{"text":"A","startTime":0},{"text":"B","startTime":1},{"text":"","startTime":2}]}"#,
    );
    let th = reveal_thresholds(&c);
    assert_eq!(th, vec![0.0, 1.0, 2.0]);
    assert_eq!(reveal_step(&th, 0.0), 1);
    assert_eq!(reveal_step(&th, 0.99), 1);
    assert_eq!(reveal_step(&th, 1.0), 2);
    assert_eq!(lines_at_step(&c, 0), Vec::<String>::new());
    assert_eq!(lines_at_step(&c, 2), vec!["A", "B"]);
    assert_eq!(lines_at_step(&c, 3), vec!["A", "B", " "]);
}

#[test]
fn unsorted_segments_keep_document_order() {
    let c = card(
        r#"{"id":"a","duration":3,"animationSequence":["x"],
            "segments":[{"text":"late","startTime":2},{"text":"early","startTime":0.5}]}"#,
    );
    let th = reveal_thresholds(&c);
    assert_eq!(reveal_step(&th, 0.0), 0);
    assert_eq!(lines_at_step(&c, 1), vec!["early"]);
    assert_eq!(lines_at_step(&c, 2), vec!["late", "early"]);
}

#[test]
fn shared_start_times_collapse_into_one_step() {
    let c = card(
        r#"{"id":"a","duration":3,"animationSequence":["x"],
            "segments":[{"text":"A","startTime":0},{"text":"B","startTime":0}]}"#,
    );
    assert_eq!(step_count(&c), 2);
    assert_eq!(lines_at_step(&c, 1), vec!["A", "B"]);
}
