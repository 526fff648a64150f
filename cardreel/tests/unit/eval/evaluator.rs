use super::*;
use crate::animation::motion::AnimName;

const BASIC: &str = include_str!("../../fixtures/project_basic.json");

fn basic() -> Project {
    Project::from_json(BASIC).unwrap()
}

#[test]
fn persistent_media_is_carried_through_target_card() {
    let mut p = basic();
    p.script_cards.push(
        serde_json::from_str(r#"{"id":"c4","duration":1,"media":{"url":"own.png"}}"#).unwrap(),
    );
    assert_eq!(media_owners(&p), vec![0, 1, 1, 3]);
}

#[test]
fn newer_persistent_media_replaces_older() {
    let p = Project::from_json(
        r#"{"scriptCards":[
            {"id":"a","duration":1,"media":{"url":"a.png","persistUntilCardId":"d"}},
            {"id":"b","duration":1,"media":{"url":"b.png","persistUntilCardId":"c"}},
            {"id":"c","duration":1},
            {"id":"d","duration":1}
        ]}"#,
    )
    .unwrap();
    assert_eq!(media_owners(&p), vec![0, 1, 1, 3]);
}

#[test]
fn media_waits_for_show_segment_of_current_card() {
    let p = basic();
    let ev = Evaluator::new(&p).unwrap();
    // Card 1 starts at frame 60 and reveals media at segment 2 (t = 0.5s).
    let s = ev.eval_frame(FrameIndex(60)).unwrap();
    assert_eq!(s.card, 1);
    assert!(s.media.is_none());
    let s = ev.eval_frame(FrameIndex(75)).unwrap();
    assert_eq!(s.media.unwrap().owner, 1);

    // Card 2 has no segments: carried media shows immediately.
    let s = ev.eval_frame(FrameIndex(105)).unwrap();
    assert_eq!(s.card, 2);
    assert_eq!(s.media.unwrap().owner, 1);
}

#[test]
fn card_without_media_has_no_media_state() {
    let ev = Evaluator::new(&basic()).unwrap();
    let s = ev.eval_frame(FrameIndex(10)).unwrap();
    assert!(s.media.is_none());
    assert_eq!(ev.media_owner(0), None);
    assert_eq!(ev.media_owner(2), Some(1));
}

#[test]
fn text_motion_and_reveal_follow_local_time() {
    let ev = Evaluator::new(&basic()).unwrap();
    let s = ev.eval_frame(FrameIndex(0)).unwrap();
    assert_eq!(s.text.motion.opacity, 0.0);
    let s = ev.eval_frame(FrameIndex(15)).unwrap();
    assert!(s.text.motion.is_identity());
    assert_eq!(s.text.step, 0);

    // Card 1 in segment mode: step 1 at t=0, step 2 from t=0.5.
    assert_eq!(ev.eval_frame(FrameIndex(60)).unwrap().text.step, 1);
    assert_eq!(ev.eval_frame(FrameIndex(74)).unwrap().text.step, 1);
    assert_eq!(ev.eval_frame(FrameIndex(75)).unwrap().text.step, 2);
}

#[test]
fn video_media_restarts_each_card() {
    let p = Project::from_json(
        r#"{"scriptCards":[
            {"id":"a","duration":1,"media":{"url":"v.mp4","type":"video","startTime":2,"persistUntilCardId":"b"}},
            {"id":"b","duration":1}
        ]}"#,
    )
    .unwrap();
    let ev = Evaluator::new(&p).unwrap();
    let m = ev.eval_frame(FrameIndex(30)).unwrap().media.unwrap();
    assert_eq!(m.video_frame, Some(0));
    assert!((m.source_time - 2.0).abs() < 1e-12);
    let m = ev.eval_frame(FrameIndex(45)).unwrap().media.unwrap();
    assert_eq!(m.video_frame, Some(15));
    assert!((m.source_time - 2.5).abs() < 1e-12);
}

#[test]
fn fingerprints_separate_visual_changes() {
    let mut p = basic();
    p.script_cards[0].animations.text.enter.name = AnimName::None;
    let ev = Evaluator::new(&p).unwrap();
    let a = ev.eval_frame(FrameIndex(20)).unwrap().fingerprint();
    let b = ev.eval_frame(FrameIndex(21)).unwrap().fingerprint();
    assert_eq!(a, b, "static frames share a fingerprint");
    let c = ev.eval_frame(FrameIndex(70)).unwrap().fingerprint();
    assert_ne!(a, c);
}

#[test]
fn frames_past_the_end_are_rejected() {
    let ev = Evaluator::new(&basic()).unwrap();
    assert_eq!(ev.timeline().total_frames(), 135);
    assert!(ev.eval_frame(FrameIndex(135)).is_err());
}
