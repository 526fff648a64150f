use super::*;

fn project(durations: &[f64]) -> Project {
    let cards: Vec<String> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| format!(r#"{{"id":"c{i}","duration":{d}}}"#))
        .collect();
    Project::from_json(&format!(r#"{{"scriptCards":[{}]}}"#, cards.join(","))).unwrap()
}

#[test]
fn frames_per_card_are_floored() {
    let tl = Timeline::new(&project(&[1.0, 0.55, 2.0])).unwrap();
    let lens: Vec<u64> = tl.spans().iter().map(|s| s.frames.len_frames()).collect();
    assert_eq!(lens, vec![30, 16, 60]);
    assert_eq!(tl.total_frames(), 106);
}

#[test]
fn start_seconds_sum_raw_durations() {
    let tl = Timeline::new(&project(&[1.0, 0.55, 2.0])).unwrap();
    assert!((tl.spans()[2].start_secs - 1.55).abs() < 1e-12);
    assert_eq!(tl.spans()[2].frames.start, FrameIndex(46));
}

#[test]
fn locate_maps_global_to_local_frames() {
    let tl = Timeline::new(&project(&[1.0, 1.0])).unwrap();
    let (span, local) = tl.locate(FrameIndex(0)).unwrap();
    assert_eq!((span.index, local), (0, 0));
    let (span, local) = tl.locate(FrameIndex(29)).unwrap();
    assert_eq!((span.index, local), (0, 29));
    let (span, local) = tl.locate(FrameIndex(30)).unwrap();
    assert_eq!((span.index, local), (1, 0));
    assert!(tl.locate(FrameIndex(60)).is_none());
}

#[test]
fn cards_shorter_than_a_frame_are_skipped() {
    let tl = Timeline::new(&project(&[1.0, 0.01, 1.0])).unwrap();
    assert!(tl.spans()[1].frames.is_empty());
    let (span, local) = tl.locate(FrameIndex(30)).unwrap();
    assert_eq!((span.index, local), (2, 0));
}
