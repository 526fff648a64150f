use super::*;
use crate::assets::local::LocalAssets;
use crate::encode::sink::InMemorySink;
use crate::model::project::Project;
use crate::render::svg::FontSet;
use std::path::Path;

fn prepared() -> PreparedProject {
    let mut project =
        Project::from_json(include_str!("../../fixtures/project_basic.json")).unwrap();
    project.output.width = 180;
    project.output.height = 320;
    let fonts = FontSet::from_dir(Path::new("/nonexistent-cardreel-fonts"));
    PreparedProject::prepare(&project, &LocalAssets::new(), &fonts).unwrap()
}

fn run(
    p: &PreparedProject,
    opts: &RenderOptions,
) -> (ReelResult<RenderStats>, InMemorySink, Vec<RenderProgress>) {
    let mut sink = InMemorySink::new();
    let mut seen = Vec::new();
    let cancel = AtomicBool::new(false);
    let res = render_to_sink(p, &mut sink, opts, &mut |pr| seen.push(pr), &cancel);
    (res, sink, seen)
}

#[test]
fn renders_whole_timeline_in_order() {
    let p = prepared();
    let (res, sink, progress) = run(&p, &RenderOptions::default());
    let stats = res.unwrap();

    assert_eq!(stats.frames_total, 135);
    assert_eq!(stats.frames_rendered + stats.frames_elided, 135);
    assert!(stats.frames_elided > 0, "static stretches should be elided");
    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 135);
    assert!(sink.frames().iter().enumerate().all(|(i, (idx, _))| idx.0 == i as u64));
    assert_eq!(sink.config().unwrap().width, 180);

    // One report per 32-frame chunk.
    assert_eq!(progress.len(), 5);
    assert_eq!(progress.last().unwrap().frames_done, 135);
    assert_eq!(progress.last().unwrap().fraction(), 1.0);
}

#[test]
fn elision_does_not_change_pixels() {
    let p = prepared();
    let range = Some(FrameRange::new(FrameIndex(50), FrameIndex(90)).unwrap());
    let elided = RenderOptions {
        range,
        chunk_size: 7,
        ..RenderOptions::default()
    };
    let full = RenderOptions {
        static_frame_elision: false,
        ..elided.clone()
    };
    let (a, sink_a, _) = run(&p, &elided);
    let (b, sink_b, _) = run(&p, &full);
    assert_eq!(b.unwrap().frames_elided, 0);
    assert!(a.unwrap().frames_elided > 0);
    for ((ia, fa), (ib, fb)) in sink_a.frames().iter().zip(sink_b.frames()) {
        assert_eq!(ia, ib);
        assert!(fa.data == fb.data, "frame {} differs", ia.0);
    }
    assert_eq!(sink_a.frames()[0].0, FrameIndex(50));
}

#[test]
fn cancellation_stops_before_the_next_chunk() {
    let p = prepared();
    let mut sink = InMemorySink::new();
    let cancel = AtomicBool::new(false);
    let opts = RenderOptions {
        chunk_size: 10,
        ..RenderOptions::default()
    };
    let err = render_to_sink(
        &p,
        &mut sink,
        &opts,
        &mut |pr: RenderProgress| {
            if pr.frames_done >= 20 {
                cancel.store(true, Ordering::Relaxed);
            }
        },
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Cancelled));
    assert_eq!(sink.frames().len(), 20);
    assert!(!sink.is_ended());
}

#[test]
fn invalid_options_are_rejected() {
    let p = prepared();
    let zero_threads = RenderOptions {
        threads: Some(0),
        ..RenderOptions::default()
    };
    assert!(run(&p, &zero_threads).0.is_err());

    let past_end = RenderOptions {
        range: Some(FrameRange::new(FrameIndex(100), FrameIndex(200)).unwrap()),
        ..RenderOptions::default()
    };
    assert!(run(&p, &past_end).0.is_err());
}

#[test]
fn progress_fraction_handles_empty_totals() {
    let p = RenderProgress {
        frames_done: 0,
        frames_total: 0,
    };
    assert_eq!(p.fraction(), 1.0);
    let half = RenderProgress {
        frames_done: 5,
        frames_total: 10,
    };
    assert_eq!(half.fraction(), 0.5);
}
