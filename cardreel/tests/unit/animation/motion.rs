use super::*;

fn anim(name: AnimName, duration: f64) -> Anim {
    Anim {
        name,
        duration,
        ease: Ease::Linear,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fade_in_ramps_opacity() {
    let io = InOut {
        enter: anim(AnimName::FadeIn, 1.0),
        exit: Anim::default(),
    };
    assert!(close(sample_motion(&io, 3.0, 0.0, 3.0).opacity, 0.0));
    assert!(close(sample_motion(&io, 3.0, 0.25, 3.0).opacity, 0.25));
    assert!(sample_motion(&io, 3.0, 1.0, 3.0).is_identity());
}

#[test]
fn slide_in_up_uses_output_scale() {
    let io = InOut {
        enter: anim(AnimName::SlideInUp, 0.5),
        exit: Anim::default(),
    };
    let m = sample_motion(&io, 2.0, 0.0, 3.0);
    assert!(close(m.translate_y, 150.0));
    assert!(close(m.opacity, 1.0));
    let m = sample_motion(&io, 2.0, 0.25, 3.0);
    assert!(close(m.translate_y, 75.0));
}

#[test]
fn zoom_in_and_zoom_out_scale_ranges() {
    let io = InOut {
        enter: anim(AnimName::ZoomIn, 1.0),
        exit: anim(AnimName::ZoomOut, 1.0),
    };
    let m = sample_motion(&io, 4.0, 0.5, 1.0);
    assert!(close(m.scale, 0.9));
    assert!(close(m.opacity, 0.5));

    let m = sample_motion(&io, 4.0, 3.5, 1.0);
    assert!(close(m.scale, 0.9));
    assert!(close(m.opacity, 0.5));
}

#[test]
fn exit_window_starts_at_duration_minus_out() {
    let io = InOut {
        enter: Anim::default(),
        exit: anim(AnimName::SlideOutDown, 1.0),
    };
    assert!(sample_motion(&io, 3.0, 1.99, 2.0).is_identity());
    assert!(close(sample_motion(&io, 3.0, 2.0, 2.0).translate_y, 0.0));
    assert!(close(sample_motion(&io, 3.0, 2.5, 2.0).translate_y, 50.0));
}

#[test]
fn entrance_wins_when_windows_overlap() {
    let io = InOut {
        enter: anim(AnimName::FadeIn, 2.0),
        exit: anim(AnimName::FadeOut, 2.0),
    };
    // Card is 3s: entrance covers [0,2), exit covers [1,3).
    let m = sample_motion(&io, 3.0, 1.5, 1.0);
    assert!(close(m.opacity, 0.75));
    let m = sample_motion(&io, 3.0, 2.5, 1.0);
    assert!(close(m.opacity, 0.25));
}

#[test]
fn none_entrance_falls_through_to_exit() {
    let io = InOut {
        enter: anim(AnimName::None, 5.0),
        exit: anim(AnimName::FadeOut, 5.0),
    };
    assert!(close(sample_motion(&io, 5.0, 1.0, 1.0).opacity, 0.8));
}

#[test]
fn zero_duration_animations_are_inert() {
    let io = InOut {
        enter: anim(AnimName::FadeIn, 0.0),
        exit: anim(AnimName::FadeOut, 0.0),
    };
    assert!(sample_motion(&io, 2.0, 0.0, 1.0).is_identity());
    assert!(sample_motion(&io, 2.0, 1.9, 1.0).is_identity());
}

#[test]
fn easing_shapes_progress() {
    let io = InOut {
        enter: Anim {
            name: AnimName::FadeIn,
            duration: 1.0,
            ease: Ease::InQuad,
        },
        exit: Anim::default(),
    };
    assert!(close(sample_motion(&io, 2.0, 0.5, 1.0).opacity, 0.25));
}

#[test]
fn unknown_names_deserialize_to_unknown() {
    let a: Anim = serde_json::from_str(r#"{"name":"spinIn"}"#).unwrap();
    assert_eq!(a.name, AnimName::Unknown);
    assert!(close(a.duration, 0.5));
    assert!(!AnimName::Unknown.is_entrance());
    assert!(AnimName::FadeOut.is_exit());
    assert!(!AnimName::FadeOut.is_entrance());
}
