use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, Rgba8::rgb(10, 20, 30)).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, Rgba8::rgb(10, 20, 30)).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_half_alpha_blends_with_bg() {
    // 50% red over white.
    let src = vec![128u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, Rgba8::WHITE).unwrap();
    assert_eq!(dst, vec![255, 127, 127, 255]);
}

#[test]
fn command_includes_quality_and_audio_flags() {
    let sink = FfmpegSink::new(EncodeOptions::new("/tmp/out.mp4"));
    let with_audio = SinkConfig {
        width: 16,
        height: 16,
        fps: Fps::whole(30).unwrap(),
        audio: Some(PathBuf::from("/tmp/mix.m4a")),
    };
    let args: Vec<String> = sink
        .command(&with_audio)
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let joined = args.join(" ");
    assert!(joined.contains("-crf 18"));
    assert!(joined.contains("-preset slow"));
    assert!(joined.contains("-pix_fmt yuv420p"));
    assert!(joined.contains("-c:a aac -shortest"));
    assert!(joined.contains("-movflags +faststart"));
    assert!(joined.contains("-r 30/1"));
    assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));

    let silent = SinkConfig {
        audio: None,
        ..with_audio
    };
    let joined = sink
        .command(&silent)
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    assert!(joined.contains("-an"));
    assert!(!joined.contains("-c:a"));
}

#[test]
fn begin_rejects_odd_sizes_and_missing_audio() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(EncodeOptions::new(dir.path().join("out.mp4")));
    let odd = SinkConfig {
        width: 15,
        height: 16,
        fps: Fps::whole(30).unwrap(),
        audio: None,
    };
    assert!(sink.begin(odd).is_err());

    let missing_audio = SinkConfig {
        width: 16,
        height: 16,
        fps: Fps::whole(30).unwrap(),
        audio: Some(dir.path().join("nope.m4a")),
    };
    assert!(sink.begin(missing_audio).is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(EncodeOptions::new("/tmp/never.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn encodes_short_clip_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clip.mp4");
    let mut sink = FfmpegSink::new(EncodeOptions {
        preset: "ultrafast".to_owned(),
        ..EncodeOptions::new(&out)
    });
    sink.begin(SinkConfig {
        width: 16,
        height: 16,
        fps: Fps::whole(10).unwrap(),
        audio: None,
    })
    .unwrap();
    let frame = FrameRGBA {
        width: 16,
        height: 16,
        data: [0u8, 0, 255, 255].repeat(256),
    };
    for i in 0..5 {
        sink.push_frame(FrameIndex(i), &frame).unwrap();
    }
    sink.end().unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}
