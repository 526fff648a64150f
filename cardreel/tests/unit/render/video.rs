use super::*;

#[test]
fn split_frames_slices_and_premultiplies() {
    let mut bytes = Vec::new();
    for _ in 0..3 {
        bytes.extend_from_slice(&[255, 0, 0, 128, 0, 0, 255, 255]);
    }
    let frames = split_frames(bytes, 2, 1, 2).unwrap();
    assert_eq!(frames.len(), 2);
    let px = frames[0].pixel(0, 0).unwrap();
    assert_eq!((px.red(), px.alpha()), (128, 128));
    assert_eq!(frames[1].pixel(1, 0).unwrap().blue(), 255);
}

#[test]
fn split_frames_rejects_partial_frames() {
    assert!(split_frames(vec![0; 7], 1, 1, 4).is_err());
    assert!(split_frames(vec![], 0, 1, 4).is_err());
}

#[test]
fn decode_frames_of_zero_is_a_noop() {
    let src = VideoSource {
        path: PathBuf::from("/does/not/matter.mp4"),
        fit: MediaFit::Contain,
        width: 4,
        height: 4,
    };
    assert!(src
        .decode_frames(0.0, Fps::whole(30).unwrap(), 0)
        .unwrap()
        .is_empty());
}

#[test]
fn decodes_generated_clip_when_ffmpeg_is_available() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    let status = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i", "color=c=blue:s=32x16:d=1:r=30"])
        .args(["-pix_fmt", "yuv420p"])
        .arg(&clip)
        .status()
        .unwrap();
    if !status.success() {
        return;
    }
    assert!(has_video_stream(&clip));

    let src = VideoSource {
        path: clip,
        fit: MediaFit::Contain,
        width: 16,
        height: 16,
    };
    let frames = src.decode_frames(0.2, Fps::whole(30).unwrap(), 5).unwrap();
    assert_eq!(frames.len(), 5);
    // 32x16 into 16x16 letterboxes to 16x8: top row transparent, middle blue.
    assert_eq!(frames[0].pixel(8, 0).unwrap().alpha(), 0);
    assert!(frames[0].pixel(8, 8).unwrap().blue() > 200);
}

#[test]
fn seeking_past_the_end_returns_the_last_frame() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("short.mp4");
    let status = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i", "color=c=red:s=16x16:d=0.5:r=10"])
        .args(["-pix_fmt", "yuv420p"])
        .arg(&clip)
        .status()
        .unwrap();
    if !status.success() {
        return;
    }
    let src = VideoSource {
        path: clip,
        fit: MediaFit::Fill,
        width: 8,
        height: 8,
    };
    let frames = src.decode_frames(3.0, Fps::whole(10).unwrap(), 4).unwrap();
    assert_eq!(frames.len(), 1);
    assert!(frames[0].pixel(4, 4).unwrap().red() > 200);
}
