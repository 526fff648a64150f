use super::*;
use crate::audio::plan::{AudioTrack, TrackKind};

#[test]
fn empty_plan_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("mix.m4a");
    assert_eq!(mix_to_file(&AudioMixPlan::default(), &out, &AtomicBool::new(false)).unwrap(), None);
    assert!(!out.exists());
}

#[test]
fn mixes_tones_when_ffmpeg_is_available() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut tracks = Vec::new();
    for (i, freq) in [440, 660].into_iter().enumerate() {
        let path = dir.path().join(format!("tone{i}.wav"));
        let status = Command::new("ffmpeg")
            .args(["-v", "error", "-y", "-f", "lavfi"])
            .arg("-i")
            .arg(format!("sine=frequency={freq}:duration=0.5"))
            .arg(&path)
            .status()
            .unwrap();
        if !status.success() {
            return;
        }
        tracks.push(AudioTrack {
            kind: if i == 0 { TrackKind::Bgm } else { TrackKind::Sfx },
            path,
            offset_secs: i as f64 * 0.25,
            volume: 0.5,
        });
    }
    let plan = AudioMixPlan {
        tracks,
        skipped: Vec::new(),
    };
    let out = dir.path().join("nested").join("mix.m4a");
    let written = mix_to_file(&plan, &out, &AtomicBool::new(false)).unwrap().unwrap();
    assert_eq!(written, out);
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn unreadable_inputs_fail_the_mix() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let plan = AudioMixPlan {
        tracks: vec![AudioTrack {
            kind: TrackKind::Narration,
            path: dir.path().join("missing.mp3"),
            offset_secs: 0.0,
            volume: 1.0,
        }],
        skipped: Vec::new(),
    };
    let err = mix_to_file(&plan, &dir.path().join("mix.m4a"), &AtomicBool::new(false)).unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
}

fn narration(path: PathBuf) -> AudioMixPlan {
    AudioMixPlan {
        tracks: vec![AudioTrack {
            kind: TrackKind::Narration,
            path,
            offset_secs: 0.0,
            volume: 1.0,
        }],
        skipped: Vec::new(),
    }
}

#[test]
fn cancel_before_start_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("mix.m4a");
    let err = mix_to_file(&narration(dir.path().join("a.mp3")), &out, &AtomicBool::new(true))
        .unwrap_err();
    assert!(matches!(err, ReelError::Cancelled));
    assert!(!out.exists());
}

#[cfg(unix)]
#[test]
fn cancel_kills_a_mix_in_progress() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // ffmpeg blocks opening a FIFO nobody writes to, so the mix can only end by cancellation.
    let fifo = dir.path().join("stalled.wav");
    match Command::new("mkfifo").arg(&fifo).status() {
        Ok(s) if s.success() => {}
        _ => return,
    }
    let out = dir.path().join("mix.m4a");
    let cancel = std::sync::Arc::new(AtomicBool::new(false));
    let trigger = {
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            cancel.store(true, Ordering::Relaxed);
        })
    };

    let started = std::time::Instant::now();
    let err = mix_to_file(&narration(fifo), &out, &cancel).unwrap_err();
    trigger.join().unwrap();
    assert!(matches!(err, ReelError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!out.exists());
}
