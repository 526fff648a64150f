use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::audio::plan::AudioMixPlan;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{ReelError, ReelResult};

const CANCEL_POLL: Duration = Duration::from_millis(20);

/// Mix `plan` into an AAC file at `out_path` (conventionally `.m4a`).
///
/// Returns `Ok(None)` without running ffmpeg when the plan has no tracks. Setting `cancel`
/// kills the ffmpeg child, removes the partial output and returns [`ReelError::Cancelled`].
pub fn mix_to_file(
    plan: &AudioMixPlan,
    out_path: &Path,
    cancel: &AtomicBool,
) -> ReelResult<Option<PathBuf>> {
    let Some(graph) = plan.filter_graph() else {
        return Ok(None);
    };
    if cancel.load(Ordering::Relaxed) {
        return Err(ReelError::Cancelled);
    }
    ensure_parent_dir(out_path)?;

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error", "-y"]);
    for track in &plan.tracks {
        cmd.arg("-i").arg(&track.path);
    }
    cmd.args(["-filter_complex", &graph, "-map", "[aout]"])
        .args(["-c:a", "aac", "-b:a", "192k"])
        .arg(out_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    tracing::debug!(tracks = plan.tracks.len(), filter = %graph, "mixing audio");
    let mut child = cmd
        .spawn()
        .map_err(|e| ReelError::encode(format!("failed to run ffmpeg for audio mix: {e}")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr"))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = stderr.read_to_end(&mut bytes);
        bytes
    });

    let status = loop {
        if cancel.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stderr_drain.join();
            let _ = std::fs::remove_file(out_path);
            tracing::debug!("audio mix cancelled");
            return Err(ReelError::Cancelled);
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => std::thread::sleep(CANCEL_POLL),
            Err(e) => {
                let _ = child.kill();
                return Err(ReelError::encode(format!("failed to wait for ffmpeg audio mix: {e}")));
            }
        }
    };
    let stderr_bytes = stderr_drain
        .join()
        .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?;
    if !status.success() {
        return Err(ReelError::encode(format!(
            "ffmpeg audio mix failed (status {status}): {}",
            String::from_utf8_lossy(&stderr_bytes).trim()
        )));
    }
    Ok(Some(out_path.to_path_buf()))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
