use std::path::{Path, PathBuf};

use resvg::tiny_skia;

use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::MediaFit;
use crate::render::media::{pixmap_from_straight_rgba, video_fit_filter};

/// A video source already scaled to its media box.
#[derive(Clone, Debug)]
pub struct VideoSource {
    /// Local file.
    pub path: PathBuf,
    /// Fit mode inside the box.
    pub fit: MediaFit,
    /// Box width in output pixels.
    pub width: u32,
    /// Box height in output pixels.
    pub height: u32,
}

impl VideoSource {
    /// Decode up to `count` consecutive frames starting at `start_secs`, sampled at `fps`.
    ///
    /// Seeking past the end of the source yields its last frame, so callers can hold it.
    /// Otherwise the result may be shorter than `count` when the source ends early.
    pub fn decode_frames(
        &self,
        start_secs: f64,
        fps: Fps,
        count: u32,
    ) -> ReelResult<Vec<tiny_skia::Pixmap>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let seek = ["-ss".to_owned(), format!("{:.6}", start_secs.max(0.0))];
        let frames = self.run(&seek, fps, Some(count))?;
        if !frames.is_empty() || start_secs <= 0.0 {
            return Ok(frames);
        }
        let tail = ["-sseof".to_owned(), "-1".to_owned()];
        Ok(self.run(&tail, fps, None)?.pop().into_iter().collect())
    }

    fn run(
        &self,
        seek: &[String],
        fps: Fps,
        count: Option<u32>,
    ) -> ReelResult<Vec<tiny_skia::Pixmap>> {
        let filter = format!(
            "fps={fps},{}",
            video_fit_filter(self.fit, self.width, self.height)
        );
        let mut cmd = std::process::Command::new("ffmpeg");
        cmd.args(["-v", "error"])
            .args(seek)
            .arg("-i")
            .arg(&self.path)
            .args(["-an", "-vf", &filter]);
        if let Some(n) = count {
            cmd.args(["-frames:v", &n.to_string()]);
        }
        let out = cmd
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .output()
            .map_err(|e| ReelError::render(format!("failed to run ffmpeg for video decode: {e}")))?;

        if !out.status.success() {
            return Err(ReelError::render(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let max = count.map_or(usize::MAX, |n| n as usize);
        split_frames(out.stdout, self.width, self.height, max)
    }
}

fn split_frames(
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    max: usize,
) -> ReelResult<Vec<tiny_skia::Pixmap>> {
    let frame_len = width as usize * height as usize * 4;
    if frame_len == 0 {
        return Err(ReelError::render("video box has zero size"));
    }
    if !bytes.len().is_multiple_of(frame_len) {
        return Err(ReelError::render(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {frame_len}",
            bytes.len()
        )));
    }
    bytes
        .chunks_exact(frame_len)
        .take(max)
        .map(|c| pixmap_from_straight_rgba(c.to_vec(), width, height))
        .collect()
}

/// Check whether `path` has a decodable video stream.
pub fn has_video_stream(path: &Path) -> bool {
    std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-map", "0:v:0", "-frames:v", "1", "-f", "null", "-"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/render/video.rs"]
mod tests;
