use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig, check_order};
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Color transparent pixels are flattened against.
    pub background: Rgba8,
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset.
    pub preset: String,
}

impl EncodeOptions {
    /// H.264 at CRF 18 with the `slow` preset, flattened over black.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8::BLACK,
            crf: 18,
            preset: "slow".to_owned(),
        }
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Audio is optional and provided through [`SinkConfig::audio`].
pub struct FfmpegSink {
    opts: EncodeOptions,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: EncodeOptions) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Frames arrive already flattened to opaque RGBA8.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            cmd.arg("-i").arg(audio);
            cmd.args(["-map", "0:v:0", "-map", "1:a:0"]);
        } else {
            cmd.arg("-an");
        }

        cmd.args([
            "-c:v",
            "libx264",
            "-crf",
            &self.opts.crf.to_string(),
            "-preset",
            &self.opts.preset,
            "-pix_fmt",
            "yuv420p",
        ]);
        if cfg.audio.is_some() {
            cmd.args(["-c:a", "aac", "-shortest"]);
        }
        cmd.args(["-movflags", "+faststart"]);
        cmd.arg(&self.opts.out_path);
        cmd
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        cfg.check()?;
        if let Some(audio) = &cfg.audio
            && !audio.is_file()
        {
            return Err(ReelError::encode(format!(
                "audio input '{}' does not exist",
                audio.display()
            )));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ReelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg).spawn().map_err(|e| {
            ReelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            "ffmpeg encoder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        check_order(self.last_idx, idx)?;
        self.last_idx = Some(idx);
        cfg.check_frame(frame)?;

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.background)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // An abandoned encode (error or cancel) must not leave ffmpeg running.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &fps.to_string()]);
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg: Rgba8,
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg.r);
    let bg_g = u16::from(bg.g);
    let bg_b = u16::from(bg.b);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = u16::from(s[0]) + mul_div255_u16(bg_r, inv);
        let g = u16::from(s[1]) + mul_div255_u16(bg_g, inv);
        let b = u16::from(s[2]) + mul_div255_u16(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
