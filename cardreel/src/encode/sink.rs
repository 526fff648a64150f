use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Already mixed audio (any container ffmpeg can read) to mux alongside the video.
    pub audio: Option<PathBuf>,
}

impl SinkConfig {
    /// Reject zero or odd dimensions; `yuv420p` needs both sides even.
    pub fn check(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("sink width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "sink width/height must be even, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Reject frames that do not match this configuration.
    pub fn check_frame(&self, frame: &FrameRGBA) -> ReelResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != (self.width as usize) * (self.height as usize) * 4 {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
}

pub(crate) fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> ReelResult<()> {
    match last {
        Some(last) if idx.0 <= last.0 => Err(ReelError::encode(format!(
            "sink received out-of-order frame {} after {}",
            idx.0, last.0
        ))),
        _ => Ok(()),
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        cfg.check()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("in-memory sink not started"))?;
        check_order(self.frames.last().map(|(i, _)| *i), idx)?;
        cfg.check_frame(frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
