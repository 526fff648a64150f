use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Vec2};

/// 0-based frame number on the video timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames `start..end` of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    /// Exclusive.
    pub end: FrameIndex,
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> ReelResult<Self> {
        if start > end {
            return Err(ReelError::validation(format!(
                "frame range {}..{} is inverted",
                start.0, end.0
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0 - self.start.0
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        (self.start..self.end).contains(&f)
    }

    /// Consecutive sub-ranges of at most `size` frames covering `self`.
    pub fn chunks(self, size: u64) -> impl Iterator<Item = FrameRange> {
        let size = size.max(1);
        (self.start.0..self.end.0)
            .step_by(usize::try_from(size).unwrap_or(usize::MAX))
            .map(move |s| FrameRange {
                start: FrameIndex(s),
                end: FrameIndex((s + size).min(self.end.0)),
            })
    }
}

/// Frame rate as `num/den` frames per second.
///
/// Projects only ever ask for whole rates, but ffmpeg is handed the rational form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if num == 0 || den == 0 {
            return Err(ReelError::validation(format!("frame rate {num}/{den} is not positive")));
        }
        Ok(Self { num, den })
    }

    pub fn whole(num: u32) -> ReelResult<Self> {
        Self::new(num, 1)
    }

    /// Seconds elapsed after `frames` frames.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        frames as f64 * f64::from(self.den) / f64::from(self.num)
    }

    /// Whole frames that fit in `secs`; a card of 2.5 s at 30 fps gets 75.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        let frames = secs * f64::from(self.num) / f64::from(self.den);
        // 0.1 s * 30 is 2.9999999999999996 in f64.
        (frames + 1e-9).floor().max(0.0) as u64
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Output size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
