use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::Project;

/// Where one card sits on the output timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSpan {
    /// Index into `Project::script_cards`.
    pub index: usize,
    /// Frames owned by this card, `floor(duration * fps)` long.
    pub frames: FrameRange,
    /// Start in seconds as the sum of previous card durations (not frame-rounded).
    pub start_secs: f64,
    /// Card duration in seconds.
    pub duration_secs: f64,
}

/// Cards laid end to end.
#[derive(Clone, Debug)]
pub struct Timeline {
    fps: Fps,
    spans: Vec<CardSpan>,
    total_frames: u64,
}

impl Timeline {
    /// Build the timeline for `project`.
    pub fn new(project: &Project) -> ReelResult<Self> {
        let fps = project.fps()?;
        let mut spans = Vec::with_capacity(project.script_cards.len());
        let mut frame = 0u64;
        let mut secs = 0.0f64;
        for (index, card) in project.script_cards.iter().enumerate() {
            if !card.duration.is_finite() || card.duration < 0.0 {
                return Err(ReelError::validation(format!(
                    "card {index} has invalid duration {}",
                    card.duration
                )));
            }
            let len = fps.secs_to_frames_floor(card.duration);
            spans.push(CardSpan {
                index,
                frames: FrameRange::new(FrameIndex(frame), FrameIndex(frame + len))?,
                start_secs: secs,
                duration_secs: card.duration,
            });
            frame += len;
            secs += card.duration;
        }
        Ok(Self {
            fps,
            spans,
            total_frames: frame,
        })
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Total frame count across all cards.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// The whole timeline as a range.
    pub fn range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.total_frames),
        }
    }

    /// Per-card spans in card order.
    pub fn spans(&self) -> &[CardSpan] {
        &self.spans
    }

    /// Find the card owning `frame` and the frame offset inside it.
    pub fn locate(&self, frame: FrameIndex) -> Option<(&CardSpan, u64)> {
        if frame.0 >= self.total_frames {
            return None;
        }
        let pos = self.spans.partition_point(|s| s.frames.end.0 <= frame.0);
        let span = self.spans[pos..].iter().find(|s| s.frames.contains(frame))?;
        Some((span, frame.0 - span.frames.start.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/timeline.rs"]
mod tests;
