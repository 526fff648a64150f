use crate::animation::motion::{InOut, Motion, sample_motion};
use crate::eval::reveal::{reveal_step, reveal_thresholds};
use crate::eval::timeline::Timeline;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::project::{MediaKind, Project};

/// Text block state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextState {
    /// Reveal step, see [`crate::eval::reveal`].
    pub step: usize,
    /// Animated adjustments.
    pub motion: Motion,
}

/// Media block state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaState {
    /// Card whose media, media layout and media animations are drawn.
    pub owner: usize,
    /// Animated adjustments.
    pub motion: Motion,
    /// Seconds into the source (`media.startTime + t`).
    pub source_time: f64,
    /// For video sources: the frame within the current card's decode stream.
    pub video_frame: Option<u64>,
}

/// Everything that varies between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    /// Global frame index.
    pub frame: FrameIndex,
    /// Current card index.
    pub card: usize,
    /// Frame offset inside the current card.
    pub local_frame: u64,
    /// Seconds since the start of the current card.
    pub t: f64,
    pub text: TextState,
    /// `None` when no media is visible.
    pub media: Option<MediaState>,
}

impl FrameState {
    /// Stable hash of the visual inputs of this frame.
    ///
    /// Two frames with equal fingerprints rasterize to identical pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut h = xxhash_rust::xxh3::Xxh3::new();
        h.update(&(self.card as u64).to_le_bytes());
        h.update(&(self.text.step as u64).to_le_bytes());
        write_motion(&mut h, &self.text.motion);
        match &self.media {
            None => h.update(&[0]),
            Some(m) => {
                h.update(&[1]);
                h.update(&(m.owner as u64).to_le_bytes());
                write_motion(&mut h, &m.motion);
                match m.video_frame {
                    None => h.update(&[0]),
                    Some(v) => {
                        h.update(&[1]);
                        h.update(&v.to_le_bytes());
                    }
                }
            }
        }
        h.digest()
    }
}

fn write_motion(h: &mut xxhash_rust::xxh3::Xxh3, m: &Motion) {
    h.update(&m.opacity.to_bits().to_le_bytes());
    h.update(&m.translate_y.to_bits().to_le_bytes());
    h.update(&m.scale.to_bits().to_le_bytes());
}

#[derive(Clone, Debug)]
struct MediaPlan {
    owner: usize,
    anims: InOut,
    show_at: f64,
    start_time: f64,
    is_video: bool,
}

#[derive(Clone, Debug)]
struct CardPlan {
    duration: f64,
    text_anims: InOut,
    thresholds: Vec<f64>,
    media: Option<MediaPlan>,
}

/// Maps frame indices to [`FrameState`]s.
///
/// Owns only derived per-card data, so it can live next to the project it was built from.
#[derive(Clone, Debug)]
pub struct Evaluator {
    timeline: Timeline,
    cards: Vec<CardPlan>,
    px_scale: f64,
}

impl Evaluator {
    /// Derive the evaluator for `project`.
    pub fn new(project: &Project) -> ReelResult<Self> {
        let timeline = Timeline::new(project)?;
        let owners = media_owners(project);

        let cards = project
            .script_cards
            .iter()
            .zip(&owners)
            .map(|(card, &owner)| {
                let owner_card = &project.script_cards[owner];
                let media = owner_card.media.url.as_ref().map(|_| {
                    let m = &owner_card.media;
                    // Show time comes from the current card's segments, even for carried media.
                    let show_at = (m.show_on_segment as usize)
                        .checked_sub(1)
                        .and_then(|i| card.segments.get(i))
                        .map_or(0.0, |s| s.start_time);
                    MediaPlan {
                        owner,
                        anims: owner_card.animations.media,
                        show_at,
                        start_time: m.start_time,
                        is_video: m.kind == MediaKind::Video,
                    }
                });
                CardPlan {
                    duration: card.duration,
                    text_anims: card.animations.text,
                    thresholds: reveal_thresholds(card),
                    media,
                }
            })
            .collect();

        Ok(Self {
            timeline,
            cards,
            px_scale: project.scale(),
        })
    }

    /// The timeline this evaluator walks.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Card whose media is drawn while `card` is current, if any media is set.
    pub fn media_owner(&self, card: usize) -> Option<usize> {
        self.cards.get(card)?.media.as_ref().map(|m| m.owner)
    }

    /// Evaluate one frame.
    pub fn eval_frame(&self, frame: FrameIndex) -> ReelResult<FrameState> {
        let (span, local_frame) = self.timeline.locate(frame).ok_or_else(|| {
            ReelError::validation(format!(
                "frame {} is outside the timeline (0..{})",
                frame.0,
                self.timeline.total_frames()
            ))
        })?;
        let plan = &self.cards[span.index];
        let t = self.timeline.fps().frames_to_secs(local_frame);

        let text = TextState {
            step: reveal_step(&plan.thresholds, t),
            motion: sample_motion(&plan.text_anims, plan.duration, t, self.px_scale),
        };

        let media = plan
            .media
            .as_ref()
            .filter(|m| t >= m.show_at)
            .map(|m| MediaState {
                owner: m.owner,
                motion: sample_motion(&m.anims, plan.duration, t, self.px_scale),
                source_time: m.start_time + t,
                video_frame: m.is_video.then_some(local_frame),
            });

        Ok(FrameState {
            frame,
            card: span.index,
            local_frame,
            t,
            text,
            media,
        })
    }
}

/// For each card, the card whose media is drawn while it is current.
///
/// A card with a media URL and `persistUntilCardId` takes over media for itself and every
/// following card through the card with that id. A newer persistent card replaces an older one.
pub fn media_owners(project: &Project) -> Vec<usize> {
    let mut out = Vec::with_capacity(project.script_cards.len());
    let mut carried: Option<(usize, &str)> = None;
    for (i, card) in project.script_cards.iter().enumerate() {
        if card.media.url.is_some()
            && let Some(until) = card.media.persist_until_card_id.as_deref()
        {
            carried = Some((i, until));
        }
        out.push(carried.map_or(i, |(owner, _)| owner));
        if let Some((_, until)) = carried
            && until == card.id
        {
            carried = None;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
