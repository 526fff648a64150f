use std::fmt::Write as _;
use std::path::PathBuf;

use crate::assets::local::{LocalAssets, abbreviate};
use crate::model::project::Project;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Role of a track in the mix.
pub enum TrackKind {
    /// Project-wide background music, starts at 0.
    Bgm,
    /// Per-card narration (`audioUrl`).
    Narration,
    /// Per-card sound effect (`sfxUrl`).
    Sfx,
}

#[derive(Clone, Debug, PartialEq)]
/// One input of the mix.
pub struct AudioTrack {
    pub kind: TrackKind,
    /// Local file holding the audio.
    pub path: PathBuf,
    /// Seconds from the start of the video.
    pub offset_secs: f64,
    /// Linear gain.
    pub volume: f64,
}

impl AudioTrack {
    /// Start offset in whole milliseconds, as `adelay` takes it.
    pub fn delay_ms(&self) -> u64 {
        (self.offset_secs.max(0.0) * 1000.0).round() as u64
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Ordered mix inputs: background music first, then narration and effects card by card.
pub struct AudioMixPlan {
    pub tracks: Vec<AudioTrack>,
    /// URLs referenced by the project but absent from the asset map.
    pub skipped: Vec<String>,
}

impl AudioMixPlan {
    /// Collect every audible track of `project` that has a local copy.
    ///
    /// Card offsets are the running sum of card durations in seconds.
    pub fn from_project(project: &Project, assets: &LocalAssets) -> Self {
        let mut plan = Self::default();

        if let Some(bgm) = &project.global_bgm
            && let Some(url) = bgm.url.as_deref()
        {
            plan.push(assets, url, TrackKind::Bgm, 0.0, bgm.volume);
        }

        let mut offset = 0.0;
        for card in &project.script_cards {
            if let Some(url) = card.audio_url.as_deref() {
                plan.push(assets, url, TrackKind::Narration, offset, card.tts_volume);
            }
            if let Some(url) = card.sfx_url.as_deref() {
                plan.push(assets, url, TrackKind::Sfx, offset, card.sfx_volume);
            }
            offset += card.duration;
        }

        for url in &plan.skipped {
            tracing::warn!(url = %abbreviate(url), "audio asset not available, skipping track");
        }
        plan
    }

    fn push(&mut self, assets: &LocalAssets, url: &str, kind: TrackKind, offset: f64, volume: f64) {
        match assets.get(url) {
            Some(path) => self.tracks.push(AudioTrack {
                kind,
                path: path.to_path_buf(),
                offset_secs: offset,
                volume,
            }),
            None => self.skipped.push(url.to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The ffmpeg `-filter_complex` graph mixing every track into `[aout]`.
    ///
    /// Input `i` of the ffmpeg command must be `tracks[i]`. Returns `None` for an empty plan.
    pub fn filter_graph(&self) -> Option<String> {
        match self.tracks.as_slice() {
            [] => None,
            [only] => Some(format!("[0:a]{}[aout]", track_filter(only))),
            tracks => {
                let mut g = String::new();
                for (i, t) in tracks.iter().enumerate() {
                    let _ = write!(g, "[{i}:a]{}[a{i}];", track_filter(t));
                }
                for i in 0..tracks.len() {
                    let _ = write!(g, "[a{i}]");
                }
                let _ = write!(
                    g,
                    "amix=inputs={}:duration=longest:normalize=0[aout]",
                    tracks.len()
                );
                Some(g)
            }
        }
    }
}

fn track_filter(t: &AudioTrack) -> String {
    let delay = t.delay_ms();
    if t.kind == TrackKind::Bgm || delay == 0 {
        format!("volume={}", t.volume)
    } else {
        format!("volume={},adelay={delay}|{delay}", t.volume)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/plan.rs"]
mod tests;
