//! Audio track planning and ffmpeg mixing.

/// Running the mix through ffmpeg.
pub mod mix;
/// Track collection and filter graph construction.
pub mod plan;

pub use mix::mix_to_file;
pub use plan::{AudioMixPlan, AudioTrack, TrackKind};
