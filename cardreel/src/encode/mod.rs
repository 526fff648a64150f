//! Encoding sinks and the chunked render loop feeding them.
//!
//! Sinks consume rendered frames in timeline order.

/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Chunked, parallel rendering into a sink.
pub mod pipeline;
/// Single-frame PNG output.
pub mod png;
/// Generic frame sink trait and built-in sinks.
pub mod sink;

pub use ffmpeg::{EncodeOptions, FfmpegSink, is_ffmpeg_on_path};
pub use pipeline::{RenderOptions, RenderProgress, RenderStats, render_to_sink};
pub use png::frame_to_png;
pub use sink::{FrameSink, InMemorySink, SinkConfig};
