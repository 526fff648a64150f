//! CPU rasterization of frames: chrome, text and media layers composited per frame.

/// Header bar and project info block.
pub mod chrome;
/// Per-frame compositing.
pub mod compose;
/// Rendered frame buffers.
pub mod frame;
/// Image decoding and box fitting.
pub mod media;
/// Asset decoding and layer rasterization ahead of rendering.
pub mod prepare;
/// SVG parsing, fonts and rasterization.
pub mod svg;
/// Text wrapping and text block rasterization.
pub mod text;
/// Video frame decoding through ffmpeg.
pub mod video;

pub use compose::render_frame;
pub use frame::FrameRGBA;
pub use prepare::PreparedProject;
pub use svg::FontSet;
