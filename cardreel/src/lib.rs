//! cardreel turns a script-card project into an MP4.
//!
//! A project is a list of cards (text, media, layout, entrance/exit animations, narration and
//! sound effects) plus page chrome. The engine is synchronous and does no network IO:
//!
//! - Parse and validate a [`Project`]
//! - Resolve its URLs to local files ([`LocalAssets`])
//! - Prepare layers once ([`PreparedProject`]) and render single frames or stream the whole
//!   timeline into a [`FrameSink`]
//! - Mix audio with [`AudioMixPlan`] and mux it in the [`FfmpegSink`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod audio;
pub mod encode;
pub mod eval;
pub mod foundation;
pub mod model;
pub mod render;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::local::LocalAssets;
pub use crate::assets::source::AssetSource;
pub use crate::audio::{AudioMixPlan, mix_to_file};
pub use crate::encode::{
    EncodeOptions, FfmpegSink, FrameSink, InMemorySink, RenderOptions, RenderProgress,
    RenderStats, SinkConfig, frame_to_png, is_ffmpeg_on_path, render_to_sink,
};
pub use crate::eval::evaluator::{Evaluator, FrameState};
pub use crate::model::project::Project;
pub use crate::model::validate::{SchemaError, SchemaErrors, validate_project};
pub use crate::render::{FontSet, FrameRGBA, PreparedProject, render_frame};
