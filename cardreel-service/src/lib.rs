//! Async service around the cardreel engine.
//!
//! Accepts projects over HTTP, fetches their assets, synthesizes narration through a TTS
//! vendor, renders each project as a queued job and publishes the resulting MP4.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod jobs;
pub mod storage;
pub mod tts;

pub use crate::config::{AssetPolicy, ServiceConfig, TtsSettings, TtsVendor};
pub use crate::error::{ServiceError, ServiceResult};
pub use crate::fetch::{AssetFetcher, FetchedAssets};
pub use crate::http::{ApiState, build_app, serve};
pub use crate::jobs::{JobRecord, JobStatus, JobStore, RenderQueue, LogProgress, RenderWorker, VideoProducer};
pub use crate::storage::{LocalVideoStore, VideoStore};
pub use crate::tts::{TtsAudio, TtsProvider, TtsRequest, provider_from_settings};
