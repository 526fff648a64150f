//! Render jobs: records, the queue that schedules them and the worker that executes them.

pub mod queue;
pub mod store;
pub mod worker;

pub use queue::{JobContext, JobHandler, JobOutcome, ProgressReporter, QueueConfig, RenderQueue};
pub use store::{JobRecord, JobStatus, JobStore};
pub use worker::{LogProgress, ProgressObserver, RenderWorker, VideoProducer, milestone};
