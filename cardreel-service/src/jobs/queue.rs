use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cardreel::Project;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::jobs::store::{JobRecord, JobStatus, JobStore};

const SHUT_DOWN: &str = "render queue is shut down";

/// How long an abandoned attempt gets to stop after its token fires.
const WIND_DOWN: Duration = Duration::from_secs(30);

/// Concurrency, timeout and retry policy of the queue.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub workers: usize,
    pub capacity: usize,
    pub job_timeout: Duration,
    pub max_attempts: u32,
    /// Attempt `n` waits `retry_backoff * n` before the next one.
    pub retry_backoff: Duration,
}

impl From<&ServiceConfig> for QueueConfig {
    fn from(cfg: &ServiceConfig) -> Self {
        Self {
            workers: cfg.workers,
            capacity: cfg.queue_capacity,
            job_timeout: cfg.job_timeout,
            max_attempts: cfg.max_attempts,
            retry_backoff: cfg.retry_backoff,
        }
    }
}

/// Lets the attempt running a job push progress into the store, from async or blocking code.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    store: Arc<JobStore>,
    job_id: String,
}

impl ProgressReporter {
    pub fn new(store: Arc<JobStore>, job_id: impl Into<String>) -> Self {
        Self {
            store,
            job_id: job_id.into(),
        }
    }

    pub fn report(&self, progress: u8, message: impl Into<String>) {
        self.store
            .update(&self.job_id, JobStatus::Processing, message, Some(progress));
    }

    pub fn warn(&self, warnings: &[String]) {
        self.store.add_warnings(&self.job_id, warnings);
    }
}

/// Everything one attempt of a job gets to work with.
pub struct JobContext {
    pub job_id: String,
    pub attempt: u32,
    pub project: Arc<Project>,
    /// Fires on user cancellation and when the attempt times out.
    pub cancel: CancellationToken,
    pub progress: ProgressReporter,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobOutcome {
    pub video_url: String,
}

/// Executes one attempt of a render job.
#[async_trait::async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn run(&self, ctx: JobContext) -> ServiceResult<JobOutcome>;
}

struct QueuedJob {
    job_id: String,
    project: Arc<Project>,
    cancel: CancellationToken,
}

type TokenMap = Arc<Mutex<HashMap<String, CancellationToken>>>;

/// Bounded job queue drained by a fixed pool of worker tasks.
#[derive(Clone)]
pub struct RenderQueue {
    tx: mpsc::Sender<QueuedJob>,
    store: Arc<JobStore>,
    tokens: TokenMap,
    shutdown: CancellationToken,
}

impl RenderQueue {
    /// Spawn the worker tasks. Must be called inside a tokio runtime.
    pub fn start(
        cfg: QueueConfig,
        store: Arc<JobStore>,
        handler: Arc<dyn JobHandler>,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(cfg.capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let tokens: TokenMap = Arc::default();
        let shutdown = CancellationToken::new();

        let workers = (0..cfg.workers.max(1))
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    rx.clone(),
                    cfg.clone(),
                    store.clone(),
                    handler.clone(),
                    tokens.clone(),
                    shutdown.clone(),
                ))
            })
            .collect();
        tracing::info!(workers = cfg.workers.max(1), capacity = cfg.capacity, "render queue started");

        (
            Self {
                tx,
                store,
                tokens,
                shutdown,
            },
            workers,
        )
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Validate `project`, record it as `pending` and enqueue it. Returns the job id.
    pub async fn submit(&self, project: Project) -> ServiceResult<String> {
        cardreel::validate_project(&project)
            .map_err(|e| ServiceError::bad_request(e.to_string()))?;
        if self.shutdown.is_cancelled() {
            return Err(ServiceError::config(SHUT_DOWN));
        }

        let job_id = uuid::Uuid::new_v4().to_string();
        let cancel = self.shutdown.child_token();
        self.store.create(job_id.clone());
        self.lock_tokens().insert(job_id.clone(), cancel.clone());

        let job = QueuedJob {
            job_id: job_id.clone(),
            project: Arc::new(project),
            cancel,
        };
        if self.tx.send(job).await.is_err() {
            self.lock_tokens().remove(&job_id);
            self.store.fail(&job_id, SHUT_DOWN);
            return Err(ServiceError::config(SHUT_DOWN));
        }
        tracing::info!(job_id = %job_id, "render job accepted");
        Ok(job_id)
    }

    /// Cancel a pending or running job.
    pub fn cancel(&self, job_id: &str) -> ServiceResult<JobRecord> {
        let record = self.store.cancel(job_id)?;
        if let Some(token) = self.lock_tokens().get(job_id) {
            token.cancel();
        }
        tracing::info!(job_id, "render job cancelled");
        Ok(record)
    }

    /// Stop the workers. Running attempts are cancelled and still-queued jobs fail.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn lock_tokens(&self) -> std::sync::MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn worker_loop(
    worker: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<QueuedJob>>>,
    cfg: QueueConfig,
    store: Arc<JobStore>,
    handler: Arc<dyn JobHandler>,
    tokens: TokenMap,
    shutdown: CancellationToken,
) {
    let forget = |job_id: &str| {
        tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(job_id);
    };
    loop {
        let job = {
            let mut rx = rx.lock().await;
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => None,
                job = rx.recv() => job,
            }
        };
        let Some(job) = job else {
            break;
        };
        run_job(&cfg, &store, handler.as_ref(), &job).await;
        forget(&job.job_id);
    }

    let mut rx = rx.lock().await;
    rx.close();
    while let Ok(job) = rx.try_recv() {
        store.fail(&job.job_id, SHUT_DOWN);
        forget(&job.job_id);
    }
    tracing::debug!(worker, "render worker stopped");
}

#[tracing::instrument(skip_all, fields(job_id = %job.job_id))]
async fn run_job(cfg: &QueueConfig, store: &Arc<JobStore>, handler: &dyn JobHandler, job: &QueuedJob) {
    if job.cancel.is_cancelled() {
        // A user cancel has already finished the record; otherwise the queue is going away.
        tracing::info!("job was cancelled while pending");
        store.fail(&job.job_id, SHUT_DOWN);
        return;
    }

    let max_attempts = cfg.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        store.start_attempt(
            &job.job_id,
            attempt,
            format!("render attempt {attempt} of {max_attempts} started"),
        );
        let attempt_cancel = job.cancel.child_token();
        let ctx = JobContext {
            job_id: job.job_id.clone(),
            attempt,
            project: job.project.clone(),
            cancel: attempt_cancel.clone(),
            progress: ProgressReporter::new(store.clone(), job.job_id.clone()),
        };

        let mut run = handler.run(ctx);
        let (result, settled) = tokio::select! {
            biased;
            _ = job.cancel.cancelled() => (Err(ServiceError::Cancelled), false),
            _ = tokio::time::sleep(cfg.job_timeout) => {
                (Err(ServiceError::Timeout(cfg.job_timeout)), false)
            }
            res = &mut run => (res, true),
        };
        attempt_cancel.cancel();
        // An abandoned attempt may still own blocking work and its scratch dir.
        if !settled && tokio::time::timeout(WIND_DOWN, &mut run).await.is_err() {
            tracing::warn!(attempt, "abandoned attempt did not stop within {WIND_DOWN:?}");
        }

        match result.map_err(ServiceError::normalize) {
            Ok(outcome) => {
                tracing::info!(attempt, url = %outcome.video_url, "render job completed");
                store.complete(&job.job_id, outcome.video_url);
                return;
            }
            Err(ServiceError::Cancelled) => {
                tracing::info!(attempt, "render job cancelled");
                let _ = store.cancel(&job.job_id);
                return;
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let backoff = cfg.retry_backoff * attempt;
                tracing::warn!(attempt, error = %e, ?backoff, "render attempt failed, retrying");
                store.update(
                    &job.job_id,
                    JobStatus::Processing,
                    format!("attempt {attempt} failed ({e}), retrying"),
                    None,
                );
                tokio::select! {
                    _ = job.cancel.cancelled() => {
                        let _ = store.cancel(&job.job_id);
                        return;
                    }
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "render job failed");
                store.fail(&job.job_id, e.to_string());
                return;
            }
        }
    }
}
