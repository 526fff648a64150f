use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use poem_openapi::{Enum, Object};

use crate::error::{ServiceError, ServiceResult};

/// Lifecycle of a render job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum, serde::Serialize, serde::Deserialize)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// No further transitions happen from a finished job.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Observable state of one render job.
#[derive(Clone, Debug, PartialEq, Object, serde::Serialize, serde::Deserialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    /// Human-readable state for the editor.
    pub message: String,
    /// Percent, 0 to 100.
    pub progress: u8,
    /// Attempt currently running or last run; 0 while pending.
    pub attempts: u32,
    pub warnings: Vec<String>,
    #[oai(skip_serializing_if = "Option::is_none")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[oai(skip_serializing_if = "Option::is_none")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[oai(skip_serializing_if = "Option::is_none")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    fn new(job_id: String) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            status: JobStatus::Pending,
            message: "waiting for a render worker".to_owned(),
            progress: 0,
            attempts: 0,
            warnings: Vec::new(),
            video_url: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn finish(&mut self, status: JobStatus, message: String) {
        let now = Utc::now();
        self.status = status;
        self.message = message;
        self.updated_at = now;
        self.completed_at = Some(now);
    }
}

/// In-memory job table shared by the queue, the workers and the HTTP layer.
///
/// Every mutation of a finished job is ignored, so late progress from an abandoned attempt
/// cannot resurrect a cancelled or failed record.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh `pending` record.
    pub fn create(&self, job_id: impl Into<String>) -> JobRecord {
        let record = JobRecord::new(job_id.into());
        self.write()
            .insert(record.job_id.clone(), record.clone());
        record
    }

    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.read().get(job_id).cloned()
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut out: Vec<JobRecord> = self.read().values().cloned().collect();
        out.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.job_id.cmp(&a.job_id))
        });
        out
    }

    /// Move into `processing` for attempt `attempt`; progress restarts from 0.
    pub fn start_attempt(&self, job_id: &str, attempt: u32, message: impl Into<String>) {
        self.modify(job_id, |r| {
            r.status = JobStatus::Processing;
            r.attempts = attempt;
            r.progress = 0;
            r.error = None;
            r.message = message.into();
        });
    }

    /// Merge a status/message/progress update.
    ///
    /// `progress` is optional like a partial document write; when given it never lowers the
    /// stored value.
    pub fn update(
        &self,
        job_id: &str,
        status: JobStatus,
        message: impl Into<String>,
        progress: Option<u8>,
    ) {
        self.modify(job_id, |r| {
            r.status = status;
            r.message = message.into();
            if let Some(p) = progress {
                r.progress = r.progress.max(p.min(100));
            }
        });
        tracing::debug!(job_id, ?status, ?progress, "job updated");
    }

    pub fn add_warnings(&self, job_id: &str, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        self.modify(job_id, |r| r.warnings.extend(warnings.iter().cloned()));
    }

    pub fn complete(&self, job_id: &str, video_url: impl Into<String>) {
        self.modify(job_id, |r| {
            r.progress = 100;
            r.video_url = Some(video_url.into());
            r.finish(JobStatus::Completed, "video is ready".to_owned());
        });
    }

    pub fn fail(&self, job_id: &str, error: impl Into<String>) {
        self.modify(job_id, |r| {
            let error = error.into();
            r.finish(JobStatus::Failed, format!("render failed: {error}"));
            r.error = Some(error);
        });
    }

    /// Mark a job cancelled. Errors when it is unknown or already finished.
    pub fn cancel(&self, job_id: &str) -> ServiceResult<JobRecord> {
        let mut jobs = self.write();
        let record = jobs
            .get_mut(job_id)
            .ok_or_else(|| ServiceError::not_found(format!("job '{job_id}'")))?;
        if record.status.is_finished() {
            return Err(ServiceError::Conflict(format!(
                "job '{job_id}' is already {}",
                status_name(record.status)
            )));
        }
        record.finish(JobStatus::Cancelled, "render cancelled".to_owned());
        Ok(record.clone())
    }

    fn modify(&self, job_id: &str, f: impl FnOnce(&mut JobRecord)) {
        let mut jobs = self.write();
        match jobs.get_mut(job_id) {
            Some(r) if !r.status.is_finished() => {
                f(r);
                r.updated_at = Utc::now();
            }
            Some(_) => {}
            None => tracing::warn!(job_id, "update for unknown job ignored"),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, JobRecord>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, JobRecord>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn status_name(s: JobStatus) -> &'static str {
    match s {
        JobStatus::Pending => "pending",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
        JobStatus::Cancelled => "cancelled",
    }
}
