use cardreel::ReelError;

/// Convenience result type used across the service.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures of the service layer.
///
/// Engine errors are carried as [`ServiceError::Engine`]; retry decisions go through
/// [`ServiceError::is_retryable`].
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// The caller sent something unusable.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with the current job state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or inconsistent service configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A speech vendor rejected or failed the request.
    #[error("tts error: {0}")]
    Tts(String),

    /// An asset could not be downloaded or materialized.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A download went past the size cap.
    #[error("asset too large: {0}")]
    TooLarge(String),

    #[error(transparent)]
    Engine(#[from] ReelError),

    #[error("job timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("job cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A blocking or spawned task died.
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn tts(msg: impl Into<String>) -> Self {
        Self::Tts(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Whether another attempt of the same job could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(_) | Self::Tts(_) | Self::Http(_) | Self::Io(_) | Self::Timeout(_) => true,
            Self::Engine(ReelError::Cancelled) => false,
            Self::Engine(e) => matches!(e, ReelError::Encode(_)),
            _ => false,
        }
    }

    /// Engine cancellation and queue cancellation look the same to callers.
    pub fn normalize(self) -> Self {
        match self {
            Self::Engine(ReelError::Cancelled) => Self::Cancelled,
            other => other,
        }
    }
}
