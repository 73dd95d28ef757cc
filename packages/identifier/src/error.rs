//! Typed errors for the identifier library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each variant corresponds to
//! one failure taxonomy; transience of upstream failures drives the retry
//! policy in the service layer.

use thiserror::Error;

/// Errors that can occur during identification and fine-tuning operations.
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Malformed caller input: empty text, out-of-range options, invalid
    /// training artifacts. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Inference provider failure. `transient` failures (rate limit,
    /// timeout, connection) are retried with bounded backoff; permanent
    /// ones (auth, unknown model) are surfaced immediately.
    #[error("upstream error: {message}")]
    Upstream { message: String, transient: bool },

    /// The model's response could not be brought into the component
    /// contract, even after one corrective retry.
    #[error("schema error: {0}")]
    Schema(String),

    /// A fine-tuning job reached `failed` or `cancelled`. Carries the
    /// upstream-reported reason verbatim.
    #[error("fine-tuning job {status}: {reason}")]
    Job { status: String, reason: String },

    /// Client-side polling budget exceeded while the job remained
    /// non-terminal. The job itself is not aborted.
    #[error("timed out after {waited_secs}s waiting for job {job_id}")]
    Timeout { job_id: String, waited_secs: u64 },

    /// Configuration error (missing credential or model id). Startup-only.
    #[error("config error: {0}")]
    Config(String),
}

impl IdentifyError {
    /// Whether the operation may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, IdentifyError::Upstream { transient: true, .. })
    }
}

impl From<openai_client::OpenAIError> for IdentifyError {
    fn from(err: openai_client::OpenAIError) -> Self {
        match &err {
            openai_client::OpenAIError::Config(msg) => IdentifyError::Config(msg.clone()),
            _ => IdentifyError::Upstream {
                transient: err.is_transient(),
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for identifier operations.
pub type Result<T> = std::result::Result<T, IdentifyError>;
