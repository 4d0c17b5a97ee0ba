//! Errors - エラー型と分類

use thiserror::Error;

use crate::ports::StoreError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A single delete that failed during a best-effort sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    /// "resource" or "error".
    pub kind: &'static str,
    pub id: String,
    pub reason: String,
}

impl std::fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.reason)
    }
}

/// PipelineError is the error type of every repository, tracker and controller operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The targeted resource or error entry does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// `record_retry` received a failure detail without `error.errors[0].title`.
    #[error("malformed failure detail: {0}")]
    MalformedFailureDetail(String),

    /// Store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store rejected a write.
    #[error("store constraint violation: {0}")]
    StoreConstraintViolation(String),

    /// A row returned by the store is missing a field or carries a bad value.
    #[error("malformed row: field '{field}': {reason}")]
    MalformedRow { field: &'static str, reason: String },

    /// `person_index` points outside the configured signatory roster.
    #[error("unknown signatory index {index} (roster has {roster_len} entries)")]
    UnknownSignatory { index: usize, roster_len: usize },

    /// A reset finished but some deletes failed.
    #[error("reset left {} item(s) behind: {}", .failures.len(), join_failures(.failures))]
    PartialReset { failures: Vec<DeleteFailure> },

    #[error("configuration error: {0}")]
    Config(String),
}

fn join_failures(failures: &[DeleteFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PipelineError {
    pub(crate) fn missing_field(field: &'static str) -> Self {
        PipelineError::MalformedRow {
            field,
            reason: "missing".to_string(),
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => PipelineError::NotFound { kind, id },
            StoreError::Unavailable(msg) => PipelineError::StoreUnavailable(msg),
            StoreError::ConstraintViolation(msg) => PipelineError::StoreConstraintViolation(msg),
        }
    }
}
