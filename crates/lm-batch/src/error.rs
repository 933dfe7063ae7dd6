//! Error types for lm-batch.

use thiserror::Error;

use lm_match::MatchError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch configuration error: {0}")]
    Config(String),

    #[error("matcher error: {0}")]
    Match(#[from] MatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row was read but its content is malformed.
    #[error("location {id:?}: {reason}")]
    Parse { id: String, reason: String },
}

/// Alias for `Result<T, BatchError>`.
pub type BatchResult<T> = Result<T, BatchError>;
