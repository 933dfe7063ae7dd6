//! Shared error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Text that does not read as a coordinate pair.
    #[error("invalid point {0:?}: expected \"x y\"")]
    InvalidPoint(String),
}

/// Shorthand result type for `lm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
