//! Matching error type.
//!
//! These errors never reach the caller of a match: the matchers convert them
//! into [`MatchStatus::Exception`](crate::MatchStatus::Exception) and log
//! them.  Only [`MatchError::Config`] is returned directly, from matcher
//! construction.

use thiserror::Error;

use lm_network::NetworkError;
use lm_reach::ReachError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("match configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("reachability error: {0}")]
    Reach(#[from] ReachError),

    /// No candidate of observation `observation` is reachable from any
    /// surviving candidate of the previous observation.
    #[error("HMM sequence broken at observation {observation}")]
    BrokenSequence { observation: usize },
}

pub type MatchResult<T> = Result<T, MatchError>;
