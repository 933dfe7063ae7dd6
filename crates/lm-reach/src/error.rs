//! Reachability error type.
//!
//! Every variant is a precondition violation: searches themselves cannot
//! fail once started.

use thiserror::Error;

use lm_core::NodeId;

#[derive(Debug, Error)]
pub enum ReachError {
    #[error("reachability search already ran; create a new search per query")]
    AlreadySearched,

    #[error("start node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("search limit must be positive and finite, got {0}")]
    InvalidLimit(f64),

    #[error("unknown metric {0:?}: expected \"time\", \"distance\", or \"weight\"")]
    UnknownMetric(String),
}

pub type ReachResult<T> = Result<T, ReachError>;
