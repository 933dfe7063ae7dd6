//! Network-subsystem error type.

use thiserror::Error;

use lm_core::{LinkId, NodeId};

/// Errors produced by `lm-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("link {0} not found in network")]
    LinkNotFound(LinkId),

    #[error("link {0} was added twice")]
    DuplicateLink(LinkId),

    #[error("invalid link {link}: {reason}")]
    InvalidLink { link: LinkId, reason: String },

    #[error("turn from {from} to {to} does not pass through node {via}")]
    InvalidTurn { from: LinkId, to: LinkId, via: NodeId },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
