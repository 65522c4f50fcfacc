use thiserror::Error;

use crate::node_id::ParseNodeIdError;

/// Raised by snapshot-accepting constructors when I1-I4 (§3) are violated.
/// The sole error kind the routing table itself can produce; never
/// recovered internally.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid snapshot: {0}")]
pub struct InvalidSnapshot(pub String);

impl InvalidSnapshot {
    pub(crate) fn new(reason: &'static str) -> Self {
        Self(reason.to_string())
    }
}

/// Raised only by persistence adapters; wraps the underlying cause
/// verbatim rather than re-interpreting it.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot document: {0}")]
    Format(#[from] serde_json::Error),
    #[error("loaded snapshot failed validation: {0}")]
    InvalidSnapshot(#[from] InvalidSnapshot),
    #[error("malformed node id in snapshot document: {0}")]
    InvalidNodeId(#[from] ParseNodeIdError),
}
