//! Error types for Shardline collaborators.

use thiserror::Error;

/// Result type alias for collaborator operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors a constraint engine or cluster source may report.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("invalid constraint `{text}`: {reason}")]
    InvalidConstraint { text: String, reason: String },

    #[error("cluster source unavailable: {0}")]
    Unavailable(String),
}
