//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur during scheduling operations.
///
/// Resource shortfalls, device mismatches and hot nodes are folded into the
/// cost score; only an empty candidate set fails a call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("no valid nodes for shard `{shard}` (constraint: {})", .constraint.as_deref().unwrap_or("none"))]
    NoValidNodes {
        shard: String,
        constraint: Option<String>,
    },
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
