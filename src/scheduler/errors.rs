//! # Scheduler Errors

use std::time::Duration;

use thiserror::Error;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler errors
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// Periods must be a whole, non-zero number of seconds.
    #[error("invalid period {0:?}: must be a whole number of seconds, at least one")]
    InvalidPeriod(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}
