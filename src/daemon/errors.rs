//! # Daemon Errors

use thiserror::Error;

/// Result type for daemon lifecycle operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Daemon lifecycle errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}
