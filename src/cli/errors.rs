//! # CLI Errors

use thiserror::Error;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// CLI command errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Store(#[from] crate::store::StoreError),

    #[error("{0}")]
    Client(#[from] crate::client::ClientError),

    #[error("{0}")]
    Daemon(#[from] crate::daemon::DaemonError),
}
