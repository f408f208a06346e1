//! # Dispatch Errors

use thiserror::Error;

/// Result type for invocation dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Invocation dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invocation is only permitted through a registered task.
    #[error("no task registered for function: {0}")]
    TaskNotFound(String),

    /// The function has no deployments to invoke.
    #[error("function not found: {0}")]
    FunctionNotExists(String),

    /// The remote call failed at the transport level.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The function registry could not be read.
    #[error("registry error: {0}")]
    Store(#[from] crate::store::StoreError),
}
