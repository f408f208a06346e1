//! # Store Errors

use thiserror::Error;

/// Result type for registry operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Registry errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("function not found: {0}")]
    FunctionNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("cannot save registry without a backing file path")]
    NoBackingPath,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::FunctionNotFound(_) | StoreError::TaskNotFound(_) => 404,
            StoreError::NoBackingPath
            | StoreError::Io(_)
            | StoreError::Json(_)
            | StoreError::Internal(_) => 500,
        }
    }
}
