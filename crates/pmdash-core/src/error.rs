//! Error types for pmdash-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid spread: {0}")]
    InvalidSpread(String),

    #[error("Invalid market request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
