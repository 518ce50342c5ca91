//! Auth error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("API error: {0}")]
    Api(#[from] pmdash_api::ApiError),

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
