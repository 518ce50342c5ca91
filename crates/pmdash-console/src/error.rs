//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] pmdash_core::CoreError),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] pmdash_ws::WsError),

    #[error("API error: {0}")]
    Api(#[from] pmdash_api::ApiError),

    #[error("Auth error: {0}")]
    Auth(#[from] pmdash_auth::AuthError),

    #[error("Command error: {0}")]
    Command(#[from] pmdash_engine::CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
