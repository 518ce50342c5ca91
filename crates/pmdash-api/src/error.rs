//! API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: the request never produced a response.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The server answered with a non-success status. `body` carries the
    /// response text verbatim so callers can surface it unchanged.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub type ApiResult<T> = Result<T, ApiError>;
