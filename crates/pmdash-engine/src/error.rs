//! Engine error types.

use pmdash_core::MarketId;
use thiserror::Error;

/// Outcome of a failed start/stop command.
///
/// None of these retry automatically; the operator re-issues.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A command for this market is already outstanding; rejected locally
    /// without touching the backend.
    #[error("Command already pending for market {0}")]
    Busy(MarketId),

    /// The server answered non-success; `detail` is the response body
    /// verbatim.
    #[error("Command rejected: HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The request never produced a response.
    #[error("Command transport failed: {0}")]
    Transport(String),

    /// The owning context was disposed while the request was in flight;
    /// the result was discarded without mutating state.
    #[error("Context disposed before command completed")]
    Disposed,
}
