//! REST client for the pmdash backend.
//!
//! Covers the full consumed surface: market roster and CRUD, start/stop
//! commands, the wallet nonce/verify handshake, health, and the latest
//! PnL fetch. Mutating calls attach an optional bearer credential;
//! absence of a credential never fails the call client-side.

pub mod client;
pub mod error;

pub use client::{ApiClient, LatestPnl, NonceChallenge, VerifiedSession};
pub use error::{ApiError, ApiResult};
