//! WebSocket client for the pmdash PnL push channel.
//!
//! Provides a single-connection manager with:
//! - Observable status transitions (connecting/open/closed)
//! - Bounded exponential-backoff reconnection with jitter
//! - Raw text frames forwarded downstream in arrival order

pub mod connection;
pub mod error;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
