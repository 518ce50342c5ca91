//! Core domain types for the pmdash market dashboard.
//!
//! This crate provides the fundamental types shared by the engine crates:
//! - `MarketId`, `Market`: identity and authoritative roster records
//! - `PnlTick`: one push-channel PnL sample
//! - `MarketStatus`: derived per-market status for presentation
//! - `Credential`: bearer token from the wallet handshake

pub mod credential;
pub mod error;
pub mod market;
pub mod tick;

pub use credential::Credential;
pub use error::{CoreError, Result};
pub use market::{Market, MarketId, MarketStatus, NewMarket, MAX_SPREAD_BPS};
pub use tick::PnlTick;
