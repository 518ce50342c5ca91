//! Market identity and roster record types.
//!
//! Authoritative `Market` records come only from the snapshot poll; the
//! engine never fabricates one, it only derives status on top of them.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque market identifier assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(pub u64);

impl MarketId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One authoritative roster entry as returned by `GET /markets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    /// Display name (e.g., "Election").
    pub name: String,
    /// External venue identifier the backend trades against.
    pub external_id: String,
    /// Configured spread in basis points.
    pub base_spread_bps: u32,
    /// Whether the market is enabled in the backend configuration.
    pub enabled: bool,
}

/// Request body for market creation (`POST /markets`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMarket {
    pub name: String,
    pub external_id: String,
    pub base_spread_bps: u32,
    pub enabled: bool,
}

/// Widest spread accepted: 10000 bps is the full price.
pub const MAX_SPREAD_BPS: u32 = 10_000;

impl NewMarket {
    /// Check the request locally before it goes on the wire. The backend
    /// validates again; this just saves an obviously-doomed round trip.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidRequest("name must not be empty".to_string()));
        }
        if self.external_id.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "external_id must not be empty".to_string(),
            ));
        }
        if self.base_spread_bps == 0 || self.base_spread_bps > MAX_SPREAD_BPS {
            return Err(CoreError::InvalidSpread(format!(
                "base_spread_bps must be in 1..={MAX_SPREAD_BPS}, got {}",
                self.base_spread_bps
            )));
        }
        Ok(())
    }
}

/// Derived per-market status for a roster row.
///
/// Pending command markers win over liveness, matching the original
/// dashboard: a market the operator just started shows "Starting" until a
/// tick or snapshot corroborates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// No recent ticks, nothing pending.
    Idle,
    /// Start issued, not yet corroborated.
    Starting,
    /// Stop issued, not yet corroborated.
    Stopping,
    /// A tick arrived within the liveness window.
    Active,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Starting => write!(f, "Starting"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Active => write!(f, "Active"),
        }
    }
}
