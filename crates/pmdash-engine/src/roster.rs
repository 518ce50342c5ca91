//! Authoritative market roster.
//!
//! Holds the last successful snapshot. A failed poll never blanks it;
//! stale-but-present beats empty for a monitoring view.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pmdash_core::{Market, MarketId};

/// Last successful snapshot of the backend's market list.
#[derive(Debug, Default)]
pub struct MarketRoster {
    markets: RwLock<Vec<Market>>,
    fetched_at: RwLock<Option<DateTime<Utc>>>,
}

impl MarketRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster with a fresh authoritative snapshot.
    pub fn apply_snapshot(&self, markets: Vec<Market>) {
        *self.markets.write() = markets;
        *self.fetched_at.write() = Some(Utc::now());
    }

    /// Copy of the roster in server order.
    pub fn markets(&self) -> Vec<Market> {
        self.markets.read().clone()
    }

    pub fn get(&self, id: MarketId) -> Option<Market> {
        self.markets.read().iter().find(|m| m.id == id).cloned()
    }

    pub fn contains(&self, id: MarketId) -> bool {
        self.markets.read().iter().any(|m| m.id == id)
    }

    /// When the roster was last successfully refreshed; `None` until the
    /// first poll lands.
    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        *self.fetched_at.read()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.read().is_empty()
    }
}
