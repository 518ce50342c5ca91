//! Bounded per-market PnL time series.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pmdash_core::MarketId;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Samples kept per market for sparkline/metric rendering.
pub const PNL_HISTORY_CAPACITY: usize = 80;

/// One (arrival timestamp, value) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnlSample {
    pub at: DateTime<Utc>,
    pub pnl: Decimal,
}

/// Append-only sliding-window history of PnL samples, keyed by market.
///
/// Entries for markets that have since disappeared from the roster are
/// harmless; they are simply never read again.
pub struct PnlHistory {
    series: DashMap<MarketId, VecDeque<PnlSample>>,
    capacity: usize,
}

impl PnlHistory {
    pub fn new() -> Self {
        Self::with_capacity(PNL_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            series: DashMap::new(),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when the window is full.
    pub fn append(&self, market_id: MarketId, at: DateTime<Utc>, pnl: Decimal) {
        let mut entry = self.series.entry(market_id).or_default();
        entry.push_back(PnlSample { at, pnl });
        while entry.len() > self.capacity {
            entry.pop_front();
        }
    }

    /// Snapshot of the series in arrival order. The returned vector is a
    /// copy; callers cannot mutate internal state through it.
    pub fn samples(&self, market_id: MarketId) -> Vec<PnlSample> {
        self.series
            .get(&market_id)
            .map(|entry| entry.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, market_id: MarketId) -> usize {
        self.series.get(&market_id).map_or(0, |entry| entry.len())
    }

    pub fn is_empty(&self, market_id: MarketId) -> bool {
        self.len(market_id) == 0
    }
}

impl Default for PnlHistory {
    fn default() -> Self {
        Self::new()
    }
}
