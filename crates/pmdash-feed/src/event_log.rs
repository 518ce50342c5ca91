//! Bounded per-market event log.
//!
//! Human-readable audit trail of ticks and lifecycle transitions. Each
//! line carries enough (kind, pnl, inventory, timestamp) for an operator
//! to reconstruct history without the chart.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pmdash_core::{MarketId, PnlTick};
use std::collections::VecDeque;

/// Lines kept per market, oldest evicted first.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Bounded ordered list of formatted lines, keyed by market.
pub struct EventLog {
    lines: DashMap<MarketId, VecDeque<String>>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: DashMap::new(),
            capacity,
        }
    }

    pub fn append(&self, market_id: MarketId, line: impl Into<String>) {
        let mut entry = self.lines.entry(market_id).or_default();
        entry.push_back(line.into());
        while entry.len() > self.capacity {
            entry.pop_front();
        }
    }

    /// Lines most-recent-first, as surfaced to a viewer.
    pub fn recent(&self, market_id: MarketId) -> Vec<String> {
        self.lines
            .get(&market_id)
            .map(|entry| entry.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, market_id: MarketId) -> usize {
        self.lines.get(&market_id).map_or(0, |entry| entry.len())
    }

    pub fn is_empty(&self, market_id: MarketId) -> bool {
        self.len(market_id) == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a tick event line.
pub fn format_tick_line(tick: &PnlTick) -> String {
    format!(
        "{} tick pnl={} inventory={}",
        human_timestamp(tick.received_at),
        tick.pnl,
        tick.inventory
    )
}

/// Format a lifecycle event line (command outcomes, channel transitions).
pub fn format_lifecycle_line(at: DateTime<Utc>, event: &str) -> String {
    format!("{} {}", human_timestamp(at), event)
}

fn human_timestamp(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}
