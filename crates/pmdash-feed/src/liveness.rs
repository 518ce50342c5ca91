//! Recency-based liveness tracking.
//!
//! A market is "active" iff its last tick arrived within the sliding
//! window. Liveness is a pure function of (now, last-tick map); commands
//! only ever touch the map through `mark_active_now` and `clear`.

use dashmap::DashMap;
use pmdash_core::MarketId;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Recency threshold used to classify a market as active.
pub const ACTIVE_WINDOW: Duration = Duration::from_millis(5000);

/// Last-tick recency tracker. Uses monotonic time so wall-clock
/// adjustments cannot flip liveness.
pub struct LivenessTracker {
    last_tick: DashMap<MarketId, Instant>,
    window: Duration,
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self::with_window(ACTIVE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            last_tick: DashMap::new(),
            window,
        }
    }

    /// Record a tick arrival.
    pub fn record_tick(&self, market_id: MarketId, at: Instant) {
        self.last_tick.insert(market_id, at);
    }

    /// Optimistic immediate mark-active, applied when a start command
    /// succeeds. Superseded by real ticks, or expires naturally once the
    /// window elapses with no tick.
    pub fn mark_active_now(&self, market_id: MarketId) {
        self.last_tick.insert(market_id, Instant::now());
    }

    /// Forget the market's recency, applied when a stop command succeeds
    /// so the row does not keep showing "Active".
    pub fn clear(&self, market_id: MarketId) {
        self.last_tick.remove(&market_id);
    }

    /// `true` iff some tick arrived with `now - ts < window`.
    /// No tick ever recorded means never active.
    pub fn is_active(&self, market_id: MarketId, now: Instant) -> bool {
        self.last_tick
            .get(&market_id)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.window)
    }

    /// Derive the set of active market ids at `now`. Pure given the
    /// stored map; invoked on a fixed cadence by the scheduler rather
    /// than from any render path.
    pub fn active_ids(&self, now: Instant) -> HashSet<MarketId> {
        self.last_tick
            .iter()
            .filter(|entry| now.saturating_duration_since(*entry.value()) < self.window)
            .map(|entry| *entry.key())
            .collect()
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}
