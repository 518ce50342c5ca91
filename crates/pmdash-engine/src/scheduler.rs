//! Background derivation of the active-market set.
//!
//! Liveness is a function of wall-clock silence, so a market can go
//! inactive without any message arriving. Recomputing the set on a short
//! timer means the transition shows up within ~500ms of the window
//! expiring rather than on the next tick.

use pmdash_core::MarketId;
use pmdash_feed::LivenessTracker;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cadence of active-set recomputation.
pub const ACTIVE_REFRESH: Duration = Duration::from_millis(500);

/// Maintains a cached snapshot of which markets are currently live.
pub struct ActiveScheduler {
    liveness: Arc<LivenessTracker>,
    active: RwLock<HashSet<MarketId>>,
}

impl ActiveScheduler {
    pub fn new(liveness: Arc<LivenessTracker>) -> Self {
        Self {
            liveness,
            active: RwLock::new(HashSet::new()),
        }
    }

    /// Recompute the active set as of `now`.
    pub fn refresh_once(&self, now: Instant) {
        let current = self.liveness.active_ids(now);
        *self.active.write() = current;
    }

    /// Last computed active set.
    pub fn active(&self) -> HashSet<MarketId> {
        self.active.read().clone()
    }

    pub fn is_active(&self, id: MarketId) -> bool {
        self.active.read().contains(&id)
    }

    /// Run until shutdown, refreshing on the given cadence
    /// (normally [`ACTIVE_REFRESH`]).
    pub async fn run(&self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once(Instant::now());
                }
                _ = shutdown.cancelled() => {
                    debug!("Active scheduler shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmdash_feed::ACTIVE_WINDOW;

    #[test]
    fn test_refresh_tracks_window_expiry() {
        let liveness = Arc::new(LivenessTracker::new());
        let scheduler = ActiveScheduler::new(liveness.clone());
        let id = MarketId::new(1);
        let base = Instant::now();

        liveness.record_tick(id, base);

        scheduler.refresh_once(base + Duration::from_millis(100));
        assert!(scheduler.is_active(id));

        // Silence past the window drops the market from the set.
        scheduler.refresh_once(base + ACTIVE_WINDOW);
        assert!(!scheduler.is_active(id));
        assert!(scheduler.active().is_empty());
    }

    #[test]
    fn test_active_returns_copy() {
        let liveness = Arc::new(LivenessTracker::new());
        let scheduler = ActiveScheduler::new(liveness.clone());
        let base = Instant::now();

        liveness.record_tick(MarketId::new(1), base);
        scheduler.refresh_once(base);

        let mut copy = scheduler.active();
        copy.clear();
        assert!(scheduler.is_active(MarketId::new(1)));
    }
}
