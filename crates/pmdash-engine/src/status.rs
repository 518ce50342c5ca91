//! Derived per-market display status.

use crate::pending::{PendingCommands, PendingKind};
use pmdash_core::{MarketId, MarketStatus};
use pmdash_feed::LivenessTracker;
use std::time::Instant;

/// Derive the status shown for a market. An unresolved optimistic
/// command wins over liveness; otherwise recency decides.
pub fn market_status(
    pending: &PendingCommands,
    liveness: &LivenessTracker,
    id: MarketId,
    now: Instant,
) -> MarketStatus {
    match pending.get(id) {
        Some(PendingKind::Start) => MarketStatus::Starting,
        Some(PendingKind::Stop) => MarketStatus::Stopping,
        None => {
            if liveness.is_active(id, now) {
                MarketStatus::Active
            } else {
                MarketStatus::Idle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pending_start_wins_over_liveness() {
        let pending = PendingCommands::new();
        let liveness = LivenessTracker::new();
        let id = MarketId::new(1);
        let now = Instant::now();

        liveness.record_tick(id, now);
        pending.set(id, PendingKind::Start);

        assert_eq!(market_status(&pending, &liveness, id, now), MarketStatus::Starting);
    }

    #[test]
    fn test_pending_stop_wins_over_liveness() {
        let pending = PendingCommands::new();
        let liveness = LivenessTracker::new();
        let id = MarketId::new(1);
        let now = Instant::now();

        liveness.record_tick(id, now);
        pending.set(id, PendingKind::Stop);

        assert_eq!(market_status(&pending, &liveness, id, now), MarketStatus::Stopping);
    }

    #[test]
    fn test_liveness_decides_without_pending() {
        let pending = PendingCommands::new();
        let liveness = LivenessTracker::new();
        let id = MarketId::new(1);
        let base = Instant::now();

        assert_eq!(market_status(&pending, &liveness, id, base), MarketStatus::Idle);

        liveness.record_tick(id, base);
        assert_eq!(
            market_status(&pending, &liveness, id, base + Duration::from_millis(100)),
            MarketStatus::Active
        );
        assert_eq!(
            market_status(&pending, &liveness, id, base + Duration::from_millis(6000)),
            MarketStatus::Idle
        );
    }
}
