//! Optimistic pending-command markers.
//!
//! A marker is set when a start/stop is issued and cleared by whichever
//! arrives first: a corroborating tick, the next applied snapshot, or the
//! command's own failure.

use dashmap::DashMap;
use pmdash_core::MarketId;

/// Kind of command awaiting corroboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Start,
    Stop,
}

/// Per-market pending-command set, shared between the reconciler (writes),
/// the tick router (tick corroboration) and the poller (snapshot
/// supersedes all optimism).
#[derive(Debug, Default)]
pub struct PendingCommands {
    map: DashMap<MarketId, PendingKind>,
}

impl PendingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, market_id: MarketId, kind: PendingKind) {
        self.map.insert(market_id, kind);
    }

    pub fn get(&self, market_id: MarketId) -> Option<PendingKind> {
        self.map.get(&market_id).map(|entry| *entry.value())
    }

    pub fn clear(&self, market_id: MarketId) {
        self.map.remove(&market_id);
    }

    /// A tick corroborates a pending start. Returns `true` if a start
    /// marker was cleared. A pending stop is left for the snapshot.
    pub fn clear_on_tick(&self, market_id: MarketId) -> bool {
        self.map
            .remove_if(&market_id, |_, kind| *kind == PendingKind::Start)
            .is_some()
    }

    /// An applied snapshot is a full authoritative cycle; every marker it
    /// covers is superseded.
    pub fn clear_all(&self) {
        self.map.clear();
    }

    pub fn is_pending(&self, market_id: MarketId) -> bool {
        self.map.contains_key(&market_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let pending = PendingCommands::new();
        let id = MarketId::new(1);

        assert_eq!(pending.get(id), None);
        pending.set(id, PendingKind::Start);
        assert_eq!(pending.get(id), Some(PendingKind::Start));
        pending.clear(id);
        assert!(!pending.is_pending(id));
    }

    #[test]
    fn test_tick_clears_start_but_not_stop() {
        let pending = PendingCommands::new();
        let id = MarketId::new(1);

        pending.set(id, PendingKind::Start);
        assert!(pending.clear_on_tick(id));
        assert!(!pending.is_pending(id));

        pending.set(id, PendingKind::Stop);
        assert!(!pending.clear_on_tick(id));
        assert_eq!(pending.get(id), Some(PendingKind::Stop));
    }

    #[test]
    fn test_snapshot_clears_everything() {
        let pending = PendingCommands::new();
        pending.set(MarketId::new(1), PendingKind::Start);
        pending.set(MarketId::new(2), PendingKind::Stop);

        pending.clear_all();
        assert!(!pending.is_pending(MarketId::new(1)));
        assert!(!pending.is_pending(MarketId::new(2)));
    }
}
