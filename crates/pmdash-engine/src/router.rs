//! Routes parsed ticks into the per-market state views.

use crate::pending::PendingCommands;
use chrono::Utc;
use pmdash_core::PnlTick;
use pmdash_feed::event_log::{format_lifecycle_line, format_tick_line};
use pmdash_feed::{EventLog, LivenessTracker, PnlHistory, TickIngestor};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Fans each accepted tick out to the history, liveness, and event views,
/// and lets a tick corroborate a pending start.
pub struct TickRouter {
    ingestor: TickIngestor,
    history: Arc<PnlHistory>,
    liveness: Arc<LivenessTracker>,
    events: Arc<EventLog>,
    pending: Arc<PendingCommands>,
}

impl TickRouter {
    pub fn new(
        history: Arc<PnlHistory>,
        liveness: Arc<LivenessTracker>,
        events: Arc<EventLog>,
        pending: Arc<PendingCommands>,
    ) -> Self {
        Self {
            ingestor: TickIngestor::new(),
            history,
            liveness,
            events,
            pending,
        }
    }

    pub fn ingestor(&self) -> &TickIngestor {
        &self.ingestor
    }

    /// Handle one raw frame. All views update for every accepted tick,
    /// including ticks for markets absent from the current roster.
    pub fn route(&self, raw: &str) {
        let Some(tick) = self.ingestor.on_message(raw) else {
            return;
        };
        self.apply(&tick);
    }

    fn apply(&self, tick: &PnlTick) {
        trace!(market_id = %tick.market_id, pnl = %tick.pnl, "Routing tick");

        self.history
            .append(tick.market_id, tick.received_at, tick.pnl);
        self.liveness.record_tick(tick.market_id, Instant::now());
        self.events.append(tick.market_id, format_tick_line(tick));

        // A real tick is the corroboration an optimistic start was
        // waiting for. Stop markers expire by silence, not by ticks.
        if self.pending.clear_on_tick(tick.market_id) {
            info!(market_id = %tick.market_id, "Start confirmed by tick");
            self.events.append(
                tick.market_id,
                format_lifecycle_line(Utc::now(), "start confirmed by tick"),
            );
        }
    }

    /// Consume raw frames from the connection until the channel closes or
    /// shutdown fires.
    pub async fn run(&self, mut rx: mpsc::Receiver<String>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    match frame {
                        Some(raw) => self.route(&raw),
                        None => {
                            debug!("Tick channel closed");
                            return;
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    debug!("Tick router shutting down");
                    return;
                }
            }
        }
    }
}
