//! Push-channel message ingestion.
//!
//! Parses raw text frames into `PnlTick`s. Fails closed: anything that is
//! not a well-formed `pnl_tick` message is silently dropped and counted.
//! No error ever escapes the message handler.

use crate::error::{FeedError, FeedResult};
use pmdash_core::{MarketId, PnlTick};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// The only recognized message type on the PnL channel.
const TICK_TYPE: &str = "pnl_tick";

/// Accept/drop counters for the ingestion path.
#[derive(Debug, Default)]
pub struct IngestStats {
    accepted_count: AtomicU64,
    dropped_count: AtomicU64,
}

impl IngestStats {
    pub fn record_accepted(&self) {
        self.accepted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accepted(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }
}

/// Raw tick message shape. `market_id` must be numeric; a string id is a
/// shape mismatch and the whole message is dropped.
#[derive(Debug, Deserialize)]
struct RawTick {
    #[serde(rename = "type")]
    kind: String,
    market_id: u64,
    pnl: Decimal,
    #[serde(default)]
    inventory: Option<Decimal>,
}

/// Tick message parser.
pub struct TickIngestor {
    stats: IngestStats,
}

impl TickIngestor {
    pub fn new() -> Self {
        Self {
            stats: IngestStats::default(),
        }
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Parse one raw frame. Returns `None` for anything malformed or
    /// unrecognized; never panics, never propagates an error.
    pub fn on_message(&self, raw: &str) -> Option<PnlTick> {
        match self.parse(raw) {
            Ok(tick) => {
                self.stats.record_accepted();
                Some(tick)
            }
            Err(e) => {
                trace!(%e, "Dropping push message");
                self.stats.record_dropped();
                None
            }
        }
    }

    fn parse(&self, raw: &str) -> FeedResult<PnlTick> {
        let parsed: RawTick = serde_json::from_str(raw)
            .map_err(|e| FeedError::Parse(format!("Malformed push message: {e}")))?;

        if parsed.kind != TICK_TYPE {
            return Err(FeedError::Parse(format!(
                "Unrecognized message type: {}",
                parsed.kind
            )));
        }

        Ok(PnlTick::observed(
            MarketId::new(parsed.market_id),
            parsed.pnl,
            parsed.inventory.unwrap_or(Decimal::ZERO),
        ))
    }
}

impl Default for TickIngestor {
    fn default() -> Self {
        Self::new()
    }
}
