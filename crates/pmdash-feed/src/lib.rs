//! Tick ingestion and derived per-market state for pmdash.
//!
//! Turns the raw push-channel stream into the three per-market views the
//! dashboard renders: a bounded PnL time series, a recency-based liveness
//! flag, and a bounded human-readable event log.

pub mod error;
pub mod event_log;
pub mod history;
pub mod ingest;
pub mod liveness;

pub use error::{FeedError, FeedResult};
pub use event_log::{EventLog, EVENT_LOG_CAPACITY};
pub use history::{PnlHistory, PnlSample, PNL_HISTORY_CAPACITY};
pub use ingest::{IngestStats, TickIngestor};
pub use liveness::{LivenessTracker, ACTIVE_WINDOW};
