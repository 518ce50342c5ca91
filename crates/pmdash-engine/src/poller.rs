//! Periodic market-roster snapshot polling.

use crate::pending::PendingCommands;
use crate::roster::MarketRoster;
use pmdash_api::ApiResult;
use pmdash_core::Market;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cadence of roster snapshots.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Snapshot seam; implemented by `ApiClient`, stubbed in tests.
pub trait SnapshotSource: Send + Sync {
    fn fetch_markets(&self) -> impl std::future::Future<Output = ApiResult<Vec<Market>>> + Send;
}

impl SnapshotSource for pmdash_api::ApiClient {
    async fn fetch_markets(&self) -> ApiResult<Vec<Market>> {
        self.list_markets().await
    }
}

/// Polls the backend roster on an interval, immediately at startup, and
/// whenever a command outcome nudges `refresh`.
pub struct SnapshotPoller<S: SnapshotSource> {
    source: Arc<S>,
    roster: Arc<MarketRoster>,
    pending: Arc<PendingCommands>,
    interval: Duration,
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
}

impl<S: SnapshotSource> SnapshotPoller<S> {
    pub fn new(
        source: Arc<S>,
        roster: Arc<MarketRoster>,
        pending: Arc<PendingCommands>,
        refresh: Arc<Notify>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            roster,
            pending,
            interval: POLL_INTERVAL,
            refresh,
            shutdown,
        }
    }

    /// Override the default [`POLL_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until shutdown. First poll fires immediately so the roster is
    /// populated before the first interval elapses.
    pub async fn run(&self) {
        loop {
            self.poll_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.refresh.notified() => {
                    debug!("Roster refresh requested");
                }
                _ = self.shutdown.cancelled() => {
                    debug!("Snapshot poller shutting down");
                    return;
                }
            }
        }
    }

    /// One snapshot attempt. An applied snapshot is authoritative and
    /// clears all optimistic command markers; a failed poll retains the
    /// previous roster and is never retried out of cadence.
    pub async fn poll_once(&self) {
        match self.source.fetch_markets().await {
            Ok(markets) => {
                debug!(count = markets.len(), "Applying roster snapshot");
                self.pending.clear_all();
                self.roster.apply_snapshot(markets);
            }
            Err(e) => {
                warn!(%e, "Roster poll failed, retaining previous snapshot");
            }
        }
    }
}
