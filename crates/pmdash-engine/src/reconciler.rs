//! Optimistic start/stop command reconciliation.
//!
//! Commands apply local state immediately on success (mark-active for
//! start, clear-recency for stop) and rely on the tick stream and the
//! next snapshot for eventual truth. A command's own response is never
//! treated as authoritative, which is why every outcome nudges the
//! snapshot poller.

use crate::error::CommandError;
use crate::pending::{PendingCommands, PendingKind};
use chrono::Utc;
use dashmap::DashMap;
use pmdash_api::{ApiError, ApiResult};
use pmdash_core::{Credential, MarketId};
use pmdash_feed::event_log::format_lifecycle_line;
use pmdash_feed::{EventLog, LivenessTracker};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Transport seam for start/stop; implemented by `ApiClient`, stubbed in
/// tests.
pub trait CommandTransport: Send + Sync {
    fn start_market(
        &self,
        id: MarketId,
        credential: Option<&Credential>,
    ) -> impl std::future::Future<Output = ApiResult<()>> + Send;

    fn stop_market(
        &self,
        id: MarketId,
        credential: Option<&Credential>,
    ) -> impl std::future::Future<Output = ApiResult<()>> + Send;
}

impl CommandTransport for pmdash_api::ApiClient {
    async fn start_market(&self, id: MarketId, credential: Option<&Credential>) -> ApiResult<()> {
        pmdash_api::ApiClient::start_market(self, id, credential).await
    }

    async fn stop_market(&self, id: MarketId, credential: Option<&Credential>) -> ApiResult<()> {
        pmdash_api::ApiClient::stop_market(self, id, credential).await
    }
}

/// Command reconciler.
///
/// At most one outstanding command per market: a second start/stop for
/// the same id while one is in flight (or while the same kind is still
/// awaiting corroboration) is rejected locally, never sent.
pub struct CommandReconciler<T: CommandTransport> {
    transport: Arc<T>,
    liveness: Arc<LivenessTracker>,
    events: Arc<EventLog>,
    pending: Arc<PendingCommands>,
    /// In-flight request guard, cleared when the request resolves.
    busy: DashMap<MarketId, ()>,
    /// Wakes the snapshot poller after every command outcome.
    refresh: Arc<Notify>,
    disposed: CancellationToken,
}

impl<T: CommandTransport> CommandReconciler<T> {
    pub fn new(
        transport: Arc<T>,
        liveness: Arc<LivenessTracker>,
        events: Arc<EventLog>,
        pending: Arc<PendingCommands>,
        refresh: Arc<Notify>,
    ) -> Self {
        Self {
            transport,
            liveness,
            events,
            pending,
            busy: DashMap::new(),
            refresh,
            disposed: CancellationToken::new(),
        }
    }

    /// Dispose the reconciler: in-flight requests complete but their
    /// results are discarded without mutating state.
    pub fn dispose(&self) {
        self.disposed.cancel();
    }

    pub fn is_busy(&self, id: MarketId) -> bool {
        self.busy.contains_key(&id)
    }

    /// Issue a start command.
    pub async fn start(
        &self,
        id: MarketId,
        credential: Option<&Credential>,
    ) -> Result<(), CommandError> {
        self.acquire(id, PendingKind::Start)?;
        self.events
            .append(id, format_lifecycle_line(Utc::now(), "start requested"));

        let result = self.transport.start_market(id, credential).await;
        self.busy.remove(&id);

        if self.disposed.is_cancelled() {
            self.pending.clear(id);
            return Err(CommandError::Disposed);
        }

        match result {
            Ok(()) => {
                // Optimistic: show the market active now; real ticks keep
                // it alive, or the mark expires after the liveness window.
                self.liveness.mark_active_now(id);
                self.events
                    .append(id, format_lifecycle_line(Utc::now(), "start accepted"));
                info!(market_id = %id, "Start accepted");
                self.refresh.notify_one();
                Ok(())
            }
            Err(e) => Err(self.command_failed(id, "start", e)),
        }
    }

    /// Issue a stop command.
    pub async fn stop(
        &self,
        id: MarketId,
        credential: Option<&Credential>,
    ) -> Result<(), CommandError> {
        self.acquire(id, PendingKind::Stop)?;
        self.events
            .append(id, format_lifecycle_line(Utc::now(), "stop requested"));

        let result = self.transport.stop_market(id, credential).await;
        self.busy.remove(&id);

        if self.disposed.is_cancelled() {
            self.pending.clear(id);
            return Err(CommandError::Disposed);
        }

        match result {
            Ok(()) => {
                // Do not keep showing "Active" for a market the operator
                // just stopped; silence from the stream confirms later.
                self.liveness.clear(id);
                self.events
                    .append(id, format_lifecycle_line(Utc::now(), "stop accepted"));
                info!(market_id = %id, "Stop accepted");
                self.refresh.notify_one();
                Ok(())
            }
            Err(e) => Err(self.command_failed(id, "stop", e)),
        }
    }

    /// Reserve the busy guard and set the optimistic marker, or reject
    /// the duplicate locally.
    fn acquire(&self, id: MarketId, kind: PendingKind) -> Result<(), CommandError> {
        if self.pending.get(id) == Some(kind) {
            return Err(CommandError::Busy(id));
        }

        match self.busy.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(CommandError::Busy(id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
            }
        }

        self.pending.set(id, kind);
        Ok(())
    }

    fn command_failed(&self, id: MarketId, verb: &str, e: ApiError) -> CommandError {
        self.pending.clear(id);
        self.refresh.notify_one();

        match e {
            ApiError::Status { status, body } => {
                warn!(market_id = %id, status, %body, "{verb} rejected by backend");
                self.events.append(
                    id,
                    format_lifecycle_line(Utc::now(), &format!("{verb} rejected: {body}")),
                );
                CommandError::Rejected {
                    status,
                    detail: body,
                }
            }
            other => {
                warn!(market_id = %id, %other, "{verb} transport failure");
                self.events
                    .append(id, format_lifecycle_line(Utc::now(), &format!("{verb} failed")));
                CommandError::Transport(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct StubTransport {
        start_results: Mutex<Vec<ApiResult<()>>>,
        stop_results: Mutex<Vec<ApiResult<()>>>,
        seen_credentials: Mutex<Vec<Option<String>>>,
    }

    impl StubTransport {
        fn with_start(results: Vec<ApiResult<()>>) -> Self {
            Self {
                start_results: Mutex::new(results),
                ..Default::default()
            }
        }
    }

    impl CommandTransport for StubTransport {
        async fn start_market(
            &self,
            _id: MarketId,
            credential: Option<&Credential>,
        ) -> ApiResult<()> {
            self.seen_credentials
                .lock()
                .unwrap()
                .push(credential.map(|c| c.header_value()));
            self.start_results.lock().unwrap().remove(0)
        }

        async fn stop_market(
            &self,
            _id: MarketId,
            credential: Option<&Credential>,
        ) -> ApiResult<()> {
            self.seen_credentials
                .lock()
                .unwrap()
                .push(credential.map(|c| c.header_value()));
            self.stop_results.lock().unwrap().remove(0)
        }
    }

    fn build(
        transport: StubTransport,
    ) -> (
        CommandReconciler<StubTransport>,
        Arc<LivenessTracker>,
        Arc<PendingCommands>,
        Arc<EventLog>,
    ) {
        let liveness = Arc::new(LivenessTracker::new());
        let events = Arc::new(EventLog::new());
        let pending = Arc::new(PendingCommands::new());
        let reconciler = CommandReconciler::new(
            Arc::new(transport),
            liveness.clone(),
            events.clone(),
            pending.clone(),
            Arc::new(Notify::new()),
        );
        (reconciler, liveness, pending, events)
    }

    #[tokio::test]
    async fn test_successful_start_marks_active_and_leaves_marker() {
        let (reconciler, liveness, pending, events) =
            build(StubTransport::with_start(vec![Ok(())]));
        let id = MarketId::new(1);

        reconciler.start(id, None).await.unwrap();

        assert!(liveness.is_active(id, Instant::now()));
        assert_eq!(pending.get(id), Some(PendingKind::Start));
        assert!(!reconciler.is_busy(id));

        let lines = events.recent(id);
        assert!(lines.iter().any(|l| l.contains("start accepted")));
    }

    #[tokio::test]
    async fn test_failed_start_leaves_liveness_and_clears_marks() {
        let (reconciler, liveness, pending, _events) =
            build(StubTransport::with_start(vec![Err(ApiError::Status {
                status: 500,
                body: "market not found".to_string(),
            })]));
        let id = MarketId::new(1);

        let err = reconciler.start(id, None).await.unwrap_err();
        match err {
            CommandError::Rejected { status, detail } => {
                assert_eq!(status, 500);
                // Body surfaced verbatim.
                assert_eq!(detail, "market not found");
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }

        assert!(!liveness.is_active(id, Instant::now()));
        assert!(!pending.is_pending(id));
        assert!(!reconciler.is_busy(id));
    }

    #[tokio::test]
    async fn test_successful_stop_clears_liveness() {
        let transport = StubTransport {
            stop_results: Mutex::new(vec![Ok(())]),
            ..Default::default()
        };
        let (reconciler, liveness, pending, _events) = build(transport);
        let id = MarketId::new(1);

        liveness.mark_active_now(id);
        reconciler.stop(id, None).await.unwrap();

        assert!(!liveness.is_active(id, Instant::now()));
        assert_eq!(pending.get(id), Some(PendingKind::Stop));
    }

    #[tokio::test]
    async fn test_duplicate_start_rejected_while_marker_pending() {
        let (reconciler, _liveness, _pending, _events) =
            build(StubTransport::with_start(vec![Ok(()), Ok(())]));
        let id = MarketId::new(1);

        reconciler.start(id, None).await.unwrap();
        // Marker still awaiting corroboration: reject locally.
        let err = reconciler.start(id, None).await.unwrap_err();
        assert!(matches!(err, CommandError::Busy(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_once() {
        let (reconciler, _liveness, pending, _events) =
            build(StubTransport::with_start(vec![Err(ApiError::HttpClient(
                "connection refused".to_string(),
            ))]));
        let id = MarketId::new(1);

        let err = reconciler.start(id, None).await.unwrap_err();
        assert!(matches!(err, CommandError::Transport(_)));
        assert!(!pending.is_pending(id));
    }

    #[tokio::test]
    async fn test_disposed_discards_result() {
        let (reconciler, liveness, pending, _events) =
            build(StubTransport::with_start(vec![Ok(())]));
        let id = MarketId::new(1);

        reconciler.dispose();
        let err = reconciler.start(id, None).await.unwrap_err();
        assert!(matches!(err, CommandError::Disposed));

        // No dangling state mutation after teardown.
        assert!(!liveness.is_active(id, Instant::now()));
        assert!(!pending.is_pending(id));
    }

    #[tokio::test]
    async fn test_credential_attached_when_present() {
        let (reconciler, _liveness, _pending, _events) =
            build(StubTransport::with_start(vec![Ok(())]));
        let cred = Credential::new("t1");

        reconciler.start(MarketId::new(1), Some(&cred)).await.unwrap();

        let seen = reconciler.transport.seen_credentials.lock().unwrap();
        assert_eq!(seen.as_slice(), [Some("Bearer t1".to_string())]);
    }
}
