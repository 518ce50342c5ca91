//! Main application orchestration.
//!
//! Wires the push channel, tick router, snapshot poller, active-set
//! scheduler, and command reconciler together and runs them until
//! ctrl-c.

use crate::config::AppConfig;
use crate::error::AppResult;
use pmdash_api::ApiClient;
use pmdash_auth::{AuthSession, LocalWalletSigner, TokenStore};
use pmdash_core::{Credential, Market, MarketId, MarketStatus, NewMarket};
use pmdash_engine::{
    market_status, ActiveScheduler, CommandReconciler, MarketRoster, PendingCommands,
    SnapshotPoller, TickRouter,
};
use pmdash_feed::{EventLog, LivenessTracker, PnlHistory};
use pmdash_ws::ConnectionManager;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Raw frame channel depth between the connection and the router.
const MESSAGE_CHANNEL_DEPTH: usize = 1024;

/// Periodic summary log interval.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(60);

/// Main application.
pub struct Application {
    config: AppConfig,
    api: Arc<ApiClient>,
    roster: Arc<MarketRoster>,
    history: Arc<PnlHistory>,
    liveness: Arc<LivenessTracker>,
    events: Arc<EventLog>,
    pending: Arc<PendingCommands>,
    scheduler: Arc<ActiveScheduler>,
    reconciler: Arc<CommandReconciler<ApiClient>>,
    router: Arc<TickRouter>,
    refresh: Arc<Notify>,
    session: Option<AuthSession<ApiClient, LocalWalletSigner>>,
    shutdown: CancellationToken,
}

impl Application {
    /// Create a new application. Persisted credentials are picked up
    /// here, so an authenticated session survives a restart.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let api = Arc::new(ApiClient::new(&config.backend_origin)?);

        let roster = Arc::new(MarketRoster::new());
        let history = Arc::new(PnlHistory::new());
        let liveness = Arc::new(LivenessTracker::new());
        let events = Arc::new(EventLog::new());
        let pending = Arc::new(PendingCommands::new());
        let refresh = Arc::new(Notify::new());

        let scheduler = Arc::new(ActiveScheduler::new(liveness.clone()));
        let reconciler = Arc::new(CommandReconciler::new(
            api.clone(),
            liveness.clone(),
            events.clone(),
            pending.clone(),
            refresh.clone(),
        ));
        let router = Arc::new(TickRouter::new(
            history.clone(),
            liveness.clone(),
            events.clone(),
            pending.clone(),
        ));

        let session = match &config.wallet_key {
            Some(key) => {
                let signer = LocalWalletSigner::from_hex(key)?;
                let store = TokenStore::new(&config.state_dir);
                let session = AuthSession::new(api.as_ref().clone(), signer, store);
                if session.is_authenticated() {
                    info!("Restored persisted wallet session");
                }
                Some(session)
            }
            None => None,
        };

        Ok(Self {
            config,
            api,
            roster,
            history,
            liveness,
            events,
            pending,
            scheduler,
            reconciler,
            router,
            refresh,
            session,
            shutdown: CancellationToken::new(),
        })
    }

    /// Run the challenge-response wallet flow. No-op without a
    /// configured wallet key.
    pub async fn sign_in(&mut self) -> AppResult<()> {
        match self.session.as_mut() {
            Some(session) => {
                let _credential = session.connect().await?;
                info!("Wallet session established");
                Ok(())
            }
            None => {
                warn!("No wallet key configured, commands will be unauthenticated");
                Ok(())
            }
        }
    }

    /// Drop the local session. The token itself is not revoked
    /// server-side.
    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.disconnect();
            info!("Wallet session dropped");
        }
    }

    fn credential(&self) -> Option<&Credential> {
        self.session.as_ref().and_then(|s| s.credential())
    }

    /// Issue a start command for a market.
    pub async fn start_market(&self, id: MarketId) -> AppResult<()> {
        self.reconciler.start(id, self.credential()).await?;
        Ok(())
    }

    /// Issue a stop command for a market.
    pub async fn stop_market(&self, id: MarketId) -> AppResult<()> {
        self.reconciler.stop(id, self.credential()).await?;
        Ok(())
    }

    /// Register a new market, then nudge the roster poller so the new
    /// row shows up without waiting a full poll cycle.
    pub async fn create_market(&self, req: &NewMarket) -> AppResult<Market> {
        req.validate()?;
        let market = self.api.create_market(req, self.credential()).await?;
        self.refresh.notify_one();
        Ok(market)
    }

    /// Current roster with derived per-market status.
    pub fn statuses(&self) -> Vec<(Market, MarketStatus)> {
        let now = Instant::now();
        self.roster
            .markets()
            .into_iter()
            .map(|market| {
                let status = market_status(&self.pending, &self.liveness, market.id, now);
                (market, status)
            })
            .collect()
    }

    pub fn history(&self) -> &PnlHistory {
        &self.history
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Run all background tasks until ctrl-c.
    pub async fn run(&mut self) -> AppResult<()> {
        // Advisory only; the poller and push channel retry on their own.
        match self.api.health().await {
            Ok(()) => info!("Backend reachable"),
            Err(e) => warn!(%e, "Backend health probe failed, continuing"),
        }

        let (message_tx, message_rx) = mpsc::channel(MESSAGE_CHANNEL_DEPTH);

        let manager = Arc::new(ConnectionManager::new(
            self.config.connection_config(),
            message_tx,
        ));
        self.shutdown = manager.shutdown_token();

        let conn_handle = {
            let manager = manager.clone();
            tokio::spawn(async move {
                if let Err(e) = manager.connect().await {
                    warn!(%e, "Push channel terminated");
                }
            })
        };

        let router_handle = {
            let router = self.router.clone();
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                router.run(message_rx, shutdown).await;
            })
        };

        let poller_handle = {
            let poller = SnapshotPoller::new(
                self.api.clone(),
                self.roster.clone(),
                self.pending.clone(),
                self.refresh.clone(),
                self.shutdown.clone(),
            )
            .with_interval(Duration::from_millis(self.config.poll_interval_ms));
            tokio::spawn(async move {
                poller.run().await;
            })
        };

        let scheduler_handle = {
            let scheduler = self.scheduler.clone();
            let interval = Duration::from_millis(self.config.active_refresh_ms);
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                scheduler.run(interval, shutdown).await;
            })
        };

        info!(
            backend = %self.config.backend_origin,
            ws_url = %self.config.ws_url(),
            "pmdash running"
        );

        let mut summary = tokio::time::interval(SUMMARY_INTERVAL);
        summary.tick().await; // First tick fires immediately, skip it.

        loop {
            tokio::select! {
                _ = summary.tick() => {
                    self.log_summary();
                }
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(%e, "Failed to listen for ctrl-c");
                    }
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        self.reconciler.dispose();
        manager.shutdown();

        let _ = conn_handle.await;
        let _ = router_handle.await;
        let _ = poller_handle.await;
        let _ = scheduler_handle.await;

        info!("pmdash stopped");
        Ok(())
    }

    fn log_summary(&self) {
        let stats = self.router.ingestor().stats();
        info!(
            markets = self.roster.markets().len(),
            active = self.scheduler.active().len(),
            ticks_accepted = stats.accepted(),
            ticks_dropped = stats.dropped(),
            authenticated = self.session.as_ref().map_or(false, |s| s.is_authenticated()),
            "Session summary"
        );
    }
}
