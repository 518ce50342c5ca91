//! Command reconciliation and snapshot polling for pmdash.
//!
//! Ties the push-channel views from `pmdash-feed` to the authoritative
//! REST surface: optimistic start/stop commands, a pending-command set,
//! the roster snapshot poller, the tick router, and the active-set
//! scheduler.

pub mod error;
pub mod pending;
pub mod poller;
pub mod reconciler;
pub mod roster;
pub mod router;
pub mod scheduler;
pub mod status;

pub use error::CommandError;
pub use pending::{PendingCommands, PendingKind};
pub use poller::{SnapshotPoller, SnapshotSource, POLL_INTERVAL};
pub use reconciler::{CommandReconciler, CommandTransport};
pub use roster::MarketRoster;
pub use router::TickRouter;
pub use scheduler::{ActiveScheduler, ACTIVE_REFRESH};
pub use status::market_status;
