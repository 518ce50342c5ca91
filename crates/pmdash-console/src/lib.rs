//! pmdash monitoring console.
//!
//! Main application that wires the components together:
//! - Push-channel connection to the backend PnL stream
//! - Tick routing into the per-market views
//! - Roster snapshot polling
//! - Optimistic start/stop command reconciliation
//! - Wallet-backed authentication

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
