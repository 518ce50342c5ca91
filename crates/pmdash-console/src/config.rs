//! Application configuration.

use crate::error::{AppError, AppResult};
use pmdash_ws::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend origin (e.g., "http://localhost:8000").
    #[serde(default = "default_backend_origin")]
    pub backend_origin: String,

    /// Roster poll interval (ms).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Active-set refresh interval (ms).
    #[serde(default = "default_active_refresh_ms")]
    pub active_refresh_ms: u64,

    /// Hex-encoded wallet private key for authenticated commands.
    /// Commands are sent unauthenticated when absent.
    #[serde(default)]
    pub wallet_key: Option<String>,

    /// Directory for persisted session state.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,

    /// Base delay for reconnect backoff (ms).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    /// Maximum delay for reconnect backoff (ms).
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

fn default_backend_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_active_refresh_ms() -> u64 {
    500
}

fn default_state_dir() -> String {
    ".pmdash".to_string()
}

fn default_reconnect_base_delay_ms() -> u64 {
    1_000
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_origin: default_backend_origin(),
            poll_interval_ms: default_poll_interval_ms(),
            active_refresh_ms: default_active_refresh_ms(),
            wallet_key: None,
            state_dir: default_state_dir(),
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Load from a file if it exists, otherwise fall back to defaults.
    pub fn from_file_or_default(config_path: &str) -> AppResult<Self> {
        if Path::new(config_path).exists() {
            Self::from_file(config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Push-channel URL derived from the backend origin: http becomes ws,
    /// https becomes wss, path is the PnL stream endpoint.
    pub fn ws_url(&self) -> String {
        let origin = self.backend_origin.trim_end_matches('/');
        format!("{}/ws/pnl", origin.replacen("http", "ws", 1))
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.ws_url(),
            max_reconnect_attempts: self.max_reconnect_attempts,
            reconnect_base_delay_ms: self.reconnect_base_delay_ms,
            reconnect_max_delay_ms: self.reconnect_max_delay_ms,
        }
    }
}
