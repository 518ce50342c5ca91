//! pmdash - Real-time PnL monitoring console.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Real-time PnL monitoring console for prediction market makers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PMDASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // TLS crypto provider must be installed before any WS connections.
    pmdash_ws::init_crypto();

    let args = Args::parse();

    pmdash_console::logging::init_logging();

    info!("Starting pmdash v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > PMDASH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PMDASH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = pmdash_console::AppConfig::from_file_or_default(&config_path)?;

    let mut app = pmdash_console::Application::new(config)?;
    app.sign_in().await?;
    app.run().await?;

    Ok(())
}
