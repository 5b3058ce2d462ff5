//! digit-signal bot - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Slot-aligned last-digit signal bot for Deriv synthetic indices.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DSIG_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before any TLS connection is opened
    dsig_ws::init_crypto();

    let args = Args::parse();

    dsig_telemetry::init_logging()?;

    info!("Starting digit-signal bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > DSIG_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("DSIG_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = dsig_bot::AppConfig::from_file(&config_path)?;
    config.validate()?;
    info!(mode = ?config.mode, ws_url = %config.ws_url, "Configuration loaded");

    let app = dsig_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
