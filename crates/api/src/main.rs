// btcchecker server
// Decision: Configuration comes from a TOML file plus BTCCHECKER_* environment overrides

use anyhow::{Context, Result};
use btcchecker_api::{build_router, telemetry, AppConfig, AppState};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "btcchecker")]
#[command(about = "BTC rate checker with user registration and cookie sessions", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config file (default: configs/btcchecker.toml if present)
    #[arg(long = "config-path", env = "BTCCHECKER_CONFIG_PATH")]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config_path.as_deref()).context("Failed to load config")?;

    telemetry::init_telemetry(config.log_level()?);
    tracing::info!("btcchecker starting...");

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
