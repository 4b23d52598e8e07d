//! Sheetflow Server
//!
//! Web surface for the spreadsheet transfer pipeline: spreadsheet
//! uploads, output downloads, and the WebSocket channel that carries
//! pipeline commands and progress events.

mod api;
mod config;
mod state;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sheetflow_server=debug,sheetflow_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sheetflow server...");

    let config = ServerConfig::from_env();
    config.validate()?;

    config
        .ensure_directories()
        .context("Failed to create storage directories")?;
    info!(
        "Storage ready: uploads={}, output={}, backups={}",
        config.upload_dir.display(),
        config.output_dir.display(),
        config.backup_dir.display()
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config);
    let app = api::create_router(state);

    info!("Listening on {bind_addr}");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
