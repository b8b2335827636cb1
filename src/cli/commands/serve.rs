use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::{app, AppState};
use crate::config::config;
use crate::database::JsonFileStorage;

pub async fn handle(port: Option<u16>, data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.server.data_dir = data_dir;
    }
    tracing::info!("Starting Market API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; register and login will fail");
    }

    let storage = Arc::new(JsonFileStorage::new(&config.server.data_dir));
    tracing::info!("Using data directory {}", storage.root().display());

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, storage);
    state
        .seed_ids()
        .await
        .context("failed to read existing collections")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Market API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Market API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
