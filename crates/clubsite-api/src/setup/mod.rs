//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use clubsite_core::{Config, StorageEventCounters};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config)?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded"
    );

    build_app(config).await
}

/// Storage, state and routes, without touching global tracing state.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let storage_events = Arc::new(StorageEventCounters::new());
    let storage = storage::setup_storage(&config, storage_events.clone())?;

    let state = Arc::new(AppState::new(config.clone(), storage, storage_events));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
