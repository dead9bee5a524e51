//! Storage setup and initialization

use anyhow::Result;
use clubsite_core::{Config, StorageEvents};
use clubsite_storage::{create_storage, Storage};
use std::sync::Arc;

pub fn setup_storage(
    config: &Config,
    events: Arc<dyn StorageEvents>,
) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage gateway...");
    let storage = create_storage(config, events)?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage gateway initialized successfully"
    );

    Ok(storage)
}
