//! Application state shared by every handler.

use clubsite_core::{Config, StorageEventCounters};
use clubsite_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Backend picked at startup; handlers never look at which one it is
    pub storage: Arc<dyn Storage>,
    /// Same counters the storage backend reports into, read by `/health`
    pub storage_events: Arc<StorageEventCounters>,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        storage_events: Arc<StorageEventCounters>,
    ) -> Self {
        Self {
            config,
            storage,
            storage_events,
        }
    }
}
