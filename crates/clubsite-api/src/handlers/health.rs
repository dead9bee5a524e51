use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use clubsite_core::StorageBackend;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub storage_backend: StorageBackend,
    /// Resolves that fell back to an unsigned URL since startup
    pub sign_fallbacks: u64,
    /// Best-effort deletes that failed since startup
    pub delete_failures: u64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        storage_backend: state.storage.backend_type(),
        sign_fallbacks: state.storage_events.sign_fallbacks(),
        delete_failures: state.storage_events.delete_failures(),
    })
}
