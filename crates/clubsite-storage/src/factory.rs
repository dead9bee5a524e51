#[cfg(feature = "storage-gcs")]
use crate::GcsStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use clubsite_core::{Config, StorageEvents};
use std::sync::Arc;

/// Create a storage backend based on configuration
///
/// Called once at startup. The result is shared by every request handler.
pub fn create_storage(
    config: &Config,
    events: Arc<dyn StorageEvents>,
) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-gcs")]
        StorageBackend::Gcs => {
            let bucket = config
                .gcs_bucket()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("GCS_BUCKET_NAME not configured".to_string())
                })?;
            let key_file = config.gcs_key_file().map(String::from);

            tracing::info!(
                bucket = %bucket,
                project_id = config.gcs_project_id().unwrap_or_default(),
                "Using Google Cloud Storage"
            );

            let storage = GcsStorage::new(bucket, key_file, config.uploads_dir(), events)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-gcs"))]
        StorageBackend::Gcs => Err(StorageError::ConfigError(
            "GCS storage backend not available (storage-gcs feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            tracing::info!(
                path = %config.uploads_dir().display(),
                "Google Cloud Storage not configured, storing uploads on local disk"
            );

            let storage = LocalStorage::new(config.uploads_dir(), events);
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
