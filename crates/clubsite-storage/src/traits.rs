//! Storage abstraction trait
//!
//! This module defines the Storage trait that every backend implements.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a successful store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Opaque reference to persist on the owning record
    pub reference: String,
    /// Generated file name; the full object key on GCS
    pub filename: String,
}

/// Storage abstraction trait
///
/// Consumers hold an `Arc<dyn Storage>` chosen once at startup and never look at
/// which backend is behind it. References returned by `store` must be passed back
/// to `resolve` and `delete` unchanged.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under a freshly generated name inside `folder`.
    ///
    /// Write errors propagate; nothing is retried or cleaned up.
    async fn store(
        &self,
        folder: &str,
        original_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject>;

    /// Turn a reference into a URL a browser can load.
    ///
    /// Never fails: empty, external and local references come back unchanged, and
    /// backends degrade to an unsigned URL when signing is unavailable.
    async fn resolve(&self, reference: &str) -> String;

    /// `resolve` for optional fields
    async fn resolve_optional(&self, reference: Option<&str>) -> Option<String> {
        match reference {
            Some(reference) => Some(self.resolve(reference).await),
            None => None,
        }
    }

    /// Remove the object behind a reference, best-effort.
    ///
    /// Failures are logged and reported to the storage event hook, never returned,
    /// so deleting or replacing the owning record always goes ahead.
    async fn delete(&self, reference: &str);

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
