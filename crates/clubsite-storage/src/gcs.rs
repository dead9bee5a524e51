use crate::keys::{self, ReferenceKind};
use crate::local::LocalStorage;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use clubsite_core::StorageEvents;
use http::Method;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Lifetime of signed read URLs
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Every store writes a fresh key; an object never changes after upload.
pub const CACHE_CONTROL: &str = "public, max-age=31536000";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Google Cloud Storage implementation
///
/// Stores objects under bucket-relative keys and hands out V4 signed URLs on read.
/// References to files written by the local backend are still honoured: they pass
/// through `resolve` and are deleted from disk.
#[derive(Clone)]
pub struct GcsStorage {
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn Signer>,
    bucket: String,
    local: LocalStorage,
    events: Arc<dyn StorageEvents>,
}

impl GcsStorage {
    /// Create a new GcsStorage instance
    ///
    /// # Arguments
    /// * `bucket` - GCS bucket name
    /// * `key_file` - Optional service account key file; otherwise the builder
    ///   picks up credentials from the environment
    /// * `uploads_dir` - Root of the local uploads tree, for legacy local references
    /// * `events` - Receiver for signing fallbacks and swallowed delete failures
    pub fn new(
        bucket: String,
        key_file: Option<String>,
        uploads_dir: impl Into<PathBuf>,
        events: Arc<dyn StorageEvents>,
    ) -> StorageResult<Self> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket.clone());

        if let Some(ref key_file) = key_file {
            builder = builder.with_service_account_path(key_file.clone());
        }

        let gcs = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        let local = LocalStorage::new(uploads_dir, events.clone());

        Ok(Self::with_backends(gcs.clone(), gcs, bucket, local, events))
    }

    /// Assemble from an already built object store and signer.
    pub fn with_backends(
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn Signer>,
        bucket: String,
        local: LocalStorage,
        events: Arc<dyn StorageEvents>,
    ) -> Self {
        GcsStorage {
            store,
            signer,
            bucket,
            local,
            events,
        }
    }

    async fn delete_object(&self, key: &str) {
        let start = std::time::Instant::now();
        let location = Path::from(key);

        match self.store.delete(&location).await {
            Ok(()) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS delete successful"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS delete failed"
                );
                self.events.delete_failed(key, &e.to_string());
            }
        }
    }
}

#[async_trait]
impl Storage for GcsStorage {
    async fn store(
        &self,
        folder: &str,
        original_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let folder = keys::normalize_folder(folder)?;
        let key = format!("{}/{}", folder, keys::generate_object_name(original_name));
        let size = data.len() as u64;
        let location = Path::from(key.as_str());

        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type.to_string()
        };

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.into());
        attributes.insert(Attribute::CacheControl, CACHE_CONTROL.into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        self.store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS upload successful"
        );

        Ok(StoredObject {
            reference: key.clone(),
            filename: key,
        })
    }

    async fn resolve(&self, reference: &str) -> String {
        if ReferenceKind::classify(reference) != ReferenceKind::Cloud {
            return reference.to_string();
        }

        let location = Path::from(reference);
        match self
            .signer
            .signed_url(Method::GET, &location, SIGNED_URL_TTL)
            .await
        {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %reference,
                    "Failed to generate signed URL, falling back to public URL"
                );
                self.events.sign_fallback(reference, &e.to_string());
                keys::public_url(&self.bucket, reference)
            }
        }
    }

    async fn delete(&self, reference: &str) {
        let normalized = keys::normalize_reference(reference, Some(&self.bucket));

        match ReferenceKind::classify(&normalized) {
            ReferenceKind::Empty => {}
            ReferenceKind::Local => self.local.remove_local_reference(&normalized).await,
            ReferenceKind::External => {
                tracing::debug!(
                    reference = %reference,
                    bucket = %self.bucket,
                    "Reference is not an object in this bucket, nothing to delete"
                );
            }
            ReferenceKind::Cloud => self.delete_object(&normalized).await,
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}
