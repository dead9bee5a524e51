use crate::keys::{self, ReferenceKind, LOCAL_URL_PREFIX};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use clubsite_core::StorageEvents;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Files live under `root/{folder}/` and are served by the static file mount at
/// `/uploads`, so references are plain URL paths.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    events: Arc<dyn StorageEvents>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `root` - Directory that `/uploads/...` references map onto (e.g. "uploads")
    /// * `events` - Receiver for swallowed delete failures
    pub fn new(root: impl Into<PathBuf>, events: Arc<dyn StorageEvents>) -> Self {
        LocalStorage {
            root: root.into(),
            events,
        }
    }

    /// Map a path relative to the uploads root onto the filesystem.
    ///
    /// Only plain path segments are accepted, so the result cannot escape the root.
    fn key_to_path(&self, relative: &str) -> StorageResult<PathBuf> {
        let relative_path = Path::new(relative);
        let is_plain = relative_path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if relative.is_empty() || !is_plain {
            return Err(StorageError::InvalidKey(format!(
                "Path escapes the uploads directory: {}",
                relative
            )));
        }

        Ok(self.root.join(relative_path))
    }

    /// Delete the file behind a `/uploads/...` reference.
    ///
    /// A missing file counts as already deleted. Used by the GCS backend as well,
    /// for records that still point at files uploaded before the bucket existed.
    pub(crate) async fn remove_local_reference(&self, reference: &str) {
        let relative = reference.trim_start_matches(LOCAL_URL_PREFIX);
        let path = match self.key_to_path(relative) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Refusing to delete local file");
                self.events.delete_failed(reference, &e.to_string());
                return;
            }
        };

        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    reference = %reference,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Local file already gone");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    reference = %reference,
                    "Local storage delete failed"
                );
                self.events.delete_failed(reference, &e.to_string());
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        folder: &str,
        original_name: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let folder = keys::normalize_folder(folder)?;
        let dir = self.key_to_path(folder)?;
        let filename = keys::generate_object_name(original_name);
        let path = dir.join(&filename);
        let size = data.len();

        fs::create_dir_all(&dir).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let reference = format!("{}{}/{}", LOCAL_URL_PREFIX, folder, filename);

        tracing::info!(
            path = %path.display(),
            reference = %reference,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            reference,
            filename,
        })
    }

    async fn resolve(&self, reference: &str) -> String {
        reference.to_string()
    }

    async fn delete(&self, reference: &str) {
        let normalized = keys::normalize_reference(reference, None);

        match ReferenceKind::classify(&normalized) {
            ReferenceKind::Empty => {}
            ReferenceKind::Local => self.remove_local_reference(&normalized).await,
            ReferenceKind::External | ReferenceKind::Cloud => {
                tracing::debug!(
                    reference = %reference,
                    "Reference is not stored on local disk, nothing to delete"
                );
            }
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use clubsite_core::{NoOpStorageEvents, StorageEventCounters};
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn storage_in(root: &Path) -> LocalStorage {
        LocalStorage::new(root, Arc::new(NoOpStorageEvents))
    }

    fn file_path(root: &Path, reference: &str) -> PathBuf {
        root.join(reference.trim_start_matches(LOCAL_URL_PREFIX))
    }

    #[tokio::test]
    async fn test_store_writes_file_under_folder() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        let stored = storage
            .store("documents", "test.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .unwrap();

        let pattern = regex::Regex::new(r"^/uploads/documents/\d+-\d+\.pdf$").unwrap();
        assert!(pattern.is_match(&stored.reference), "{}", stored.reference);
        assert!(stored.reference.ends_with(&stored.filename));

        let on_disk = fs::read(file_path(dir.path(), &stored.reference))
            .await
            .unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_store_creates_nested_folders() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        let stored = storage
            .store("gallery/album-7", "IMG_0001.JPG", "image/jpeg", b"jpeg".to_vec())
            .await
            .unwrap();

        assert!(stored.reference.starts_with("/uploads/gallery/album-7/"));
        assert!(stored.reference.ends_with(".JPG"));
        assert!(file_path(dir.path(), &stored.reference).exists());
    }

    #[tokio::test]
    async fn test_store_rejects_escaping_folder() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        let result = storage
            .store("../outside", "x.txt", "text/plain", b"x".to_vec())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .store("./x", "x.txt", "text/plain", b"x".to_vec())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_resolve_is_identity() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        assert_eq!(storage.resolve("").await, "");
        assert_eq!(
            storage.resolve("https://example.com/x.jpg").await,
            "https://example.com/x.jpg"
        );
        assert_eq!(
            storage.resolve("/uploads/news/1-2.jpg").await,
            "/uploads/news/1-2.jpg"
        );
        assert_eq!(storage.resolve("news/1-2.jpg").await, "news/1-2.jpg");
        assert_eq!(storage.resolve_optional(None).await, None);
        assert_eq!(
            storage.resolve_optional(Some("/uploads/a/1-2.png")).await,
            Some("/uploads/a/1-2.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_removes_stored_file() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path());

        let stored = storage
            .store("news", "cover.png", "image/png", b"png".to_vec())
            .await
            .unwrap();
        let path = file_path(dir.path(), &stored.reference);
        assert!(path.exists());

        storage.delete(&stored.reference).await;
        assert!(!path.exists());

        // Second delete of the same reference is a no-op
        storage.delete(&stored.reference).await;
        assert_eq!(storage.resolve(&stored.reference).await, stored.reference);
    }

    #[tokio::test]
    async fn test_delete_ignores_empty_missing_and_remote_references() {
        let dir = tempdir().unwrap();
        let counters = Arc::new(StorageEventCounters::new());
        let storage = LocalStorage::new(dir.path(), counters.clone());

        storage.delete("").await;
        storage.delete("/uploads/documents/0-0.pdf").await;
        storage.delete("gallery/abc/1-2.png").await;
        storage.delete("https://example.com/x.jpg").await;

        assert_eq!(counters.delete_failures(), 0);
    }

    #[tokio::test]
    async fn test_delete_refuses_path_traversal() {
        let parent = tempdir().unwrap();
        let root = parent.path().join("uploads");
        std::fs::create_dir_all(&root).unwrap();
        let victim = parent.path().join("secret.txt");
        std::fs::write(&victim, b"keep me").unwrap();

        let counters = Arc::new(StorageEventCounters::new());
        let storage = LocalStorage::new(&root, counters.clone());

        storage.delete("/uploads/../secret.txt").await;

        assert!(victim.exists());
        assert_eq!(counters.delete_failures(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported_not_returned() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("documents/not-a-file.pdf")).unwrap();

        let counters = Arc::new(StorageEventCounters::new());
        let storage = LocalStorage::new(dir.path(), counters.clone());

        storage.delete("/uploads/documents/not-a-file.pdf").await;

        assert_eq!(counters.delete_failures(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_stores_never_collide() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(storage_in(dir.path()));

        let handles: Vec<_> = (0..1000)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .store("documents", "test.pdf", "application/pdf", vec![7])
                        .await
                        .unwrap()
                        .reference
                })
            })
            .collect();

        let mut references = HashSet::new();
        for handle in handles {
            references.insert(handle.await.unwrap());
        }

        assert_eq!(references.len(), 1000);
        let files = std::fs::read_dir(dir.path().join("documents")).unwrap().count();
        assert_eq!(files, 1000);
    }
}
