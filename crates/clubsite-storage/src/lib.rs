//! Clubsite Storage Library
//!
//! The object storage gateway behind every uploaded file on the site: documents,
//! gallery photos, news images, tournament flyers and board-member photos.
//!
//! # Stored object references
//!
//! `store` returns a reference string that callers persist as-is and later hand back
//! to `resolve` or `delete`. Its shape depends on the backend active at upload time:
//!
//! - **GCS**: a bucket-relative key, `{folder}/{millis}-{random}{ext}`
//! - **Local disk**: a root-relative URL path, `/uploads/{folder}/{millis}-{random}{ext}`
//!
//! Callers never parse references. Classification lives in the `keys` module so both
//! backends agree on what a reference means.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-gcs")]
pub mod gcs;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use clubsite_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-gcs")]
pub use gcs::GcsStorage;
pub use keys::ReferenceKind;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
