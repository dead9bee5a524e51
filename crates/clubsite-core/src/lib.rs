//! Clubsite Core Library
//!
//! This crate provides the configuration, error types, and storage hooks
//! shared by the storage gateway and the HTTP service.

pub mod config;
pub mod error;
pub mod hooks;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, SiteConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use hooks::{NoOpStorageEvents, StorageEventCounters, StorageEvents};
pub use storage_types::StorageBackend;
