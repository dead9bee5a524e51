//! Hooks for observing storage degradation
//!
//! The storage gateway recovers from signing and delete failures on its own, so the
//! caller never sees them. These hooks let the embedding service count or export
//! those events instead of relying on log lines alone.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receiver for storage events that are recovered locally and never surfaced as errors
pub trait StorageEvents: Send + Sync {
    /// A signed URL could not be produced and the unsigned public URL was returned instead
    fn sign_fallback(&self, key: &str, error: &str);

    /// A best-effort delete failed and the object may have been left behind
    fn delete_failed(&self, reference: &str, error: &str);
}

/// No-op implementation for when nothing is listening
pub struct NoOpStorageEvents;

impl StorageEvents for NoOpStorageEvents {
    fn sign_fallback(&self, _key: &str, _error: &str) {}

    fn delete_failed(&self, _reference: &str, _error: &str) {}
}

/// Process-wide counters, reported by the health endpoint
#[derive(Debug, Default)]
pub struct StorageEventCounters {
    sign_fallbacks: AtomicU64,
    delete_failures: AtomicU64,
}

impl StorageEventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_fallbacks(&self) -> u64 {
        self.sign_fallbacks.load(Ordering::Relaxed)
    }

    pub fn delete_failures(&self) -> u64 {
        self.delete_failures.load(Ordering::Relaxed)
    }
}

impl StorageEvents for StorageEventCounters {
    fn sign_fallback(&self, _key: &str, _error: &str) {
        self.sign_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn delete_failed(&self, _reference: &str, _error: &str) {
        self.delete_failures.fetch_add(1, Ordering::Relaxed);
    }
}
