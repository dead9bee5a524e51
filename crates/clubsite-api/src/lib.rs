//! Clubsite API Library
//!
//! The HTTP face of the storage gateway: upload, resolve and delete endpoints, the
//! static `/uploads` mount, and application setup.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
