use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage backend types
///
/// The backend is chosen once at startup from configuration and never changes
/// for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Google Cloud Storage bucket
    Gcs,
    /// `uploads/` tree on the local filesystem
    Local,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}
