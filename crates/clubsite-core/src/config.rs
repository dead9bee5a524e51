//! Configuration module
//!
//! Configuration is read once at startup from the environment (and an optional
//! `.env` file). The storage backend is derived from it and stays fixed for the
//! lifetime of the process.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_UPLOAD_SIZE_MB: usize = 20;
const UPLOADS_DIR: &str = "uploads";
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Settings shared by every process that serves HTTP
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Upper bound on requests in flight across the whole server
    pub http_concurrency_limit: usize,
}

/// Site configuration: HTTP settings plus the storage gateway settings
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub base: BaseConfig,
    pub gcs_bucket: Option<String>,
    pub gcs_project_id: Option<String>,
    /// Service account key file; falls back to `GOOGLE_APPLICATION_CREDENTIALS`
    pub gcs_key_file: Option<String>,
    /// Root of the local `uploads/` tree
    pub uploads_dir: PathBuf,
    pub max_upload_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SiteConfig>);

impl Config {
    fn as_site(&self) -> &SiteConfig {
        &self.0
    }

    pub fn new(site: SiteConfig) -> Self {
        Config(Box::new(site))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = SiteConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    /// Local-mode configuration rooted at `uploads_dir`, with defaults for everything else
    pub fn local(uploads_dir: impl Into<PathBuf>) -> Self {
        Config::new(SiteConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            },
            gcs_bucket: None,
            gcs_project_id: None,
            gcs_key_file: None,
            uploads_dir: uploads_dir.into(),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_site().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_site().base.environment)
    }

    /// Cloud mode needs both the bucket and the project id; anything less means local disk.
    pub fn storage_backend(&self) -> StorageBackend {
        let site = self.as_site();
        match (&site.gcs_bucket, &site.gcs_project_id) {
            (Some(_), Some(_)) => StorageBackend::Gcs,
            _ => StorageBackend::Local,
        }
    }

    pub fn server_port(&self) -> u16 {
        self.as_site().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_site().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_site().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_site().base.http_concurrency_limit
    }

    pub fn gcs_bucket(&self) -> Option<&str> {
        self.as_site().gcs_bucket.as_deref()
    }

    pub fn gcs_project_id(&self) -> Option<&str> {
        self.as_site().gcs_project_id.as_deref()
    }

    pub fn gcs_key_file(&self) -> Option<&str> {
        self.as_site().gcs_key_file.as_deref()
    }

    pub fn uploads_dir(&self) -> &std::path::Path {
        &self.as_site().uploads_dir
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_site().max_upload_size_bytes
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

/// Treat blank values the same as unset ones.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl SiteConfig {
    /// Build the configuration from a variable lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
        };

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let config = SiteConfig {
            base,
            gcs_bucket: non_empty(lookup("GCS_BUCKET_NAME")),
            gcs_project_id: non_empty(lookup("GCS_PROJECT_ID")),
            gcs_key_file: non_empty(lookup("GCS_KEY_FILE"))
                .or_else(|| non_empty(lookup("GOOGLE_APPLICATION_CREDENTIALS"))),
            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(UPLOADS_DIR)),
            max_upload_size_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        // Half-configured cloud storage silently runs on local disk; make that visible.
        match (&self.gcs_bucket, &self.gcs_project_id) {
            (Some(_), None) => tracing::warn!(
                "GCS_BUCKET_NAME is set without GCS_PROJECT_ID, falling back to local storage"
            ),
            (None, Some(_)) => tracing::warn!(
                "GCS_PROJECT_ID is set without GCS_BUCKET_NAME, falling back to local storage"
            ),
            _ => {}
        }

        Ok(())
    }
}
