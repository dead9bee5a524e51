//! Tracing setup

use clubsite_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: `RUST_LOG` filter, human-readable or JSON lines.
///
/// JSON output is used in production so log shippers can pick up the structured fields.
pub fn init_telemetry(config: &Config) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clubsite=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!(environment = %config.environment(), "Tracing initialized");
    Ok(())
}
