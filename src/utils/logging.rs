// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the tracing subscriber for the extractor.
/// Honors the `RUST_LOG` environment variable for per-module filters.
/// Falls back to "info" when `RUST_LOG` is not set.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")); // Default to INFO level

    fmt()
        .with_env_filter(filter)
        .init();

    tracing::debug!("Logging setup complete.");
}
