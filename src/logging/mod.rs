// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - JSON formatting for easy parsing by log aggregation systems
/// - Filtering from `RUST_LOG`, falling back to `info`
/// - Output to stdout for container/cloud-native deployments
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber has already been installed.
///
/// # Examples
///
/// ```no_run
/// use gallery_proxy::logging::init_subscriber;
///
/// init_subscriber().expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref())?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .with_target(true)
        .try_init()
}

/// Build the level filter from an optional directive string.
fn build_filter(directive: Option<&str>) -> Result<EnvFilter, Box<dyn Error + Send + Sync>> {
    let directive = directive
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER);
    Ok(EnvFilter::try_new(directive)?)
}
