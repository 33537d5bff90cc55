// crates/json-depot-server/src/logging.rs
// ============================================================================
// Module: Depot Logging
// Description: Process-wide tracing subscriber setup.
// Purpose: Route operational logs through an env-filtered text or JSON layer.
// Dependencies: json-depot-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! Installs the global `tracing` subscriber once per process. `RUST_LOG`
//! overrides the configured filter directive when present.

// ============================================================================
// SECTION: Imports
// ============================================================================

use json_depot_config::LogFormat;
use json_depot_config::LoggingConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::server::DepotServerError;

// ============================================================================
// SECTION: Init
// ============================================================================

/// Installs the global tracing subscriber described by `config`.
///
/// # Errors
///
/// Returns [`DepotServerError`] when the filter directive is invalid or a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), DepotServerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter.trim())
            .map_err(|err| DepotServerError::Config(format!("invalid logging.filter: {err}")))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).try_init()
        }
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|err| DepotServerError::Init(format!("logging init failed: {err}")))
}
