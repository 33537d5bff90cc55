// crates/json-depot-config/src/config.rs
// ============================================================================
// Module: JSON Depot Configuration
// Description: Configuration loading and validation for JSON Depot.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: json-depot-core, json-depot-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `JSON_DEPOT_CONFIG`, then the default
//! filename. Only the default filename may be absent, in which case built-in
//! defaults apply. Every other failure is returned before startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use json_depot_core::RecordDataFormat;
use json_depot_store_sqlite::SqliteStoreConfig;
use json_depot_store_sqlite::SqliteStoreMode;
use json_depot_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "json-depot.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "JSON_DEPOT_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP bind address.
const DEFAULT_BIND: &str = "127.0.0.1:3000";
/// Default hard cap on request body bytes (100 MiB).
const DEFAULT_MAX_BODY_BYTES: u64 = 100 * 1024 * 1024;
/// Default `SQLite` database path.
const DEFAULT_STORE_PATH: &str = "data/json-depot.sqlite";
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Upper bound for the busy timeout (ms).
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Default tracing filter directive.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// JSON Depot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepotConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// JSON store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Retrieval configuration.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from (`None` for built-in defaults).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl DepotConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_path(path, env::var(CONFIG_ENV_VAR).ok()) {
            ConfigSource::Explicit(path) => Self::load_file(&path),
            ConfigSource::Default(path) if path.exists() => Self::load_file(&path),
            ConfigSource::Default(_) => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Reads a config file that must exist.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        check_path("config path", path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Hard cap on bytes read from a request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind))
        })
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if usize::try_from(self.max_body_bytes).is_err() {
            return Err(ConfigError::Invalid("server.max_body_bytes too large".to_string()));
        }
        self.audit.validate()
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            check_path("server.audit.path", Path::new(path.trim()))?;
        }
        Ok(())
    }
}

/// JSON store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Durable `SQLite` backend.
    #[default]
    Sqlite,
    /// Process-local in-memory backend.
    Memory,
}

/// JSON store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path; the default path is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` settings, or `None` for the memory backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match self.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => Some(SqliteStoreConfig {
                path: self
                    .path
                    .as_deref()
                    .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), trimmed_path),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                if let Some(path) = &self.path {
                    check_path("store.path", path)?;
                }
                if self.busy_timeout_ms == 0 || self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::Invalid(format!(
                        "store.busy_timeout_ms must be between 1 and {MAX_BUSY_TIMEOUT_MS}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Representation of stored payloads in read results.
    #[serde(default)]
    pub data_format: RecordDataFormat,
}

/// Log output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable text lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Tracing filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output encoding.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where a config path came from.
#[derive(Debug, PartialEq, Eq)]
enum ConfigSource {
    /// Named by the caller or the environment; must exist.
    Explicit(PathBuf),
    /// Default filename; may be absent.
    Default(PathBuf),
}

/// Picks the config file: caller path, then environment, then default name.
fn resolve_path(path: Option<&Path>, env_value: Option<String>) -> ConfigSource {
    match (path, env_value) {
        (Some(path), _) => ConfigSource::Explicit(path.to_path_buf()),
        (None, Some(env_path)) => ConfigSource::Explicit(PathBuf::from(env_path)),
        (None, None) => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_NAME)),
    }
}

/// Rejects blank or overlong paths; `label` prefixes the error message.
fn check_path(label: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{label} must be non-empty")));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{label} exceeds max length")));
    }
    if path.components().any(|part| part.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH) {
        return Err(ConfigError::Invalid(format!("{label} component too long")));
    }
    Ok(())
}

/// Strips surrounding whitespace from a UTF-8 path.
fn trimmed_path(path: &Path) -> PathBuf {
    path.to_str().map_or_else(|| path.to_path_buf(), |text| PathBuf::from(text.trim()))
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size in bytes.
const fn default_max_body_bytes() -> u64 {
    DEFAULT_MAX_BODY_BYTES
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

/// Default busy timeout for `SQLite` connections.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default tracing filter directive.
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use std::path::Path;
    use std::path::PathBuf;

    use super::ConfigSource;
    use super::DEFAULT_CONFIG_NAME;
    use super::check_path;
    use super::resolve_path;
    use super::trimmed_path;

    #[test]
    fn resolve_prefers_caller_path_over_environment() {
        let source = resolve_path(Some(Path::new("cli.toml")), Some("env.toml".to_string()));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("cli.toml")));
    }

    #[test]
    fn resolve_uses_environment_as_explicit_path() {
        let source = resolve_path(None, Some("env.toml".to_string()));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("env.toml")));
    }

    #[test]
    fn resolve_falls_back_to_default_name() {
        let source = resolve_path(None, None);
        assert_eq!(source, ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_NAME)));
    }

    #[test]
    fn check_path_names_the_field() {
        let err = check_path("store.path", Path::new("   ")).unwrap_err();
        assert!(err.to_string().contains("store.path must be non-empty"));
        let long = "a".repeat(5_000);
        let err = check_path("config path", Path::new(&long)).unwrap_err();
        assert!(err.to_string().contains("config path exceeds max length"));
        assert!(check_path("store.path", Path::new("data/depot.sqlite")).is_ok());
    }

    #[test]
    fn trimmed_path_strips_surrounding_whitespace() {
        assert_eq!(trimmed_path(Path::new(" data/x.sqlite ")), PathBuf::from("data/x.sqlite"));
    }
}
