// crates/json-depot-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite JSON Store
// Description: Durable append-only JsonStore backed by SQLite WAL.
// Purpose: Persist raw JSON text with store-assigned integer identifiers.
// Dependencies: json-depot-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`JsonStore`] over a single `json_data` table. Every
//! append inserts the text verbatim and receives the next `AUTOINCREMENT`
//! identifier; reads return the whole table in identifier order inside one
//! transaction. A shared connection behind a mutex serializes writers, so ids
//! are unique and monotonic. The store does not validate JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use json_depot_core::JsonRecord;
use json_depot_core::JsonStore;
use json_depot_core::RecordId;
use json_depot_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` JSON store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a configuration for `path` with default tuning.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored rows violate the table contract.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store configuration.
    #[error("sqlite store invalid config: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Store(format!("invalid config: {message}")),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed append-only JSON store.
#[derive(Clone)]
pub struct SqliteJsonStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteJsonStore {
    /// Opens the store, creating the database file and schema if absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

impl JsonStore for SqliteJsonStore {
    fn append(&self, text: &str) -> Result<RecordId, StoreError> {
        self.append_text(text).map_err(StoreError::from)
    }

    fn list_all(&self) -> Result<Vec<JsonRecord>, StoreError> {
        self.load_all().map_err(StoreError::from)
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.count_rows().map_err(StoreError::from)
    }
}

impl SqliteJsonStore {
    /// Inserts `text` and returns the assigned identifier.
    fn append_text(&self, text: &str) -> Result<RecordId, SqliteStoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute("INSERT INTO json_data (data) VALUES (?1)", params![text])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rowid = tx.last_insert_rowid();
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        record_id_from_rowid(rowid)
    }

    /// Reads every row in identifier order within one transaction.
    fn load_all(&self) -> Result<Vec<JsonRecord>, SqliteStoreError> {
        let rows = {
            let mut guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = {
                let mut stmt = tx
                    .prepare("SELECT id, data FROM json_data ORDER BY id ASC")
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                let mapped = stmt
                    .query_map(params![], |row| {
                        let id: i64 = row.get(0)?;
                        let data: Option<String> = row.get(1)?;
                        Ok((id, data))
                    })
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                mapped
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?
            };
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            drop(guard);
            rows
        };
        rows.into_iter()
            .map(|(rowid, data)| {
                let id = record_id_from_rowid(rowid)?;
                let data = data.ok_or_else(|| {
                    SqliteStoreError::Corrupt(format!("record {rowid} has null data"))
                })?;
                Ok(JsonRecord {
                    id,
                    data,
                })
            })
            .collect()
    }

    /// Counts stored rows.
    fn count_rows(&self) -> Result<u64, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let count: i64 = guard
            .query_row("SELECT COUNT(*) FROM json_data", params![], |row| row.get(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        u64::try_from(count)
            .map_err(|_| SqliteStoreError::Corrupt("negative record count".to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts an `SQLite` rowid into a record identifier.
fn record_id_from_rowid(rowid: i64) -> Result<RecordId, SqliteStoreError> {
    u64::try_from(rowid)
        .ok()
        .and_then(RecordId::from_raw)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid record id: {rowid}")))
}

/// Opens the database file, creating missing parent directories.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let path = config.path.as_path();
    if path.as_os_str().is_empty() || path.is_dir() {
        return Err(SqliteStoreError::Invalid(format!(
            "store path must name a file: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let pragmas = format!(
        "PRAGMA journal_mode = {}; PRAGMA synchronous = {};",
        config.journal_mode.pragma_value(),
        config.sync_mode.pragma_value()
    );
    connection.execute_batch(&pragmas).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
///
/// A pre-existing `json_data` table without version metadata is adopted as-is.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS json_data (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    data TEXT NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
