// crates/json-depot-server/src/audit.rs
// ============================================================================
// Module: Depot Audit Logging
// Description: Structured audit events for HTTP request handling.
// Purpose: Emit one JSON line per request without recording payload content.
// Dependencies: json-depot-config, json-depot-core, serde
// ============================================================================

//! ## Overview
//! Each `/ingest` and `/records` request produces exactly one audit event.
//! Events describe sizes, outcomes, and identifiers only; submitted JSON text
//! never appears in them. Sinks write JSON lines to stderr or an append-only
//! file, or drop events entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use json_depot_config::ServerAuditConfig;
use json_depot_core::RecordDataFormat;
use json_depot_core::RecordId;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Coarse request outcome for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Request succeeded.
    Accepted,
    /// Request was refused because of client input.
    Rejected,
    /// Request failed on the server side.
    Failed,
}

/// Ingest request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct IngestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// HTTP status code returned.
    pub status: u16,
    /// Error kind label when the request did not succeed.
    pub error_kind: Option<&'static str>,
    /// `Content-Length` declared by the client.
    pub declared_bytes: Option<u64>,
    /// Body bytes actually read.
    pub body_bytes: Option<u64>,
    /// Identifier assigned to the stored record.
    pub record_id: Option<RecordId>,
}

/// Inputs required to construct an ingest audit event.
pub struct IngestAuditEventParams {
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// HTTP status code returned.
    pub status: u16,
    /// Error kind label when the request did not succeed.
    pub error_kind: Option<&'static str>,
    /// `Content-Length` declared by the client.
    pub declared_bytes: Option<u64>,
    /// Body bytes actually read.
    pub body_bytes: Option<u64>,
    /// Identifier assigned to the stored record.
    pub record_id: Option<RecordId>,
}

impl IngestAuditEvent {
    /// Builds an ingest audit event stamped with the current time.
    #[must_use]
    pub fn new(params: IngestAuditEventParams) -> Self {
        Self {
            event: "ingest_request",
            timestamp_ms: now_ms(),
            outcome: params.outcome,
            status: params.status,
            error_kind: params.error_kind,
            declared_bytes: params.declared_bytes,
            body_bytes: params.body_bytes,
            record_id: params.record_id,
        }
    }
}

/// Records request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RecordsAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// HTTP status code returned.
    pub status: u16,
    /// Payload representation used for the response.
    pub data_format: RecordDataFormat,
    /// Number of records returned.
    pub record_count: Option<usize>,
}

impl RecordsAuditEvent {
    /// Builds a records audit event stamped with the current time.
    #[must_use]
    pub fn new(
        outcome: AuditOutcome,
        status: u16,
        data_format: RecordDataFormat,
        record_count: Option<usize>,
    ) -> Self {
        Self {
            event: "records_request",
            timestamp_ms: now_ms(),
            outcome,
            status,
            data_format,
            record_count,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for request events.
pub trait AuditSink: Send + Sync {
    /// Records an ingest event.
    fn record_ingest(&self, event: &IngestAuditEvent);

    /// Records a records-listing event.
    fn record_records(&self, event: &RecordsAuditEvent);
}

/// Audit sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_ingest(&self, event: &IngestAuditEvent) {
        write_stderr(event);
    }

    fn record_records(&self, event: &RecordsAuditEvent) {
        write_stderr(event);
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// Append-mode file handle.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens (or creates) the audit log at `path` in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Serializes and appends one event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_ingest(&self, event: &IngestAuditEvent) {
        self.append(event);
    }

    fn record_records(&self, event: &RecordsAuditEvent) {
        self.append(event);
    }
}

/// Audit sink that drops all events.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_ingest(&self, _event: &IngestAuditEvent) {}

    fn record_records(&self, _event: &RecordsAuditEvent) {}
}

/// Builds the audit sink selected by configuration.
///
/// # Errors
///
/// Returns [`io::Error`] when a file sink cannot be opened.
pub fn audit_sink_from_config(config: &ServerAuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path.trim()))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch, zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Writes one serialized event to stderr.
fn write_stderr<T: Serialize>(event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(std::io::stderr(), "{payload}");
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
