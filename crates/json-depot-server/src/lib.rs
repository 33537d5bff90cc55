// crates/json-depot-server/src/lib.rs
// ============================================================================
// Module: JSON Depot Server Library
// Description: HTTP surface, audit sinks, and logging setup for JSON Depot.
// Purpose: Expose ingestion and retrieval over HTTP.
// Dependencies: json-depot-core, json-depot-config, axum, tokio, tracing
// ============================================================================

//! ## Overview
//! `json-depot-server` wires the configured store into the ingestion pipeline
//! and retrieval service and serves them with axum. Every request emits one
//! audit event; operational logs go through `tracing`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod logging;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditOutcome;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::IngestAuditEvent;
pub use audit::IngestAuditEventParams;
pub use audit::NoopAuditSink;
pub use audit::RecordsAuditEvent;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use logging::init_logging;
pub use server::DepotServer;
pub use server::DepotServerError;
pub use server::open_json_store;
