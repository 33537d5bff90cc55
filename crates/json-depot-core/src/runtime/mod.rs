// crates/json-depot-core/src/runtime/mod.rs
// ============================================================================
// Module: JSON Depot Runtime
// Description: Ingestion, retrieval, and store wrappers.
// Purpose: Group the services that run over a JsonStore.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime services for the depot: the ordered-gate ingestion pipeline, the
//! read-all retrieval service, and the in-memory and shared store wrappers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod ingest;
pub mod retrieval;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use ingest::IngestError;
pub use ingest::IngestOutcome;
pub use ingest::IngestPipeline;
pub use ingest::MAX_DECLARED_BYTES;
pub use retrieval::RetrievalService;
pub use store::InMemoryJsonStore;
pub use store::SharedJsonStore;
