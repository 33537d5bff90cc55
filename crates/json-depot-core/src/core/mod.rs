// crates/json-depot-core/src/core/mod.rs
// ============================================================================
// Module: JSON Depot Core Types
// Description: Record identifiers, parsed documents, and record payload types.
// Purpose: Group the data model shared by stores and services.
// Dependencies: serde, serde_json, serde_stacker, stacker
// ============================================================================

//! ## Overview
//! Data model for stored JSON records and their retrieval views.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod identifiers;
pub mod record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::JsonDocument;
pub use identifiers::RecordId;
pub use record::JsonRecord;
pub use record::RecordData;
pub use record::RecordDataFormat;
pub use record::RecordView;
