// crates/json-depot-core/src/core/record.rs
// ============================================================================
// Module: JSON Depot Records
// Description: Stored JSON records and their retrieval representations.
// Purpose: Define the durability unit and the read-side view of it.
// Dependencies: serde, crate::core::document
// ============================================================================

//! ## Overview
//! A [`JsonRecord`] is the durability unit: the submitted JSON text, byte for
//! byte, plus the identifier the store assigned to it. Records are never
//! mutated or deleted. A [`RecordView`] is what the retrieval side hands out,
//! carrying either the raw text or a re-parsed structure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::JsonDocument;
use crate::core::RecordId;

// ============================================================================
// SECTION: Records
// ============================================================================

/// One stored JSON text blob plus its assigned identifier.
///
/// # Invariants
/// - `data` is the unmodified text that was submitted for ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRecord {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Original JSON text exactly as submitted.
    pub data: String,
}

// ============================================================================
// SECTION: Retrieval Views
// ============================================================================

/// Representation policy for record payloads returned by retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordDataFormat {
    /// Return the stored text unchanged.
    #[default]
    Raw,
    /// Re-parse the stored text into a JSON structure.
    Parsed,
}

impl RecordDataFormat {
    /// Returns a stable label for the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Parsed => "parsed",
        }
    }
}

/// Record payload as returned by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordData {
    /// Stored text, unchanged.
    Raw(String),
    /// Structure parsed from the stored text.
    Parsed(JsonDocument),
}

/// Read-side view of a stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Raw or parsed payload, depending on the retrieval policy.
    pub data: RecordData,
}
