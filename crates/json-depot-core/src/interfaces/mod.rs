// crates/json-depot-core/src/interfaces/mod.rs
// ============================================================================
// Module: JSON Depot Interfaces
// Description: Backend-agnostic storage interface for JSON records.
// Purpose: Let the depot services run over any append-only store.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The [`JsonStore`] trait is the only seam between the depot services and a
//! storage medium. Stores are append-only: they assign identifiers, persist
//! text verbatim, and return everything they hold. They never validate input;
//! the ingestion pipeline is responsible for well-formedness.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::JsonRecord;
use crate::core::RecordId;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Storage failures reported by [`JsonStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("json store io error: {0}")]
    Io(String),
    /// Store data is corrupted or unreadable.
    #[error("json store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("json store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store reported an error.
    #[error("json store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Store Interface
// ============================================================================

/// Append-only persistence for JSON records.
pub trait JsonStore {
    /// Appends `text` as a new record and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the medium is unavailable or full.
    fn append(&self, text: &str) -> Result<RecordId, StoreError>;

    /// Returns every stored record in ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the full set cannot be read.
    fn list_all(&self) -> Result<Vec<JsonRecord>, StoreError>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the count cannot be read.
    fn count(&self) -> Result<u64, StoreError>;
}
