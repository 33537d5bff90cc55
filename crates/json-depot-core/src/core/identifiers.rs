// crates/json-depot-core/src/core/identifiers.rs
// ============================================================================
// Module: JSON Depot Identifiers
// Description: Store-assigned record identifiers.
// Purpose: Provide a strongly typed, serializable record id.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Record identifiers are assigned by the store on append. They are positive,
//! unique, and increase with insertion order. The wrapper serializes as a
//! plain JSON number.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Store-assigned identifier of a [`crate::JsonRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(NonZeroU64);

impl RecordId {
    /// Creates a record identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<NonZeroU64> for RecordId {
    fn from(value: NonZeroU64) -> Self {
        Self(value)
    }
}
