// crates/json-depot-core/src/runtime/ingest.rs
// ============================================================================
// Module: JSON Depot Ingestion Pipeline
// Description: Ordered validate-then-persist sequence for incoming JSON text.
// Purpose: Accept or reject submissions with a fixed error precedence.
// Dependencies: crate::{core, interfaces, runtime::store}, tracing
// ============================================================================

//! ## Overview
//! [`IngestPipeline::ingest`] evaluates a submission through ordered gates:
//!
//! 1. size (caller-declared length only),
//! 2. emptiness (absent or whitespace-only text),
//! 3. syntax (well-formed JSON of any shape and nesting depth),
//! 4. persistence (verbatim append to the store),
//! 5. response (the structure parsed at step 3).
//!
//! The first failing gate short-circuits and nothing is written unless every
//! gate passes. Parser diagnostics stay in the server log; callers only ever
//! see the generic [`IngestError::InvalidSyntax`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::JsonDocument;
use crate::core::RecordId;
use crate::interfaces::JsonStore;
use crate::runtime::store::SharedJsonStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest declared payload length accepted by the size gate (100 MiB).
pub const MAX_DECLARED_BYTES: u64 = 100 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ingestion failures, in gate order.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Declared (or transport-observed) payload size exceeds the limit.
    #[error("payload too large: {bytes} bytes (max {max_bytes})")]
    PayloadTooLarge {
        /// Offending payload size in bytes.
        bytes: u64,
        /// Maximum allowed bytes.
        max_bytes: u64,
    },
    /// JSON text is absent or whitespace-only.
    #[error("json text is empty")]
    EmptyInput,
    /// JSON text is not well-formed.
    #[error("json text is malformed")]
    InvalidSyntax,
    /// Unexpected fault after validation (storage unavailable, ...).
    #[error("ingestion failed: {0}")]
    InternalFailure(String),
}

impl IngestError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge {
                ..
            } => "payload_too_large",
            Self::EmptyInput => "empty_input",
            Self::InvalidSyntax => "invalid_syntax",
            Self::InternalFailure(_) => "internal_failure",
        }
    }

    /// Returns the message shown to callers.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge {
                ..
            } => "File is too large. Maximum allowed size is 100MB.",
            Self::EmptyInput => "JSON string cannot be empty.",
            Self::InvalidSyntax => "Invalid JSON format",
            Self::InternalFailure(_) => "An error occurred while processing the request.",
        }
    }

    /// Returns true when the caller's input caused the failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::InternalFailure(_))
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Successful ingestion result.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// Identifier assigned to the new record.
    pub id: RecordId,
    /// Structure parsed from the submitted text.
    pub value: JsonDocument,
}

/// Ordered-gate ingestion over a shared store.
#[derive(Clone)]
pub struct IngestPipeline {
    /// Destination store for accepted submissions.
    store: SharedJsonStore,
}

impl IngestPipeline {
    /// Creates a pipeline writing to `store`.
    #[must_use]
    pub const fn new(store: SharedJsonStore) -> Self {
        Self {
            store,
        }
    }

    /// Applies the size gate on its own.
    ///
    /// Transports call this before reading a body; [`Self::ingest`] applies it
    /// again, so skipping it never changes the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::PayloadTooLarge`] when `claimed_length` exceeds
    /// [`MAX_DECLARED_BYTES`].
    pub const fn check_declared_length(claimed_length: Option<u64>) -> Result<(), IngestError> {
        match claimed_length {
            Some(bytes) if bytes > MAX_DECLARED_BYTES => Err(IngestError::PayloadTooLarge {
                bytes,
                max_bytes: MAX_DECLARED_BYTES,
            }),
            _ => Ok(()),
        }
    }

    /// Validates `json_text` and appends it to the store.
    ///
    /// # Errors
    ///
    /// Returns the [`IngestError`] of the first gate that fails; persistence
    /// faults surface as [`IngestError::InternalFailure`].
    pub fn ingest(
        &self,
        json_text: Option<&str>,
        claimed_length: Option<u64>,
    ) -> Result<IngestOutcome, IngestError> {
        Self::check_declared_length(claimed_length)?;
        let text = match json_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(IngestError::EmptyInput),
        };
        let value = JsonDocument::parse(text).map_err(|err| {
            tracing::debug!(line = err.line(), column = err.column(), "rejected malformed json");
            IngestError::InvalidSyntax
        })?;
        let id = self.store.append(text).map_err(|err| {
            tracing::error!(error = %err, "failed to persist json record");
            IngestError::InternalFailure(err.to_string())
        })?;
        tracing::debug!(record_id = id.get(), bytes = text.len(), "stored json record");
        Ok(IngestOutcome {
            id,
            value,
        })
    }
}
