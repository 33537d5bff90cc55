// crates/json-depot-core/src/runtime/retrieval.rs
// ============================================================================
// Module: JSON Depot Retrieval Service
// Description: Read-all accessor over the JSON store.
// Purpose: Return every stored record, raw or re-parsed per policy.
// Dependencies: crate::{core, interfaces, runtime::store}, tracing
// ============================================================================

//! ## Overview
//! [`RetrievalService::get_all`] scans the store and maps each record to a
//! [`RecordView`]. With [`RecordDataFormat::Parsed`] the stored text is
//! re-parsed; a record that fails to parse falls back to its raw text instead
//! of failing the whole call, since stores do not validate what they hold.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::JsonDocument;
use crate::core::JsonRecord;
use crate::core::RecordData;
use crate::core::RecordDataFormat;
use crate::core::RecordView;
use crate::interfaces::JsonStore;
use crate::interfaces::StoreError;
use crate::runtime::store::SharedJsonStore;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Read-all service over a shared store.
#[derive(Clone)]
pub struct RetrievalService {
    /// Source store.
    store: SharedJsonStore,
    /// Payload representation policy.
    format: RecordDataFormat,
}

impl RetrievalService {
    /// Creates a retrieval service with the given payload policy.
    #[must_use]
    pub const fn new(store: SharedJsonStore, format: RecordDataFormat) -> Self {
        Self {
            store,
            format,
        }
    }

    /// Returns the configured payload policy.
    #[must_use]
    pub const fn format(&self) -> RecordDataFormat {
        self.format
    }

    /// Returns every stored record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read in full.
    pub fn get_all(&self) -> Result<Vec<RecordView>, StoreError> {
        let records = self.store.list_all()?;
        Ok(records.into_iter().map(|record| self.view(record)).collect())
    }

    /// Maps a stored record to its read-side view.
    fn view(&self, record: JsonRecord) -> RecordView {
        let JsonRecord {
            id,
            data,
        } = record;
        let data = match self.format {
            RecordDataFormat::Raw => RecordData::Raw(data),
            RecordDataFormat::Parsed => match JsonDocument::parse(&data) {
                Ok(value) => RecordData::Parsed(value),
                Err(err) => {
                    tracing::warn!(
                        record_id = id.get(),
                        error = %err,
                        "stored record is not valid json; returning raw text"
                    );
                    RecordData::Raw(data)
                }
            },
        };
        RecordView {
            id,
            data,
        }
    }
}
