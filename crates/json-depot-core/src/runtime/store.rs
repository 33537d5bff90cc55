// crates/json-depot-core/src/runtime/store.rs
// ============================================================================
// Module: JSON Depot In-Memory Store
// Description: In-memory JsonStore and the shared store wrapper.
// Purpose: Provide an ephemeral backend and a clonable handle for services.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryJsonStore`] keeps records in a mutex-guarded vector and is meant
//! for tests and throwaway runs. [`SharedJsonStore`] wraps any backend in an
//! `Arc` so the ingestion and retrieval services can share one process-wide
//! store handle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::JsonRecord;
use crate::core::RecordId;
use crate::interfaces::JsonStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory JSON record store for tests and ephemeral runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryJsonStore {
    /// Records in insertion order, protected by a mutex.
    records: Arc<Mutex<Vec<JsonRecord>>>,
}

impl InMemoryJsonStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl JsonStore for InMemoryJsonStore {
    fn append(&self, text: &str) -> Result<RecordId, StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("json store mutex poisoned".to_string()))?;
        let next = u64::try_from(guard.len())
            .ok()
            .and_then(|len| len.checked_add(1))
            .and_then(RecordId::from_raw)
            .ok_or_else(|| StoreError::Store("record id overflow".to_string()))?;
        guard.push(JsonRecord {
            id: next,
            data: text.to_string(),
        });
        drop(guard);
        Ok(next)
    }

    fn list_all(&self) -> Result<Vec<JsonRecord>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("json store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn count(&self) -> Result<u64, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("json store mutex poisoned".to_string()))?;
        u64::try_from(guard.len())
            .map_err(|_| StoreError::Store("record count overflow".to_string()))
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared JSON store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedJsonStore {
    /// Inner store implementation.
    inner: Arc<dyn JsonStore + Send + Sync>,
}

impl SharedJsonStore {
    /// Wraps a store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl JsonStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub fn new(inner: Arc<dyn JsonStore + Send + Sync>) -> Self {
        Self {
            inner,
        }
    }
}

impl JsonStore for SharedJsonStore {
    fn append(&self, text: &str) -> Result<RecordId, StoreError> {
        self.inner.append(text)
    }

    fn list_all(&self) -> Result<Vec<JsonRecord>, StoreError> {
        self.inner.list_all()
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.inner.count()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::InMemoryJsonStore;
    use super::SharedJsonStore;
    use crate::interfaces::JsonStore;

    #[test]
    fn in_memory_store_assigns_sequential_ids() {
        let store = InMemoryJsonStore::new();
        let first = store.append("{}").unwrap();
        let second = store.append("[]").unwrap();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn shared_store_sees_writes_through_clones() {
        let shared = SharedJsonStore::from_store(InMemoryJsonStore::new());
        let clone = shared.clone();
        clone.append("1").unwrap();
        let records = shared.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, "1");
    }
}
