// crates/json-depot-core/tests/retrieval.rs
// ============================================================================
// Module: Retrieval Service Tests
// Description: Raw and parsed retrieval over stored records.
// Purpose: Ensure insertion order, per-record fallback, and error propagation.
// Dependencies: json-depot-core, serde_json
// ============================================================================

//! ## Overview
//! Validates the read-all retrieval service under both payload policies.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use json_depot_core::InMemoryJsonStore;
use json_depot_core::IngestPipeline;
use json_depot_core::JsonDocument;
use json_depot_core::JsonRecord;
use json_depot_core::JsonStore;
use json_depot_core::RecordData;
use json_depot_core::RecordDataFormat;
use json_depot_core::RecordId;
use json_depot_core::RetrievalService;
use json_depot_core::SharedJsonStore;
use json_depot_core::StoreError;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Store whose reads always fail.
struct UnreadableStore;

impl JsonStore for UnreadableStore {
    fn append(&self, _text: &str) -> Result<RecordId, StoreError> {
        Err(StoreError::Store("read-only".to_string()))
    }

    fn list_all(&self) -> Result<Vec<JsonRecord>, StoreError> {
        Err(StoreError::Corrupt("page checksum mismatch".to_string()))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::Corrupt("page checksum mismatch".to_string()))
    }
}

fn parsed(value: Value) -> RecordData {
    RecordData::Parsed(JsonDocument::from(value))
}

fn seeded_store() -> SharedJsonStore {
    let store = SharedJsonStore::from_store(InMemoryJsonStore::new());
    let pipeline = IngestPipeline::new(store.clone());
    pipeline.ingest(Some(r#"{"name":"John","age":30}"#), None).unwrap();
    pipeline.ingest(Some("[1, 2, 3]"), None).unwrap();
    store
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn empty_store_returns_empty_sequence() {
    let store = SharedJsonStore::from_store(InMemoryJsonStore::new());
    let service = RetrievalService::new(store, RecordDataFormat::Parsed);
    assert!(service.get_all().unwrap().is_empty());
}

#[test]
fn raw_format_returns_stored_text() {
    let service = RetrievalService::new(seeded_store(), RecordDataFormat::Raw);
    let views = service.get_all().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].id.get(), 1);
    assert_eq!(views[0].data, RecordData::Raw(r#"{"name":"John","age":30}"#.to_string()));
    assert_eq!(views[1].data, RecordData::Raw("[1, 2, 3]".to_string()));
}

#[test]
fn parsed_format_returns_structures() {
    let service = RetrievalService::new(seeded_store(), RecordDataFormat::Parsed);
    let views = service.get_all().unwrap();
    assert_eq!(views[0].data, parsed(json!({"name": "John", "age": 30})));
    assert_eq!(views[1].data, parsed(json!([1, 2, 3])));
}

#[test]
fn parsed_format_falls_back_to_raw_for_unparseable_rows() {
    let store = SharedJsonStore::from_store(InMemoryJsonStore::new());
    store.append("{\"ok\":1}").unwrap();
    store.append("{not json").unwrap();
    store.append("true").unwrap();
    let service = RetrievalService::new(store, RecordDataFormat::Parsed);
    let views = service.get_all().unwrap();
    assert_eq!(views.len(), 3);
    assert_eq!(views[0].data, parsed(json!({"ok": 1})));
    assert_eq!(views[1].data, RecordData::Raw("{not json".to_string()));
    assert_eq!(views[2].data, parsed(json!(true)));
}

#[test]
fn parsed_format_handles_deeply_nested_records() {
    let depth = 10_000;
    let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    let store = SharedJsonStore::from_store(InMemoryJsonStore::new());
    store.append(&text).unwrap();
    let views = RetrievalService::new(store, RecordDataFormat::Parsed).get_all().unwrap();
    assert!(matches!(views[0].data, RecordData::Parsed(_)));
    let body = serde_json::to_string(&views[0]).unwrap();
    assert_eq!(body, format!("{{\"id\":1,\"data\":{text}}}"));
}

#[test]
fn parsed_format_keeps_out_of_range_numbers() {
    let store = SharedJsonStore::from_store(InMemoryJsonStore::new());
    store.append("[1e400, 18446744073709551616]").unwrap();
    let views = RetrievalService::new(store, RecordDataFormat::Parsed).get_all().unwrap();
    let body = serde_json::to_string(&views[0].data).unwrap();
    assert_eq!(body, "[1e400,18446744073709551616]");
}

#[test]
fn views_serialize_with_raw_or_structured_data() {
    let raw = RetrievalService::new(seeded_store(), RecordDataFormat::Raw).get_all().unwrap();
    let parsed = RetrievalService::new(seeded_store(), RecordDataFormat::Parsed).get_all().unwrap();
    assert_eq!(
        serde_json::to_value(&raw[0]).unwrap(),
        json!({"id": 1, "data": "{\"name\":\"John\",\"age\":30}"})
    );
    assert_eq!(
        serde_json::to_value(&parsed[0]).unwrap(),
        json!({"id": 1, "data": {"name": "John", "age": 30}})
    );
}

#[test]
fn store_failure_fails_the_whole_call() {
    let service =
        RetrievalService::new(SharedJsonStore::from_store(UnreadableStore), RecordDataFormat::Raw);
    let err = service.get_all().unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}
