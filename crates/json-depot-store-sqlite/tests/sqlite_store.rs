// crates/json-depot-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite JSON Store Tests
// Description: Durability, ordering, and schema checks for the SQLite store.
// Purpose: Validate verbatim persistence, unique ids, and fail-closed opens.
// ============================================================================

//! ## Overview
//! Integration tests for [`SqliteJsonStore`]:
//! - Verbatim append and ordered reads
//! - Persistence across store instances
//! - Concurrent appends yield unique identifiers
//! - Schema version and path rejection

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::thread;

use json_depot_core::IngestPipeline;
use json_depot_core::JsonStore;
use json_depot_core::RecordData;
use json_depot_core::RecordDataFormat;
use json_depot_core::RetrievalService;
use json_depot_core::SharedJsonStore;
use json_depot_core::StoreError;
use json_depot_store_sqlite::SqliteJsonStore;
use json_depot_store_sqlite::SqliteStoreConfig;
use json_depot_store_sqlite::SqliteStoreError;
use json_depot_store_sqlite::SqliteStoreMode;
use json_depot_store_sqlite::SqliteSyncMode;
use proptest::prelude::*;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn config_for(path: &Path) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    }
}

fn store_in(dir: &TempDir) -> SqliteJsonStore {
    SqliteJsonStore::new(&config_for(&dir.path().join("depot.sqlite"))).expect("store init")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn empty_store_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.list_all().unwrap().is_empty());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn append_stores_text_verbatim_in_id_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let texts = ["{\"name\":\"John\",\"age\":30}", "  [1,\n 2 ]  ", "\"caf\u{e9} \u{1f600}\""];
    let ids: Vec<u64> = texts.iter().map(|text| store.append(text).unwrap().get()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let records = store.list_all().unwrap();
    assert_eq!(records.len(), 3);
    for (record, text) in records.iter().zip(texts) {
        assert_eq!(record.data, text);
    }
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn store_does_not_validate_json() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.append("{definitely not json").unwrap();
    assert_eq!(store.list_all().unwrap()[0].data, "{definitely not json");
}

#[test]
fn records_persist_across_instances() {
    let dir = TempDir::new().unwrap();
    {
        let store = store_in(&dir);
        store.append("{\"first\":true}").unwrap();
    }
    let reopened = store_in(&dir);
    let id = reopened.append("{\"second\":true}").unwrap();
    assert_eq!(id.get(), 2);
    let data: Vec<String> =
        reopened.list_all().unwrap().into_iter().map(|record| record.data).collect();
    assert_eq!(data, vec!["{\"first\":true}".to_string(), "{\"second\":true}".to_string()]);
}

#[test]
fn ids_are_not_reused_after_rows_are_removed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("depot.sqlite");
    let store = SqliteJsonStore::new(&config_for(&path)).unwrap();
    store.append("1").unwrap();
    store.append("2").unwrap();
    let conn = Connection::open(&path).unwrap();
    conn.execute("DELETE FROM json_data WHERE id = ?1", params![2_i64]).unwrap();
    drop(conn);
    assert_eq!(store.append("3").unwrap().get(), 3);
}

#[test]
fn concurrent_appends_receive_unique_ids() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let handles: Vec<_> = (0 .. 8)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                (0 .. 25)
                    .map(|n| store.append(&format!("{{\"w\":{worker},\"n\":{n}}}")).unwrap().get())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let mut ids = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(ids.len(), 200);
    assert_eq!(store.count().unwrap(), 200);
    let listed: Vec<u64> = store.list_all().unwrap().iter().map(|record| record.id.get()).collect();
    assert!(listed.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn pipeline_and_retrieval_run_over_sqlite() {
    let dir = TempDir::new().unwrap();
    let shared = SharedJsonStore::from_store(store_in(&dir));
    let pipeline = IngestPipeline::new(shared.clone());
    let outcome = pipeline.ingest(Some("{\"name\":\"John\",\"age\":30}"), Some(24)).unwrap();
    assert!(pipeline.ingest(Some("{name: \"John\"}"), None).is_err());
    let views = RetrievalService::new(shared, RecordDataFormat::Raw).get_all().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, outcome.id);
    assert_eq!(views[0].data, RecordData::Raw("{\"name\":\"John\",\"age\":30}".to_string()));
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("depot.sqlite");
    drop(SqliteJsonStore::new(&config_for(&path)).unwrap());
    let conn = Connection::open(&path).unwrap();
    conn.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(conn);
    let Err(err) = SqliteJsonStore::new(&config_for(&path)) else {
        panic!("expected version mismatch");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
    assert!(matches!(StoreError::from(err), StoreError::VersionMismatch(_)));
}

#[test]
fn directory_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let Err(err) = SqliteJsonStore::new(&config_for(dir.path())) else {
        panic!("expected invalid path");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("depot.sqlite");
    let store = SqliteJsonStore::new(&SqliteStoreConfig::for_path(&path)).unwrap();
    store.append("{}").unwrap();
    assert!(path.exists());
}

#[test]
fn delete_journal_mode_is_supported() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir.path().join("legacy.sqlite"));
    config.journal_mode = SqliteStoreMode::Delete;
    config.sync_mode = SqliteSyncMode::Normal;
    let store = SqliteJsonStore::new(&config).unwrap();
    store.append("[]").unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn arbitrary_text_round_trips_byte_for_byte(text in "\\PC{0,64}") {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let id = store.append(&text).unwrap();
        let records = store.list_all().unwrap();
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(records[0].id, id);
        prop_assert_eq!(&records[0].data, &text);
    }
}
