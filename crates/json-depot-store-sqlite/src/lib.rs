// crates/json-depot-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite JSON Store
// Description: Durable JsonStore backend using SQLite WAL.
// Purpose: Persist submitted JSON text in a single append-only table.
// Dependencies: json-depot-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`json_depot_core::JsonStore`] that
//! appends raw JSON text to one table and assigns `AUTOINCREMENT` identifiers.
//! The schema is created on first open and version-checked afterwards.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJsonStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
