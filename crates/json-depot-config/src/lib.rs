// crates/json-depot-config/src/lib.rs
// ============================================================================
// Module: JSON Depot Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for json-depot.toml semantics.
// Dependencies: json-depot-core, json-depot-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `json-depot-config` defines the configuration model shared by the server
//! and CLI. Loading is strict: oversized, non-UTF-8, or unknown-key files are
//! rejected before any component starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
