// crates/json-depot-core/src/lib.rs
// ============================================================================
// Module: JSON Depot Core Library
// Description: Public API surface for the JSON Depot core.
// Purpose: Expose record types, the store interface, and the depot services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! JSON Depot core owns the write-once/read-all record model. Incoming JSON
//! text passes through the [`IngestPipeline`] (size, emptiness, syntax gates)
//! before being appended to a [`JsonStore`]; the [`RetrievalService`] reads
//! every stored record back. Storage backends plug in through the
//! [`JsonStore`] trait and never validate what they are given.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::JsonStore;
pub use interfaces::StoreError;
pub use runtime::InMemoryJsonStore;
pub use runtime::IngestError;
pub use runtime::IngestOutcome;
pub use runtime::IngestPipeline;
pub use runtime::MAX_DECLARED_BYTES;
pub use runtime::RetrievalService;
pub use runtime::SharedJsonStore;
