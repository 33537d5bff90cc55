// crates/json-depot-core/src/core/document.rs
// ============================================================================
// Module: JSON Depot Documents
// Description: Parsed JSON structures with nesting-independent stack use.
// Purpose: Parse, serialize, and drop documents of any depth without overflow.
// Dependencies: serde, serde_json, serde_stacker, stacker
// ============================================================================

//! ## Overview
//! [`JsonDocument`] owns a parsed `serde_json::Value`. Parsing disables the
//! parser recursion limit and runs on segmented stacks, so any well-formed
//! text is accepted regardless of nesting. Serializing grows the stack the
//! same way, and dropping dismantles the tree iteratively.
//!
//! Numbers keep their submitted text (`1e400` stays `1e400`). Strings must be
//! valid Unicode: an unpaired surrogate escape such as `"\ud800"` is a parse
//! error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Remaining stack below which a new segment is allocated.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each additional stack segment.
const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;

// ============================================================================
// SECTION: Document
// ============================================================================

/// Parsed JSON structure safe to handle at any nesting depth.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument(Value);

impl JsonDocument {
    /// Parses exactly one JSON value from `text`.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when `text` is not a single well-formed
    /// JSON value.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        deserializer.disable_recursion_limit();
        let mut stacked = serde_stacker::Deserializer::new(&mut deserializer);
        stacked.red_zone = STACK_RED_ZONE;
        stacked.stack_size = STACK_SEGMENT_SIZE;
        let document = Self(Value::deserialize(stacked)?);
        deserializer.end()?;
        Ok(document)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for JsonDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl PartialEq<Value> for JsonDocument {
    fn eq(&self, other: &Value) -> bool {
        self.0 == *other
    }
}

impl Serialize for JsonDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StackedValue(&self.0).serialize(serializer)
    }
}

impl Drop for JsonDocument {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.0, &mut pending);
        while let Some(mut child) = pending.pop() {
            detach_children(&mut child, &mut pending);
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a value, growing the stack before each nested container.
struct StackedValue<'a>(&'a Value);

impl Serialize for StackedValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Array(items) => stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
                serializer.collect_seq(items.iter().map(StackedValue))
            }),
            Value::Object(map) => stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
                serializer.collect_map(map.iter().map(|(key, child)| (key, StackedValue(child))))
            }),
            leaf => leaf.serialize(serializer),
        }
    }
}

/// Moves the direct children of `value` into `pending`, leaving it shallow.
fn detach_children(value: &mut Value, pending: &mut Vec<Value>) {
    match value {
        Value::Array(items) => pending.append(items),
        Value::Object(map) => {
            pending.extend(std::mem::take(map).into_iter().map(|(_, child)| child));
        }
        _ => {}
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

    use serde_json::json;

    use super::JsonDocument;

    fn nested_arrays(depth: usize) -> String {
        format!("{}{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn parse_accepts_nesting_past_default_parser_limit() {
        for depth in [128, 129, 10_000] {
            let text = nested_arrays(depth);
            let document = JsonDocument::parse(&text).unwrap();
            assert_eq!(serde_json::to_string(&document).unwrap(), text);
        }
    }

    #[test]
    fn parse_accepts_deep_objects() {
        let depth = 5_000;
        let text = format!("{}null{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
        let document = JsonDocument::parse(&text).unwrap();
        assert_eq!(serde_json::to_string(&document).unwrap(), text);
    }

    #[test]
    fn parse_rejects_trailing_content_after_deep_value() {
        let text = format!("{} x", nested_arrays(10_000));
        assert!(JsonDocument::parse(&text).is_err());
    }

    #[test]
    fn numbers_keep_submitted_text() {
        for text in ["1e400", "-1e400", "123456789012345678901234567890", "0.10", "-0"] {
            let document = JsonDocument::parse(text).unwrap();
            assert_eq!(serde_json::to_string(&document).unwrap(), text);
        }
    }

    #[test]
    fn unpaired_surrogate_escape_is_rejected() {
        assert!(JsonDocument::parse(r#""\ud800""#).is_err());
        let pair = JsonDocument::parse(r#""\ud83d\ude00""#).unwrap();
        assert_eq!(pair.as_value(), &json!("\u{1F600}"));
    }

    #[test]
    fn compares_with_plain_values() {
        let document = JsonDocument::parse(r#"{"name":"John","age":30}"#).unwrap();
        assert_eq!(document, json!({"name": "John", "age": 30}));
        assert_eq!(JsonDocument::from(json!([1, 2])), JsonDocument::parse("[1,2]").unwrap());
    }
}
