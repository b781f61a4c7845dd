//! Readers for single-tag protocol documents.
//!
//! The engine frames error and operation payloads as documents rooted at a
//! single tag: `{"fault": {…}}` and `{"action": {…}}`. Response checking
//! needs two distinct failure modes from these readers: a well-formed
//! document rooted at a *different* tag drives fall-through parsing (try the
//! next document kind), while a payload that is not a document at all is a
//! hard error surfaced to the caller.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::fault::{Action, Fault};

/// Error produced when reading a single-tag document.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is a well-formed document rooted at a different tag.
    #[error("expected a `{expected}` document, found `{found}`")]
    TagMismatch {
        /// Tag the caller asked for.
        expected: &'static str,
        /// Root tag (or JSON value kind) actually present.
        found: String,
    },

    /// The payload is not well-formed JSON, or the tagged content does not
    /// have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CodecError {
    /// True for the [`CodecError::TagMismatch`] variant.
    pub fn is_tag_mismatch(&self) -> bool {
        matches!(self, CodecError::TagMismatch { .. })
    }
}

/// Read a single `fault` document.
pub fn read_fault(body: &[u8]) -> Result<Fault, CodecError> {
    read_tagged(body, "fault")
}

/// Read a single `action` document.
pub fn read_action(body: &[u8]) -> Result<Action, CodecError> {
    read_tagged(body, "action")
}

fn read_tagged<T: DeserializeOwned>(body: &[u8], tag: &'static str) -> Result<T, CodecError> {
    let root: Value = serde_json::from_slice(body)?;
    let mut map = match root {
        Value::Object(map) => map,
        other => {
            return Err(CodecError::TagMismatch {
                expected: tag,
                found: json_kind(&other).to_string(),
            })
        }
    };
    match map.remove(tag) {
        Some(inner) => Ok(serde_json::from_value(inner)?),
        None => {
            let found = map
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "empty object".to_string());
            Err(CodecError::TagMismatch {
                expected: tag,
                found,
            })
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
