//! Protocol-level error and operation envelopes.
//!
//! On failure the engine returns a structured [`Fault`] payload, either on
//! its own or embedded in the [`Action`] envelope that operation endpoints
//! answer with. Both can accompany any HTTP status, which is why the fault
//! classifier treats status and payload as independent inputs.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::resource::{ElementKind, Resource};

// ---------------------------------------------------------------------------
// Fault
// ---------------------------------------------------------------------------

/// Structured error payload the engine may return in place of, or alongside,
/// an HTTP error status.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    /// Short machine-oriented summary (e.g. `"Operation Failed"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Longer human-oriented description of what went wrong.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Envelope returned by operation ("action") endpoints.
///
/// A completed action reports a status; a failed one embeds the [`Fault`]
/// describing why it failed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    /// Unique identifier assigned by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Canonical location of this action on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Completion status (e.g. `"complete"`, `"failed"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Failure description, present when the action did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
}

impl Resource for Action {
    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Single
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
