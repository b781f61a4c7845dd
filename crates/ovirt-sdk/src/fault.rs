//! HTTP response classification.
//!
//! Two upstream shapes funnel into the same classification: raw error
//! responses (checked with [`check_fault`]) and operation envelopes that may
//! embed a fault (checked with [`check_action`]). Both delegate to
//! [`classify`], so a given (status, fault) pair always produces the same
//! [`Error`] whichever path reported it.

use ovirt_models::codec;
use ovirt_models::{Action, Fault};
use reqwest::StatusCode;

use crate::error::Error;

/// Classify an HTTP status and optional fault payload into an [`Error`].
///
/// 401 and 403 map to [`Error::Auth`], 404 to [`Error::NotFound`], anything
/// else to [`Error::Generic`]. The message carries whatever diagnostic
/// context exists: fault reason and detail, numeric status, status text.
pub fn classify(status: Option<StatusCode>, fault: Option<&Fault>) -> Error {
    let mut parts: Vec<String> = Vec::new();
    if let Some(fault) = fault {
        if let Some(reason) = fault.reason.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("fault reason is \"{reason}\""));
        }
        if let Some(detail) = fault.detail.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("fault detail is \"{detail}\""));
        }
    }
    if let Some(status) = status {
        parts.push(format!("HTTP response code is {}", status.as_u16()));
        if let Some(text) = status.canonical_reason() {
            parts.push(format!("HTTP response message is \"{text}\""));
        }
    }
    let message = if parts.is_empty() {
        "unknown error".to_string()
    } else {
        parts.join(", ")
    };
    match status.map(|s| s.as_u16()) {
        Some(401) | Some(403) => Error::Auth { status, message },
        Some(404) => Error::NotFound { status, message },
        _ => Error::Generic { status, message },
    }
}

/// Interpret an error-path response and return the error to surface.
///
/// Called when a request is already suspected to have failed, so an empty
/// body still classifies from the status alone. A body rooted at some other
/// document tag falls through: the status decides, and a clean status with
/// unexplained content is reported as an unknown error. A body that is not
/// a document at all surfaces as the decoding error.
pub fn check_fault(status: StatusCode, body: &[u8]) -> Error {
    if body.is_empty() {
        return classify(Some(status), None);
    }
    match codec::read_fault(body) {
        Ok(fault) => classify(Some(status), Some(&fault)),
        Err(err) if err.is_tag_mismatch() => {
            if status.as_u16() >= 400 {
                classify(Some(status), None)
            } else {
                Error::generic("unknown error")
            }
        }
        Err(err) => err.into(),
    }
}

/// Interpret an operation-path response.
///
/// The body may be a fault document, an action envelope (possibly embedding
/// a fault of its own), or neither. `Ok(None)` means "not an error, not an
/// action"; what that signifies is for the caller to decide.
pub fn check_action(status: StatusCode, body: &[u8]) -> Result<Option<Action>, Error> {
    if body.is_empty() {
        if status.as_u16() >= 400 {
            return Err(classify(Some(status), None));
        }
        return Ok(None);
    }
    match codec::read_fault(body) {
        Ok(fault) => return Err(classify(Some(status), Some(&fault))),
        Err(err) if err.is_tag_mismatch() => {}
        Err(err) => return Err(err.into()),
    }
    match codec::read_action(body) {
        Ok(action) => {
            if let Some(fault) = &action.fault {
                return Err(classify(Some(status), Some(fault)));
            }
            Ok(Some(action))
        }
        Err(err) if err.is_tag_mismatch() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
