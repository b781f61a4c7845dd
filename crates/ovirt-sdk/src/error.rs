//! SDK error types.
//!
//! [`Error`] is the single error type returned by every fallible operation
//! in the SDK. Responses the engine answers with an error status or a fault
//! payload are classified into the [`Auth`](Error::Auth) /
//! [`NotFound`](Error::NotFound) / [`Generic`](Error::Generic) variants;
//! transport and decoding failures keep their underlying error.

use reqwest::StatusCode;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration (bad URL, missing credentials,
    /// unreadable CA file). Always raised before any network I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP 401/403, or an SSO-level authentication failure.
    ///
    /// Recoverable by acquiring a fresh token; `Connection::test` does so
    /// once automatically.
    #[error("authentication failed: {message}")]
    Auth {
        /// HTTP status of the rejecting response, when one exists.
        status: Option<StatusCode>,
        /// Diagnostic description.
        message: String,
    },

    /// HTTP 404: the addressed resource does not exist on the server.
    #[error("not found: {message}")]
    NotFound {
        /// HTTP status of the response.
        status: Option<StatusCode>,
        /// Diagnostic description.
        message: String,
    },

    /// Anything else the server or protocol layer reports: unexpected
    /// status, fault without a classifiable status, invalid link reference,
    /// unparseable SSO body.
    #[error("{message}")]
    Generic {
        /// HTTP status of the response, when one exists.
        status: Option<StatusCode>,
        /// Diagnostic description.
        message: String,
    },

    /// HTTP transport failure (unreachable host, TLS handshake, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialisation error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol document decoding error.
    #[error(transparent)]
    Codec(#[from] ovirt_models::CodecError),
}

impl Error {
    pub(crate) fn generic(message: impl Into<String>) -> Self {
        Error::Generic {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status associated with this error, when one is known.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Auth { status, .. }
            | Error::NotFound { status, .. }
            | Error::Generic { status, .. } => *status,
            Error::Http(err) => err.status(),
            _ => None,
        }
    }

    /// True for errors that a fresh authentication attempt may clear.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }
}
