//! TLS trust configuration.
//!
//! A connection verifies the engine's certificate against exactly one trust
//! source: the platform store (default), a caller-supplied CA file or raw CA
//! bytes, or nothing at all in insecure mode. Trust is resolved once at
//! session build, so configuration mistakes (missing file, bad PEM) surface
//! before any network I/O.

use std::fs;
use std::path::PathBuf;

use reqwest::{Certificate, ClientBuilder};

use crate::error::Error;

// ---------------------------------------------------------------------------
// TlsConfig
// ---------------------------------------------------------------------------

/// Trust settings as collected by the connection builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct TlsConfig {
    pub(crate) insecure: bool,
    pub(crate) ca_file: Option<PathBuf>,
    pub(crate) ca_bytes: Option<Vec<u8>>,
}

impl TlsConfig {
    /// Resolve the settings into a usable trust anchor.
    ///
    /// The insecure flag wins over everything; a CA file wins over raw CA
    /// bytes when both are configured.
    pub(crate) fn resolve(&self) -> Result<Trust, Error> {
        if self.insecure {
            return Ok(Trust::Insecure);
        }
        if let Some(path) = &self.ca_file {
            let pem = fs::read(path).map_err(|err| {
                Error::Config(format!("cannot read CA file {}: {err}", path.display()))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|err| {
                Error::Config(format!("cannot parse CA file {}: {err}", path.display()))
            })?;
            return Ok(Trust::Pinned(certificate));
        }
        if let Some(pem) = &self.ca_bytes {
            let certificate = Certificate::from_pem(pem)
                .map_err(|err| Error::Config(format!("cannot parse CA bytes: {err}")))?;
            return Ok(Trust::Pinned(certificate));
        }
        Ok(Trust::System)
    }
}

// ---------------------------------------------------------------------------
// Trust
// ---------------------------------------------------------------------------

/// Resolved trust anchor, applied to every transport the connection builds.
#[derive(Debug, Clone)]
pub(crate) enum Trust {
    /// Platform certificate store.
    System,
    /// Certificate verification disabled.
    Insecure,
    /// A specific CA certificate.
    Pinned(Certificate),
}

impl Trust {
    pub(crate) fn apply(&self, builder: ClientBuilder) -> ClientBuilder {
        match self {
            Trust::System => builder,
            Trust::Insecure => builder.danger_accept_invalid_certs(true),
            Trust::Pinned(certificate) => builder.add_root_certificate(certificate.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
