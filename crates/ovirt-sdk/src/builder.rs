//! Connection construction.
//!
//! All configuration is validated here, before any network I/O. Setters
//! short-circuit once an error has been recorded, and the first recorded
//! error is the one [`ConnectionBuilder::build`] reports.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::connection::Connection;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::link::ServiceLocator;
use crate::tls::TlsConfig;

/// Builder for [`Connection`].
///
/// ```rust,no_run
/// use ovirt_sdk::Connection;
///
/// # fn run() -> Result<(), ovirt_sdk::Error> {
/// let connection = Connection::builder()
///     .url("https://engine.example.com/ovirt-engine/api")
///     .username("admin@internal")
///     .password("secret")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionBuilder {
    url: Option<Url>,
    username: Option<String>,
    password: Option<String>,
    kerberos: bool,
    token: Option<String>,
    tls: TlsConfig,
    headers: HashMap<String, String>,
    compress: bool,
    timeout: Option<Duration>,
    locator: Option<Arc<dyn ServiceLocator>>,
    error: Option<Error>,
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        ConnectionBuilder {
            url: None,
            username: None,
            password: None,
            kerberos: false,
            token: None,
            tls: TlsConfig::default(),
            headers: HashMap::new(),
            compress: true,
            timeout: None,
            locator: None,
            error: None,
        }
    }
}

impl ConnectionBuilder {
    /// Start with defaults: system TLS trust, compression on, no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the API entry point,
    /// e.g. `https://engine.example.com/ovirt-engine/api`.
    pub fn url(mut self, url: impl AsRef<str>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let raw = url.as_ref();
        match Url::parse(raw) {
            Ok(parsed) => self.url = Some(parsed),
            Err(err) => self.error = Some(Error::Config(format!("invalid URL \"{raw}\": {err}"))),
        }
        self
    }

    /// Engine user, e.g. `admin@internal`.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.username = Some(username.into());
        }
        self
    }

    /// The user's password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.password = Some(password.into());
        }
        self
    }

    /// Reuse a token acquired elsewhere instead of authenticating on first
    /// use. Credentials are still required, so the session can re-acquire a
    /// token when this one goes stale.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.token = Some(token.into());
        }
        self
    }

    /// Request the negotiated (Kerberos) SSO grant instead of the password
    /// grant. Currently rejected at [`build`](Self::build).
    pub fn kerberos(mut self, kerberos: bool) -> Self {
        if self.error.is_none() {
            self.kerberos = kerberos;
        }
        self
    }

    /// Disable TLS certificate verification.
    pub fn insecure(mut self, insecure: bool) -> Self {
        if self.error.is_none() {
            self.tls.insecure = insecure;
        }
        self
    }

    /// Verify the engine against the CA certificate in this PEM file.
    /// Takes precedence over [`ca_bytes`](Self::ca_bytes).
    pub fn ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        if self.error.is_none() {
            self.tls.ca_file = Some(path.into());
        }
        self
    }

    /// Verify the engine against this PEM-encoded CA certificate.
    pub fn ca_bytes(mut self, pem: impl Into<Vec<u8>>) -> Self {
        if self.error.is_none() {
            self.tls.ca_bytes = Some(pem.into());
        }
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if name.is_empty() {
            self.error = Some(Error::Config("header name must not be empty".into()));
            return self;
        }
        self.headers.insert(name, value.into());
        self
    }

    /// Enable or disable transparent response compression.
    pub fn compress(mut self, compress: bool) -> Self {
        if self.error.is_none() {
            self.compress = compress;
        }
        self
    }

    /// Per-request timeout. Unset means the transport default (no timeout).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        if self.error.is_some() {
            return self;
        }
        if timeout.is_zero() {
            self.error = Some(Error::Config("timeout must be greater than zero".into()));
            return self;
        }
        self.timeout = Some(timeout);
        self
    }

    /// Service tree used to resolve followed links.
    pub fn service_locator(mut self, locator: Arc<dyn ServiceLocator>) -> Self {
        if self.error.is_none() {
            self.locator = Some(locator);
        }
        self
    }

    /// Validate the collected configuration and create the connection.
    ///
    /// No network I/O happens here; the first configuration problem found
    /// (or recorded earlier by a setter) is returned as [`Error::Config`].
    pub fn build(self) -> Result<Connection, Error> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let url = self
            .url
            .ok_or_else(|| Error::Config("the URL must not be empty".into()))?;
        if self.kerberos {
            return Err(Error::Config(
                "negotiated Kerberos authentication is not yet implemented".into(),
            ));
        }
        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() => Credentials::Password {
                username,
                password,
            },
            _ => {
                return Err(Error::Config(
                    "both username and password must be provided".into(),
                ))
            }
        };
        let trust = self.tls.resolve()?;
        Ok(Connection {
            url,
            credentials,
            token: self.token,
            trust,
            headers: self.headers,
            compress: self.compress,
            timeout: self.timeout,
            locator: self.locator,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
