//! Authentication credentials for a connection.

/// How a connection authenticates against the engine's SSO service.
///
/// The grant flow follows from the credential kind: username/password
/// selects the resource-owner password grant, Kerberos the negotiated
/// HTTP grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Resource-owner password grant.
    Password {
        /// Engine user, e.g. `admin@internal`.
        username: String,
        /// The user's password.
        password: String,
    },

    /// Negotiated (Kerberos) grant via the `token-http-auth` endpoint.
    ///
    /// Modeled at the wire level, but rejected by the connection builder
    /// until ticket handling lands.
    Kerberos,
}
