//! The authenticated session against an engine.
//!
//! [`Connection`] owns the SSO token and everything needed to reach the
//! server: trust anchor, custom headers, compression and timeout settings.
//! It is not internally synchronised — a connection belongs to one logical
//! owner at a time, and concurrent use must be serialised by the caller.
//!
//! Transports are rebuilt per call with keep-alive disabled, so no
//! persistent connection state outlives an operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

use crate::builder::ConnectionBuilder;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::fault;
use crate::link::ServiceLocator;
use crate::sso::{self, SsoRequest, SsoResponse};
use crate::tls::Trust;

/// User-Agent reported on every request.
const USER_AGENT: &str = concat!("ovirt-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// An authenticated session against one engine.
///
/// Created through [`Connection::builder`]; holds at most one bearer token
/// at a time, acquired lazily and discarded when detected stale.
pub struct Connection {
    pub(crate) url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) token: Option<String>,
    pub(crate) trust: Trust,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) compress: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) locator: Option<Arc<dyn ServiceLocator>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("compress", &self.compress)
            .field("timeout", &self.timeout)
            .field("has_token", &self.token.is_some())
            .field("has_locator", &self.locator.is_some())
            .finish_non_exhaustive()
    }
}

impl Connection {
    // ------------------------------------------------------------------
    // Construction / accessors
    // ------------------------------------------------------------------

    /// Start building a connection.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// The API entry point this connection talks to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The currently held bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Return the held token, acquiring one through SSO if none is held.
    ///
    /// Performs at most one acquisition attempt; an SSO-level failure comes
    /// back as [`Error::Auth`] carrying the server's error code and
    /// description.
    pub async fn authenticate(&mut self) -> Result<String, Error> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        debug!(url = %self.url, "acquiring SSO token");
        let request = sso::auth_request(&self.url, &self.credentials);
        let response = self.send_sso(request).await?;
        if let Some(description) = response.error {
            let code = response.error_code.unwrap_or_default();
            return Err(Error::Auth {
                status: None,
                message: format!("error during SSO authentication {code}: {description}"),
            });
        }
        let token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Auth {
                status: None,
                message: "SSO response contained no access token".into(),
            })?;
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Probe the API entry point with the held token.
    ///
    /// A minimal `HEAD` request exercising both network reachability and
    /// token validity. The token is left untouched whatever the outcome;
    /// transport failures surface as [`Error::Http`].
    pub async fn verify(&self) -> Result<StatusCode, Error> {
        let client = self.transport()?;
        let mut request = self.apply_headers(client.head(self.url.clone()));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Ok(response.status())
    }

    /// Confirm the session works, self-healing a stale token once.
    ///
    /// Runs [`verify`](Self::verify); a transport failure or an HTTP 401
    /// discards the held token. Authentication then runs unconditionally,
    /// re-acquiring a token when one was discarded (or never held) and
    /// surfacing any acquisition failure. Not a guaranteed-pass health
    /// check: if re-acquisition fails, that error is returned.
    pub async fn test(&mut self) -> Result<(), Error> {
        match self.verify().await {
            Err(err) => {
                debug!(error = %err, "probe failed, discarding held token");
                self.token = None;
            }
            Ok(status) if status == StatusCode::UNAUTHORIZED => {
                debug!("engine rejected the held token, discarding it");
                self.token = None;
            }
            Ok(_) => {}
        }
        self.authenticate().await.map(|_| ())
    }

    /// Revoke the held token with the SSO service.
    ///
    /// The local token field is left in place; a revoked session object is
    /// expected to be discarded, see [`close`](Self::close).
    pub async fn revoke(&self) -> Result<(), Error> {
        let token = self.token.clone().unwrap_or_default();
        let request = sso::revoke_request(&self.url, &token);
        let response = self.send_sso(request).await?;
        if let Some(description) = response.error {
            let code = response.error_code.unwrap_or_default();
            return Err(Error::Auth {
                status: None,
                message: format!("error during SSO revocation {code}: {description}"),
            });
        }
        debug!("SSO token revoked");
        Ok(())
    }

    /// Tear the session down: revoke the token and consume the connection.
    pub async fn close(self) -> Result<(), Error> {
        self.revoke().await
    }

    // ------------------------------------------------------------------
    // Raw requests
    // ------------------------------------------------------------------

    /// Authenticated `GET` of a path relative to the API entry point.
    ///
    /// The building block for the generated resource layer: ensures a token
    /// is held, applies bearer and custom headers, and returns the raw
    /// status and body for the caller to decode.
    pub async fn get_raw(&mut self, path: &str) -> Result<(StatusCode, Vec<u8>), Error> {
        let token = self.authenticate().await?;
        let url = join_path(&self.url, path)?;
        let client = self.transport()?;
        let request = self.apply_headers(client.get(url)).bearer_auth(token);
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }

    /// Raise the classified error for a failed response.
    ///
    /// Statuses below 400 pass through untouched; everything else goes to
    /// the fault classifier.
    pub fn check_response(&self, status: StatusCode, body: &[u8]) -> Result<(), Error> {
        if status.as_u16() < 400 {
            return Ok(());
        }
        Err(fault::check_fault(status, body))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) async fn send_sso(&self, request: SsoRequest) -> Result<SsoResponse, Error> {
        let client = self.transport()?;
        let post = self
            .apply_headers(client.post(request.url))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&request.form);
        let response = post.send().await?;
        let body = response.bytes().await?;
        sso::parse_response(&body)
    }

    /// Build a fresh transport for a single call.
    ///
    /// Keep-alive is disabled: no pooled connection survives between calls.
    fn transport(&self) -> Result<Client, Error> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(0);
        if !self.compress {
            builder = builder.no_gzip();
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder = self.trust.apply(builder);
        Ok(builder.build()?)
    }

    fn apply_headers(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }
}

/// Append a relative path to the API entry point.
fn join_path(base: &Url, path: &str) -> Result<Url, Error> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::Config(format!("URL \"{base}\" cannot carry a path")))?;
        segments.pop_if_empty();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            segments.push(segment);
        }
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};

    use super::*;

    fn connection_for(server: &ServerGuard) -> Connection {
        Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .build()
            .expect("connection")
    }

    #[tokio::test]
    async fn authenticate_acquires_and_reuses_the_token() {
        let mut server = Server::new_async().await;
        let sso = server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .match_header("accept", "application/json")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "password".into()),
                Matcher::UrlEncoded("username".into(), "admin@internal".into()),
                Matcher::UrlEncoded("password".into(), "secret".into()),
                Matcher::UrlEncoded("scope".into(), "ovirt-app-api".into()),
            ]))
            .with_body(r#"{"access_token":"tok-1"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut connection = connection_for(&server);
        assert_eq!(connection.authenticate().await.unwrap(), "tok-1");
        // the held token is reused, no second POST happens
        assert_eq!(connection.authenticate().await.unwrap(), "tok-1");
        assert_eq!(connection.token(), Some("tok-1"));
        sso.assert_async().await;
    }

    #[tokio::test]
    async fn authenticate_accepts_the_array_wrapped_shape() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .with_body(r#"[{"access_token":"tok-wrapped"}]"#)
            .create_async()
            .await;

        let mut connection = connection_for(&server);
        assert_eq!(connection.authenticate().await.unwrap(), "tok-wrapped");
    }

    #[tokio::test]
    async fn authenticate_surfaces_sso_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .with_status(400)
            .with_body(r#"{"error_code":"access_denied","error":"bad password"}"#)
            .create_async()
            .await;

        let mut connection = connection_for(&server);
        let err = connection.authenticate().await.unwrap_err();
        assert!(err.is_auth());
        let message = err.to_string();
        assert!(message.contains("access_denied"));
        assert!(message.contains("bad password"));
        assert_eq!(connection.token(), None);
    }

    #[tokio::test]
    async fn authenticate_rejects_a_tokenless_success() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .with_body("{}")
            .create_async()
            .await;

        let mut connection = connection_for(&server);
        let err = connection.authenticate().await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("no access token"));
    }

    #[tokio::test]
    async fn verify_reports_the_status_and_keeps_the_token() {
        let mut server = Server::new_async().await;
        let probe = server
            .mock("HEAD", "/ovirt-engine/api")
            .match_header("authorization", "Bearer tok-stale")
            .with_status(401)
            .create_async()
            .await;

        let connection = Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .token("tok-stale")
            .build()
            .unwrap();

        assert_eq!(
            connection.verify().await.unwrap(),
            StatusCode::UNAUTHORIZED
        );
        // verify never clears the token by itself
        assert_eq!(connection.token(), Some("tok-stale"));
        probe.assert_async().await;
    }

    #[tokio::test]
    async fn verify_surfaces_transport_errors() {
        let connection = Connection::builder()
            .url("http://127.0.0.1:1/ovirt-engine/api")
            .username("admin@internal")
            .password("secret")
            .build()
            .unwrap();
        assert!(matches!(
            connection.verify().await.unwrap_err(),
            Error::Http(_)
        ));
    }

    #[tokio::test]
    async fn test_discards_a_stale_token_and_reacquires() {
        let mut server = Server::new_async().await;
        let probe = server
            .mock("HEAD", "/ovirt-engine/api")
            .with_status(401)
            .create_async()
            .await;
        let sso = server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .with_body(r#"{"access_token":"tok-fresh"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut connection = Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .token("tok-stale")
            .build()
            .unwrap();

        connection.test().await.unwrap();
        assert_eq!(connection.token(), Some("tok-fresh"));
        probe.assert_async().await;
        sso.assert_async().await;
    }

    #[tokio::test]
    async fn test_keeps_a_healthy_token() {
        let mut server = Server::new_async().await;
        server
            .mock("HEAD", "/ovirt-engine/api")
            .with_status(200)
            .create_async()
            .await;
        let sso = server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let mut connection = Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .token("tok-good")
            .build()
            .unwrap();

        connection.test().await.unwrap();
        assert_eq!(connection.token(), Some("tok-good"));
        sso.assert_async().await;
    }

    #[tokio::test]
    async fn test_discards_the_token_on_transport_failure() {
        let mut connection = Connection::builder()
            .url("http://127.0.0.1:1/ovirt-engine/api")
            .username("admin@internal")
            .password("secret")
            .token("tok-unreachable")
            .build()
            .unwrap();

        // re-acquisition fails too, and that error surfaces
        assert!(connection.test().await.is_err());
        assert_eq!(connection.token(), None);
    }

    #[tokio::test]
    async fn revoke_leaves_local_token_in_place() {
        // observed upstream behaviour: revocation does not clear the field;
        // the session object is expected to be discarded afterwards
        let mut server = Server::new_async().await;
        let logout = server
            .mock("POST", "/ovirt-engine/services/sso-logout")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("scope".into(), String::new()),
                Matcher::UrlEncoded("token".into(), "tok-x".into()),
            ]))
            .with_body("")
            .create_async()
            .await;

        let connection = Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .token("tok-x")
            .build()
            .unwrap();

        connection.revoke().await.unwrap();
        assert_eq!(connection.token(), Some("tok-x"));
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn revoke_surfaces_sso_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/ovirt-engine/services/sso-logout")
            .with_status(400)
            .with_body(r#"{"error_code":"invalid_grant","error":"unknown token"}"#)
            .create_async()
            .await;

        let connection = Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .token("tok-x")
            .build()
            .unwrap();

        let err = connection.revoke().await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn get_raw_sends_bearer_and_custom_headers() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/ovirt-engine/sso/oauth/token")
            .with_body(r#"{"access_token":"tok-1"}"#)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/ovirt-engine/api/vms/123")
            .match_header("authorization", "Bearer tok-1")
            .match_header("version", "4")
            .with_body(r#"{"vm":{"id":"123"}}"#)
            .create_async()
            .await;

        let mut connection = Connection::builder()
            .url(format!("{}/ovirt-engine/api", server.url()))
            .username("admin@internal")
            .password("secret")
            .header("Version", "4")
            .build()
            .unwrap();

        let (status, body) = connection.get_raw("vms/123").await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, br#"{"vm":{"id":"123"}}"#);
        get.assert_async().await;
    }

    #[tokio::test]
    async fn check_response_classifies_error_statuses() {
        let server = Server::new_async().await;
        let connection = connection_for(&server);

        assert!(connection.check_response(StatusCode::OK, b"").is_ok());
        let err = connection
            .check_response(StatusCode::NOT_FOUND, br#"{"fault":{"reason":"gone"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn join_path_appends_segments() {
        let base = Url::parse("https://engine.example.com/ovirt-engine/api").unwrap();
        let url = join_path(&base, "vms/123").unwrap();
        assert_eq!(url.path(), "/ovirt-engine/api/vms/123");

        let base_with_slash = Url::parse("https://engine.example.com/ovirt-engine/api/").unwrap();
        let url = join_path(&base_with_slash, "vms").unwrap();
        assert_eq!(url.path(), "/ovirt-engine/api/vms");
    }
}
