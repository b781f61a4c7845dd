//! SSO request construction and response normalisation.
//!
//! The engine's SSO endpoints take `application/x-www-form-urlencoded`
//! requests and answer with JSON that is not shaped consistently: a single
//! object on current engines, an array wrapping that object on older ones,
//! and an empty body on revocation. [`parse_response`] folds every accepted
//! shape into one [`SsoResponse`].

use reqwest::Url;
use serde::Deserialize;

use crate::credentials::Credentials;
use crate::error::Error;

/// Token-acquisition endpoint for the password grant.
const AUTH_PATH: &str = "/ovirt-engine/sso/oauth/token";

/// Token-acquisition endpoint for the negotiated (Kerberos) grant.
const AUTH_NEGOTIATE_PATH: &str = "/ovirt-engine/sso/oauth/token-http-auth";

/// Token-revocation endpoint.
const REVOKE_PATH: &str = "/ovirt-engine/services/sso-logout";

/// OAuth scope requested for every API session.
const SCOPE: &str = "ovirt-app-api";

/// Grant type identifying the negotiated flow.
const GRANT_TYPE_NEGOTIATE: &str = "urn:ovirt:params:oauth:grant-type:http";

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// A fully-built SSO request: target URL plus form parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SsoRequest {
    pub(crate) url: Url,
    pub(crate) form: Vec<(&'static str, String)>,
}

/// Build the token-acquisition request for the given credentials.
pub(crate) fn auth_request(base: &Url, credentials: &Credentials) -> SsoRequest {
    match credentials {
        Credentials::Password { username, password } => SsoRequest {
            url: at_path(base, AUTH_PATH),
            form: vec![
                ("grant_type", "password".to_string()),
                ("username", username.clone()),
                ("password", password.clone()),
                ("scope", SCOPE.to_string()),
            ],
        },
        Credentials::Kerberos => SsoRequest {
            url: at_path(base, AUTH_NEGOTIATE_PATH),
            form: vec![
                ("grant_type", GRANT_TYPE_NEGOTIATE.to_string()),
                ("scope", SCOPE.to_string()),
            ],
        },
    }
}

/// Build the token-revocation request.
pub(crate) fn revoke_request(base: &Url, token: &str) -> SsoRequest {
    SsoRequest {
        url: at_path(base, REVOKE_PATH),
        form: vec![("scope", String::new()), ("token", token.to_string())],
    }
}

/// SSO endpoints live at the host root, whatever path the API base carries.
fn at_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

// ---------------------------------------------------------------------------
// Response normalisation
// ---------------------------------------------------------------------------

/// Normalised SSO response: either a token, or an error code/description
/// pair, or neither (the empty success revocation answers with).
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct SsoResponse {
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) error_code: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

impl SsoResponse {
    fn is_empty(&self) -> bool {
        self.access_token.as_deref().unwrap_or("").is_empty()
            && self.error_code.as_deref().unwrap_or("").is_empty()
            && self.error.as_deref().unwrap_or("").is_empty()
    }
}

/// Fold the accepted response shapes into one [`SsoResponse`].
///
/// Tried in order: a single JSON object (kept when any recognised field is
/// non-empty), a JSON array wrapping such an object (first element taken),
/// and an empty or all-empty body. Anything else is a parse error, distinct
/// from an SSO-level error.
pub(crate) fn parse_response(body: &[u8]) -> Result<SsoResponse, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SsoResponse::default());
    }
    match serde_json::from_slice::<SsoResponse>(body) {
        Ok(single) if !single.is_empty() => Ok(single),
        Ok(_) => Ok(SsoResponse::default()),
        Err(object_err) => match serde_json::from_slice::<Vec<SsoResponse>>(body) {
            Ok(mut wrapped) => {
                if wrapped.is_empty() {
                    Ok(SsoResponse::default())
                } else {
                    Ok(wrapped.remove(0))
                }
            }
            Err(_) => Err(Error::generic(format!(
                "cannot parse SSO response: {object_err}"
            ))),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://engine.example.com/ovirt-engine/api").unwrap()
    }

    #[test]
    fn password_grant_targets_the_token_endpoint() {
        let credentials = Credentials::Password {
            username: "admin@internal".into(),
            password: "secret".into(),
        };
        let request = auth_request(&base(), &credentials);
        assert_eq!(request.url.path(), "/ovirt-engine/sso/oauth/token");
        assert!(request.form.contains(&("grant_type", "password".to_string())));
        assert!(request.form.contains(&("username", "admin@internal".to_string())));
        assert!(request.form.contains(&("password", "secret".to_string())));
        assert!(request.form.contains(&("scope", "ovirt-app-api".to_string())));
    }

    #[test]
    fn negotiated_grant_targets_the_http_auth_endpoint() {
        let request = auth_request(&base(), &Credentials::Kerberos);
        assert_eq!(request.url.path(), "/ovirt-engine/sso/oauth/token-http-auth");
        assert!(request.form.contains(&(
            "grant_type",
            "urn:ovirt:params:oauth:grant-type:http".to_string()
        )));
        assert!(request.form.contains(&("scope", "ovirt-app-api".to_string())));
        assert!(!request.form.iter().any(|(name, _)| *name == "username"));
    }

    #[test]
    fn revoke_targets_the_logout_endpoint() {
        let request = revoke_request(&base(), "tok-123");
        assert_eq!(request.url.path(), "/ovirt-engine/services/sso-logout");
        assert!(request.form.contains(&("scope", String::new())));
        assert!(request.form.contains(&("token", "tok-123".to_string())));
    }

    #[test]
    fn sso_urls_drop_query_and_fragment() {
        let base = Url::parse("https://engine.example.com/ovirt-engine/api?foo=1#frag").unwrap();
        let request = revoke_request(&base, "t");
        assert_eq!(request.url.query(), None);
        assert_eq!(request.url.fragment(), None);
    }

    #[test]
    fn object_and_array_shapes_normalise_identically() {
        let object = parse_response(br#"{"access_token":"T"}"#).unwrap();
        let array = parse_response(br#"[{"access_token":"T"}]"#).unwrap();
        assert_eq!(object, array);
        assert_eq!(object.access_token.as_deref(), Some("T"));
    }

    #[test]
    fn error_fields_survive_normalisation() {
        let response =
            parse_response(br#"{"error_code":"access_denied","error":"bad password"}"#).unwrap();
        assert_eq!(response.error_code.as_deref(), Some("access_denied"));
        assert_eq!(response.error.as_deref(), Some("bad password"));
        assert!(response.access_token.is_none());
    }

    #[test]
    fn empty_bodies_are_empty_successes() {
        // revocation answers with no body at all
        assert_eq!(parse_response(b"").unwrap(), SsoResponse::default());
        assert_eq!(parse_response(b"  \n").unwrap(), SsoResponse::default());
        // or with an object carrying nothing we recognise
        assert_eq!(parse_response(b"{}").unwrap(), SsoResponse::default());
        assert_eq!(
            parse_response(br#"{"access_token":""}"#).unwrap(),
            SsoResponse::default()
        );
    }

    #[test]
    fn unrecognisable_bodies_are_hard_parse_errors() {
        let err = parse_response(b"<html>proxy error</html>").unwrap_err();
        assert!(matches!(err, Error::Generic { .. }));
        assert!(err.to_string().contains("cannot parse SSO response"));

        let err = parse_response(br#""just a string""#).unwrap_err();
        assert!(matches!(err, Error::Generic { .. }));
    }
}
