//! Mock oVirt engine for local development.
//!
//! Emulates the slice of an engine the SDK core talks to: the SSO token
//! and logout endpoints, the API entry point used by session probes, and a
//! couple of resource endpoints with link-carrying payloads. Tokens are
//! random and kept in memory; restarting the mock invalidates every
//! session, which is handy for exercising stale-token self-healing.
//!
//! Credentials and port come from the environment:
//!
//! | Variable               | Default          |
//! |------------------------|------------------|
//! | `MOCK_ENGINE_PORT`     | `8080`           |
//! | `MOCK_ENGINE_USER`     | `admin@internal` |
//! | `MOCK_ENGINE_PASSWORD` | `secret`         |

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use ovirt_models::{Vm, VmList};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// State shared across all handlers.
struct EngineState {
    /// The one account the mock accepts.
    username: String,
    password: String,
    /// Tokens issued since startup and not yet revoked.
    tokens: Mutex<HashSet<String>>,
}

impl EngineState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let bearer = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        match bearer {
            Some(token) => self.tokens.lock().unwrap().contains(token),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// SSO endpoints
// ---------------------------------------------------------------------------

/// Body of `POST /ovirt-engine/sso/oauth/token`.
#[derive(Deserialize)]
struct TokenRequest {
    grant_type: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

fn sso_error(status: StatusCode, code: &str, description: &str) -> Response {
    (
        status,
        Json(json!({ "error_code": code, "error": description })),
    )
        .into_response()
}

/// `POST /ovirt-engine/sso/oauth/token` — password grant.
async fn token(
    State(state): State<Arc<EngineState>>,
    Form(request): Form<TokenRequest>,
) -> Response {
    if request.grant_type != "password" {
        return sso_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "only the password grant is supported here",
        );
    }
    if request.scope.as_deref() != Some("ovirt-app-api") {
        return sso_error(
            StatusCode::BAD_REQUEST,
            "invalid_scope",
            "scope must be ovirt-app-api",
        );
    }
    let credentials_match = request.username.as_deref() == Some(state.username.as_str())
        && request.password.as_deref() == Some(state.password.as_str());
    if !credentials_match {
        info!(user = ?request.username, "rejecting token request");
        return sso_error(
            StatusCode::BAD_REQUEST,
            "access_denied",
            "cannot authenticate user: invalid username or password",
        );
    }

    let token = Uuid::new_v4().to_string();
    state.tokens.lock().unwrap().insert(token.clone());
    info!(user = %state.username, "token issued");
    Json(json!({ "access_token": token })).into_response()
}

/// `POST /ovirt-engine/sso/oauth/token-http-auth` — negotiated grant.
///
/// The mock has no SPNEGO support, so this always refuses, the same way an
/// engine without Kerberos configured does.
async fn token_http_auth() -> Response {
    sso_error(
        StatusCode::UNAUTHORIZED,
        "access_denied",
        "negotiated authentication is not configured",
    )
}

/// Body of `POST /ovirt-engine/services/sso-logout`.
#[derive(Deserialize)]
struct LogoutRequest {
    #[serde(default)]
    token: Option<String>,
}

/// `POST /ovirt-engine/services/sso-logout` — revoke a token.
///
/// Succeeds with an empty body either way; revoking an unknown token is
/// not an error.
async fn sso_logout(
    State(state): State<Arc<EngineState>>,
    Form(request): Form<LogoutRequest>,
) -> Response {
    if let Some(token) = request.token {
        let removed = state.tokens.lock().unwrap().remove(&token);
        info!(removed, "logout request");
    }
    StatusCode::OK.into_response()
}

// ---------------------------------------------------------------------------
// API endpoints
// ---------------------------------------------------------------------------

fn fault_response(status: StatusCode, reason: &str, detail: &str) -> Response {
    (
        status,
        Json(json!({ "fault": { "reason": reason, "detail": detail } })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    fault_response(
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        "access token is missing, expired or revoked",
    )
}

fn sample_vms() -> Vec<Vm> {
    vec![
        Vm {
            id: Some("123".into()),
            name: Some("web-01".into()),
            href: Some("/ovirt-engine/api/vms/123".into()),
            status: Some("up".into()),
        },
        Vm {
            id: Some("456".into()),
            name: Some("db-01".into()),
            href: Some("/ovirt-engine/api/vms/456".into()),
            status: Some("down".into()),
        },
    ]
}

/// `GET /ovirt-engine/api` — the entry point session probes target.
async fn api_root(State(state): State<Arc<EngineState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "product_info": {
            "name": "oVirt Engine (mock)",
            "version": { "major": 4, "minor": 5 }
        }
    }))
    .into_response()
}

/// `GET /ovirt-engine/api/vms` — the VM collection.
async fn list_vms(State(state): State<Arc<EngineState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let list = VmList {
        href: Some("/ovirt-engine/api/vms".into()),
        vms: sample_vms(),
    };
    Json(serde_json::to_value(&list).expect("serialisable list")).into_response()
}

/// `GET /ovirt-engine/api/vms/{id}` — a single VM.
async fn get_vm(
    State(state): State<Arc<EngineState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    match sample_vms().into_iter().find(|vm| vm.id.as_deref() == Some(id.as_str())) {
        Some(vm) => Json(serde_json::to_value(&vm).expect("serialisable vm")).into_response(),
        None => fault_response(
            StatusCode::NOT_FOUND,
            "Operation Failed",
            "entity not found",
        ),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("MOCK_ENGINE_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080);
    let username =
        std::env::var("MOCK_ENGINE_USER").unwrap_or_else(|_| "admin@internal".to_string());
    let password = std::env::var("MOCK_ENGINE_PASSWORD").unwrap_or_else(|_| "secret".to_string());

    let state = Arc::new(EngineState {
        username,
        password,
        tokens: Mutex::new(HashSet::new()),
    });

    let app = Router::new()
        .route("/ovirt-engine/sso/oauth/token", post(token))
        .route("/ovirt-engine/sso/oauth/token-http-auth", post(token_http_auth))
        .route("/ovirt-engine/services/sso-logout", post(sso_logout))
        .route("/ovirt-engine/api", get(api_root))
        .route("/ovirt-engine/api/vms", get(list_vms))
        .route("/ovirt-engine/api/vms/{id}", get(get_vm))
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");

    info!(address = %addr, "mock engine listening");
    axum::serve(listener, app).await.expect("server error");
}
