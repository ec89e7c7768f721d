//! Test utilities for client testing
//!
//! Provides a mock Oblio server that issues tokens, checks bearer auth, and
//! records what it receives.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::token::unix_now;

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    /// Client id accepted by the token endpoint
    pub client_id: String,
    /// Client secret accepted by the token endpoint
    pub client_secret: String,
    /// Validity window reported for issued tokens; 0 leaves the field out
    pub expires_in: u64,
    token_requests: Arc<AtomicUsize>,
    /// Offset of `request_time` from now; `None` omits the field
    issued_offset: Arc<Mutex<Option<i64>>>,
    valid_tokens: Arc<Mutex<HashSet<String>>>,
    token_failure: Arc<Mutex<Option<(u16, String)>>>,
    nomenclature_failure: Arc<Mutex<Option<(u16, String)>>>,
    last_authorization: Arc<Mutex<Option<String>>>,
    last_content_type: Arc<Mutex<Option<String>>>,
    documents: Arc<Mutex<Vec<(String, Value)>>>,
    nomenclature_queries: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        Self {
            client_id: "mock@example.com".to_string(),
            client_secret: "mock-secret".to_string(),
            expires_in: 3600,
            token_requests: Arc::new(AtomicUsize::new(0)),
            issued_offset: Arc::new(Mutex::new(Some(0))),
            valid_tokens: Arc::new(Mutex::new(HashSet::new())),
            token_failure: Arc::new(Mutex::new(None)),
            nomenclature_failure: Arc::new(Mutex::new(None)),
            last_authorization: Arc::new(Mutex::new(None)),
            last_content_type: Arc::new(Mutex::new(None)),
            documents: Arc::new(Mutex::new(Vec::new())),
            nomenclature_queries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockServerState {
    /// Number of requests that reached the token endpoint
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    /// Report `request_time` as now plus `offset` seconds
    pub fn set_issued_offset(&self, offset: i64) {
        *self.issued_offset.lock().unwrap() = Some(offset);
    }

    /// Leave `request_time` out of token responses
    pub fn omit_request_time(&self) {
        *self.issued_offset.lock().unwrap() = None;
    }

    /// Accept `token` as a valid bearer token without an exchange
    pub fn accept_token(&self, token: &str) {
        self.valid_tokens.lock().unwrap().insert(token.to_string());
    }

    /// Make the token endpoint answer with `status` and `body`
    pub fn fail_token(&self, status: u16, body: &str) {
        *self.token_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Make the nomenclature endpoint answer with `status` and `body`
    pub fn fail_nomenclature(&self, status: u16, body: &str) {
        *self.nomenclature_failure.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.last_content_type.lock().unwrap().clone()
    }

    /// Documents received so far, as `(kind, body)`
    pub fn documents(&self) -> Vec<(String, Value)> {
        self.documents.lock().unwrap().clone()
    }

    /// Nomenclature lookups received so far, as `(kind, query)`
    pub fn nomenclature_queries(&self) -> Vec<(String, HashMap<String, String>)> {
        self.nomenclature_queries.lock().unwrap().clone()
    }

    fn record_headers(&self, headers: &HeaderMap) {
        let read = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        *self.last_authorization.lock().unwrap() = read(header::AUTHORIZATION);
        *self.last_content_type.lock().unwrap() = read(header::CONTENT_TYPE);
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(value) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };
        match value.strip_prefix("Bearer ") {
            Some(token) => self.valid_tokens.lock().unwrap().contains(token),
            None => false,
        }
    }
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Report `secs` as the validity window of issued tokens
    pub fn with_expires_in(mut self, secs: u64) -> Self {
        self.state.expires_in = secs;
        self
    }

    /// Start the mock server and return the address
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
        }

        Ok((self, server_url))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    /// Create the mock server router
    fn create_router(&self) -> Router {
        Router::new()
            .route("/api/authorize/token", post(token_handler))
            .route("/api/docs/:kind", post(create_document_handler))
            .route("/api/nomenclature/:kind", get(nomenclature_handler))
            .with_state(self.state.clone())
    }
}

fn raw_response(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, body).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"status": status.as_u16(), "statusMessage": message, "data": []})),
    )
        .into_response()
}

// Handler functions

async fn token_handler(
    State(state): State<MockServerState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let n = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    if let Some((status, body)) = state.token_failure.lock().unwrap().clone() {
        return raw_response(status, body);
    }

    let id_ok = params.get("client_id") == Some(&state.client_id);
    let secret_ok = params.get("client_secret") == Some(&state.client_secret);
    if !id_ok || !secret_ok {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid client credentials");
    }

    let token = format!("mock-token-{}", n);
    state.accept_token(&token);

    let mut body = json!({
        "access_token": token,
        "token_type": "Bearer",
        "scope": null,
    });
    if state.expires_in > 0 {
        body["expires_in"] = json!(state.expires_in.to_string());
    }
    if let Some(offset) = *state.issued_offset.lock().unwrap() {
        body["request_time"] = json!(unix_now() as i64 + offset);
    }

    Json(body).into_response()
}

async fn create_document_handler(
    Path(kind): Path<String>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> Response {
    state.record_headers(&headers);

    if !state.is_authorized(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid access token");
    }
    if !matches!(kind.as_str(), "invoice" | "proforma" | "notice") {
        return error_response(StatusCode::BAD_REQUEST, "Invalid document type");
    }

    let series = document
        .get("seriesName")
        .and_then(Value::as_str)
        .unwrap_or("FCT")
        .to_string();
    state.documents.lock().unwrap().push((kind, document));

    Json(json!({
        "status": 200,
        "statusMessage": "Success",
        "data": {
            "seriesName": series,
            "number": "0001",
            "link": "https://www.oblio.eu/utile/descarca-factura/mock"
        }
    }))
    .into_response()
}

async fn nomenclature_handler(
    Path(kind): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Response {
    state.record_headers(&headers);

    if let Some((status, body)) = state.nomenclature_failure.lock().unwrap().clone() {
        return raw_response(status, body);
    }
    if !state.is_authorized(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let data = match kind.as_str() {
        "companies" => json!([
            {"cif": "RO37311090", "company": "Mock Company SRL", "userTypeAccess": "admin", "useStock": false}
        ]),
        _ => json!([
            {"name": format!("Mock {}", kind), "code": "M1", "cif": query.get("cif")},
            {"name": format!("Mock {} 2", kind), "code": "M2", "cif": query.get("cif")}
        ]),
    };
    state
        .nomenclature_queries
        .lock()
        .unwrap()
        .push((kind, query));

    Json(json!({"status": 200, "statusMessage": "Success", "data": data})).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_startup() {
        let server = MockServer::new();
        let (server, url) = server.start().await.unwrap();

        assert!(server.port() > 0);
        assert!(url.contains(&server.port().to_string()));
    }

    #[tokio::test]
    async fn test_token_endpoint_issues_tokens() {
        let (server, url) = MockServer::new().start().await.unwrap();

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/api/authorize/token", url))
            .header(header::CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            .body("client_id=mock%40example.com&client_secret=mock-secret")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["access_token"], "mock-token-1");
        assert_eq!(body["expires_in"], "3600");
        assert_eq!(server.state().token_requests(), 1);
    }

    #[tokio::test]
    async fn test_nomenclature_requires_bearer_token() {
        let (_server, url) = MockServer::new().start().await.unwrap();

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/api/nomenclature/companies", url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["statusMessage"], "Invalid access token");
    }
}
