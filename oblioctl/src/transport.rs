//! Request dispatch for the Oblio REST API.
//!
//! Every call goes through [`Transport::send`]: encode the body, attach content
//! and auth headers, execute, and translate non-2xx responses into
//! [`OblioError::Service`].

use oblio_core::{encode, ContentKind, Credential, OblioError, Result, GENERIC_HTTP_ERROR};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Normalize a server URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Request payload and headers for a single call.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    pub content: ContentKind,
    /// Body payload; `None` sends an empty body
    pub body: Option<Value>,
    pub credential: Option<&'a Credential>,
}

impl<'a> Envelope<'a> {
    /// Form-encoded body without credentials.
    pub fn form(body: Value) -> Self {
        Self {
            content: ContentKind::Form,
            body: Some(body),
            credential: None,
        }
    }

    /// JSON body, or no body at all when `body` is `None`.
    pub fn json(body: Option<Value>) -> Self {
        Self {
            content: ContentKind::Json,
            body,
            credential: None,
        }
    }

    /// Attach a credential; the request will carry an `Authorization` header.
    pub fn with_credential(mut self, credential: &'a Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// Shared HTTP transport bound to one service origin.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    /// Create a transport for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be created.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("oblioctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OblioError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and return the raw body of a successful response.
    ///
    /// `path` is appended to the base URL as-is and may carry a query string.
    ///
    /// # Errors
    ///
    /// - [`OblioError::Encode`] if the body cannot be encoded
    /// - [`OblioError::Transport`] on connection, timeout or body read failures
    /// - [`OblioError::Service`] if the status is outside 200-299
    pub async fn send(&self, method: Method, path: &str, envelope: &Envelope<'_>) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, envelope.content.mime());

        if let Some(body) = &envelope.body {
            request = request.body(encode(envelope.content, body)?);
        }

        if let Some(credential) = envelope.credential {
            request = request.header(reqwest::header::AUTHORIZATION, credential.authorization());
        }

        debug!(%method, %url, content_type = %envelope.content, "sending request");

        let response = request
            .send()
            .await
            .map_err(|e| OblioError::Transport(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            OblioError::Transport(format!("Failed to read response body from {}: {}", url, e))
        })?;

        debug!(%method, %url, %status, bytes = body.len(), "received response");

        if !status.is_success() {
            let message = extract_status_message(&body);
            warn!(%method, %url, %status, %message, "service returned an error");
            return Err(OblioError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body.to_vec())
    }
}

/// Pull `statusMessage` out of an error body, falling back to a generic message.
fn extract_status_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("statusMessage")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_HTTP_ERROR.to_string())
}
