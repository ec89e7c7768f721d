//! HTTP client for the Oblio invoicing API.

use oblio_core::{
    encode_query, Credential, Document, OblioError, Result, ServiceResponse, DEFAULT_BASE_URL,
};
use reqwest::Method;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::token::{TokenProvider, TokenSource};
use crate::transport::{Envelope, Transport};

/// Client for the Oblio REST API.
///
/// Every call obtains a bearer token from its [`TokenSource`] first; a token
/// failure aborts the call before any API request is made. Nothing is
/// retried.
///
/// # Examples
///
/// ```no_run
/// use oblio_core::{Client, Document, Product};
/// use oblioctl::client::OblioClient;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = OblioClient::new("me@example.com", "api-secret")?;
///
/// let doc = Document {
///     cif: "RO37311090".to_string(),
///     series_name: "FCT".to_string(),
///     client: Client { name: "Irina Fabiola".to_string(), ..Default::default() },
///     products: vec![Product { name: "Consultanta".to_string(), price: 100.0, quantity: 1.0, ..Default::default() }],
///     ..Default::default()
/// };
///
/// let response = client.create_document("invoice", &doc).await?;
/// println!("{}", response.status_message);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OblioClient {
    transport: Transport,
    tokens: Arc<dyn TokenSource>,
}

impl OblioClient {
    /// Create a client for the production service with a 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if either credential is empty or the HTTP client
    /// cannot be created.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, client_id, client_secret, 30)
    }

    /// Create a client with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service origin (e.g., "https://www.oblio.eu")
    /// * `client_id` - API client identifier (the account e-mail)
    /// * `client_secret` - API secret from the account settings
    /// * `timeout_secs` - Request timeout in seconds
    pub fn with_config(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let transport = Transport::new(base_url, timeout_secs)?;
        let tokens = TokenProvider::new(transport.clone(), client_id, client_secret)?;
        Ok(Self::with_token_source(transport, Arc::new(tokens)))
    }

    /// Create a client that takes its tokens from `tokens`.
    pub fn with_token_source(transport: Transport, tokens: Arc<dyn TokenSource>) -> Self {
        Self { transport, tokens }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Obtain a fresh credential, exchanging client credentials if needed.
    pub async fn access_token(&self) -> Result<Credential> {
        self.tokens.obtain().await
    }

    /// Issue a document of the given kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - Document kind path segment (`invoice`, `proforma`, `notice`)
    /// * `doc` - Document to create
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The kind is empty
    /// - No token can be obtained
    /// - The service rejects the document
    /// - The response is not a valid envelope
    pub async fn create_document(&self, kind: &str, doc: &Document) -> Result<ServiceResponse> {
        let kind = non_empty(kind, "Document kind")?;
        let credential = self.tokens.obtain().await?;

        let path = format!("/api/docs/{}", urlencoding::encode(kind));
        let body = serde_json::to_value(doc).map_err(|e| OblioError::Encode(e.to_string()))?;
        let envelope = Envelope::json(Some(body)).with_credential(&credential);

        debug!(kind, products = doc.products.len(), "creating document");
        let raw = self.transport.send(Method::POST, &path, &envelope).await?;
        ServiceResponse::from_slice(&raw)
    }

    /// List reference data of the given kind.
    ///
    /// Filters are sent as the query string in key order; an empty map sends
    /// no query at all.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The kind is empty
    /// - No token can be obtained
    /// - The service rejects the lookup
    /// - The response is not a valid envelope
    pub async fn list_nomenclature(
        &self,
        kind: &str,
        filters: &BTreeMap<String, String>,
    ) -> Result<ServiceResponse> {
        let kind = non_empty(kind, "Nomenclature kind")?;
        let credential = self.tokens.obtain().await?;

        let mut path = format!("/api/nomenclature/{}", urlencoding::encode(kind));
        if !filters.is_empty() {
            path.push('?');
            path.push_str(&encode_query(filters)?);
        }

        let envelope = Envelope::json(None).with_credential(&credential);
        let raw = self.transport.send(Method::GET, &path, &envelope).await?;
        ServiceResponse::from_slice(&raw)
    }
}

impl std::fmt::Debug for OblioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OblioClient")
            .field("base_url", &self.transport.base_url())
            .finish_non_exhaustive()
    }
}

fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(OblioError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(value)
}
