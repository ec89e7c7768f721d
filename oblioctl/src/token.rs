//! Bearer token acquisition and caching.

use async_trait::async_trait;
use oblio_core::{Credential, OblioError, Result};
use reqwest::Method;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::transport::{Envelope, Transport};

/// Path of the client-credentials token endpoint.
pub const TOKEN_PATH: &str = "/api/authorize/token";

/// Seconds before expiry at which a cached token is treated as stale.
pub const DEFAULT_EXPIRY_MARGIN_SECS: u64 = 60;

/// Source of bearer credentials for API calls.
///
/// Implemented by [`TokenProvider`]; tests substitute their own.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a credential that is fresh right now.
    async fn obtain(&self) -> Result<Credential>;
}

/// Current UNIX time in seconds.
pub(crate) fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Client-credentials token provider with a single cached credential.
///
/// The cache is held behind an async mutex for the duration of a refresh, so
/// concurrent callers trigger at most one exchange.
pub struct TokenProvider {
    transport: Transport,
    client_id: String,
    client_secret: String,
    expiry_margin_secs: u64,
    credential: Mutex<Option<Credential>>,
}

impl TokenProvider {
    /// Create a provider that exchanges `client_id`/`client_secret` over `transport`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either credential is empty.
    pub fn new(
        transport: Transport,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(OblioError::Config("client_id is not set".to_string()));
        }
        if client_secret.trim().is_empty() {
            return Err(OblioError::Config("client_secret is not set".to_string()));
        }

        Ok(Self {
            transport,
            client_id,
            client_secret,
            expiry_margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
            credential: Mutex::new(None),
        })
    }

    /// Override how long before expiry a cached token is refreshed.
    pub fn with_expiry_margin(mut self, secs: u64) -> Self {
        self.expiry_margin_secs = secs;
        self
    }

    /// Copy of the currently held credential, fresh or not.
    pub async fn cached(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }

    /// Drop the held credential so the next call performs an exchange.
    pub async fn invalidate(&self) {
        self.credential.lock().await.take();
    }

    /// Perform the client-credentials exchange.
    async fn exchange(&self) -> Result<Credential> {
        let envelope = Envelope::form(json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
        }));

        let body = self.transport.send(Method::POST, TOKEN_PATH, &envelope).await?;
        Credential::from_slice(&body, unix_now())
    }
}

#[async_trait]
impl TokenSource for TokenProvider {
    async fn obtain(&self) -> Result<Credential> {
        let mut held = self.credential.lock().await;

        if let Some(credential) = held.as_ref() {
            if credential.is_fresh_at(unix_now(), self.expiry_margin_secs) {
                return Ok(credential.clone());
            }
            debug!(expires_at = credential.expires_at(), "cached token is stale");
        }

        // On failure the held credential is left as it was
        let credential = self.exchange().await?;
        info!(
            token_type = %credential.token_type,
            expires_in = credential.expires_in,
            "obtained new access token"
        );

        *held = Some(credential.clone());
        Ok(credential)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("base_url", &self.transport.base_url())
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .field("expiry_margin_secs", &self.expiry_margin_secs)
            .finish()
    }
}
