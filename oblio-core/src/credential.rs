//! Bearer credential and its freshness rule

use crate::api::TokenResponse;
use crate::error::{OblioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token type assumed when the service leaves `token_type` empty.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Validity window assumed when the service reports no `expires_in`.
pub const DEFAULT_LIFETIME_SECS: u64 = 3600;

/// A bearer credential obtained from the token endpoint.
///
/// A credential is fresh while `now < request_time + lifetime - margin`,
/// where the margin never exceeds half the lifetime. Stale credentials are
/// replaced, never reused.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    /// Validity window in seconds
    pub expires_in: u64,
    /// UNIX seconds at which the token was issued
    pub request_time: u64,
}

impl Credential {
    /// Build a credential from a decoded token response.
    ///
    /// `received_at` stands in for the issue time when the service did not
    /// report one.
    pub fn from_response(response: TokenResponse, received_at: u64) -> Self {
        let request_time = if response.request_time == 0 {
            received_at
        } else {
            response.request_time
        };

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            scope: response.scope,
            expires_in: response.expires_in,
            request_time,
        }
    }

    /// Decode the raw token endpoint body.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the body is not a JSON object or carries no
    /// access token.
    pub fn from_slice(body: &[u8], received_at: u64) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(OblioError::Decode(
                "token response is not a JSON object".to_string(),
            ));
        }

        let response: TokenResponse = serde_json::from_value(value)?;
        if response.access_token.trim().is_empty() {
            return Err(OblioError::Decode(
                "token response has no access_token".to_string(),
            ));
        }

        Ok(Self::from_response(response, received_at))
    }

    /// Validity window in seconds; [`DEFAULT_LIFETIME_SECS`] when unreported.
    pub fn lifetime(&self) -> u64 {
        if self.expires_in == 0 {
            DEFAULT_LIFETIME_SECS
        } else {
            self.expires_in
        }
    }

    /// UNIX second at which the credential stops being valid.
    pub fn expires_at(&self) -> u64 {
        self.request_time.saturating_add(self.lifetime())
    }

    /// Whether the credential can still be presented at `now`.
    ///
    /// `margin_secs` is subtracted from the validity window so a token is not
    /// sent moments before it expires. It is capped at half the lifetime, so
    /// short-lived tokens stay usable for a while after issue.
    pub fn is_fresh_at(&self, now: u64, margin_secs: u64) -> bool {
        let margin = margin_secs.min(self.lifetime() / 2);
        !self.access_token.is_empty() && self.expires_at().saturating_sub(margin) > now
    }

    /// Seconds left until expiry at `now`.
    pub fn remaining_secs(&self, now: u64) -> u64 {
        self.expires_at().saturating_sub(now)
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        let kind = if self.token_type.is_empty() {
            DEFAULT_TOKEN_TYPE
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", kind, self.access_token)
    }

    /// Access token with everything but the first few characters hidden.
    pub fn masked_token(&self) -> String {
        mask(&self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &self.masked_token())
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("request_time", &self.request_time)
            .finish()
    }
}

/// Hide a secret, keeping at most four leading characters.
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    if visible.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
