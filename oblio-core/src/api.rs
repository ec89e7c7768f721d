//! Wire models for the Oblio REST API
//!
//! Every endpoint except the token exchange answers with the same
//! `{status, statusMessage, data}` envelope.

use crate::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform response envelope returned by document and nomenclature calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    /// Status code reported by the service (mirrors the HTTP status)
    #[serde(default, deserialize_with = "lenient::de_i64")]
    pub status: i64,
    /// Human-readable status message
    #[serde(
        rename = "statusMessage",
        default,
        deserialize_with = "lenient::de_string"
    )]
    pub status_message: String,
    /// Endpoint-specific payload
    #[serde(default)]
    pub data: Value,
}

impl ServiceResponse {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Rows of `data` when it is an array, otherwise an empty slice.
    pub fn rows(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Body of `POST /api/authorize/token`
///
/// Numeric fields arrive as strings or numbers depending on the server build;
/// missing fields decode to zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "lenient::de_string")]
    pub access_token: String,
    /// Validity window in seconds
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub expires_in: u64,
    #[serde(default, deserialize_with = "lenient::de_string")]
    pub token_type: String,
    #[serde(default, deserialize_with = "lenient::de_string")]
    pub scope: String,
    /// UNIX seconds at which the token was issued
    #[serde(default, deserialize_with = "lenient::de_u64")]
    pub request_time: u64,
}
