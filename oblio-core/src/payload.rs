//! Request body encoding
//!
//! Turns a logical payload into bytes according to the declared content kind.

use crate::error::{OblioError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Content type of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/x-www-form-urlencoded`
    Form,
    /// `application/json`
    Json,
}

impl ContentKind {
    /// MIME type sent in the `Content-Type` header.
    pub fn mime(&self) -> &'static str {
        match self {
            ContentKind::Form => "application/x-www-form-urlencoded",
            ContentKind::Json => "application/json",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Encode `data` as a request body.
///
/// Form bodies require a flat object of string values; keys come out sorted.
/// Every other payload is encoded as JSON unchanged.
///
/// # Errors
///
/// Returns [`OblioError::Encode`] if a form payload is not an object, or if
/// any of its values is not a string.
pub fn encode(kind: ContentKind, data: &Value) -> Result<Vec<u8>> {
    match kind {
        ContentKind::Form => {
            let object = data.as_object().ok_or_else(|| {
                OblioError::Encode("form payload must be a JSON object".to_string())
            })?;

            let mut pairs = Vec::with_capacity(object.len());
            for (key, value) in object {
                let value = value.as_str().ok_or_else(|| {
                    OblioError::Encode(format!("form field '{}' must be a string", key))
                })?;
                pairs.push((key.as_str(), value));
            }
            pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

            serde_urlencoded::to_string(pairs)
                .map(String::into_bytes)
                .map_err(|e| OblioError::Encode(e.to_string()))
        }
        ContentKind::Json => {
            serde_json::to_vec(data).map_err(|e| OblioError::Encode(e.to_string()))
        }
    }
}

/// Url-encode a flat map of filters for use as a query string.
///
/// Iteration order of the map is preserved, so pass a `BTreeMap` for a
/// deterministic query.
pub fn encode_query<T: Serialize + ?Sized>(filters: &T) -> Result<String> {
    serde_urlencoded::to_string(filters).map_err(|e| OblioError::Encode(e.to_string()))
}
