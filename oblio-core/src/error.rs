//! Error types for the Oblio client

use thiserror::Error;

/// Message used when a failed response carries no `statusMessage`.
pub const GENERIC_HTTP_ERROR: &str = "Http error";

/// Core error type for Oblio operations
#[derive(Error, Debug)]
pub enum OblioError {
    /// Request construction or network failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response; displays the service's own message verbatim
    #[error("{message}")]
    Service { status: u16, message: String },

    /// Response body could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request payload could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OblioError {
    /// HTTP status of a service error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            OblioError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Oblio operations
pub type Result<T> = std::result::Result<T, OblioError>;

impl From<serde_json::Error> for OblioError {
    fn from(err: serde_json::Error) -> Self {
        OblioError::Decode(err.to_string())
    }
}
