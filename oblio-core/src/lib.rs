//! Oblio Core Library
//!
//! Shared types, wire models, and encoding helpers for the Oblio invoicing API.
//! This crate performs no I/O; the HTTP client lives in `oblioctl`.

pub mod api;
pub mod credential;
pub mod error;
pub mod lenient;
pub mod payload;
pub mod types;

// Re-export commonly used types
pub use api::{ServiceResponse, TokenResponse};
pub use credential::Credential;
pub use error::*;
pub use payload::{encode, encode_query, ContentKind};
pub use types::*;

/// Production origin of the Oblio API.
pub const DEFAULT_BASE_URL: &str = "https://www.oblio.eu";
