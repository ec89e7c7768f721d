//! Oblio client library
//!
//! Async client for the Oblio invoicing API, plus the internals of the
//! `oblioctl` command-line tool.
//!
//! # Public API
//!
//! The primary public API is [`client::OblioClient`], which issues documents
//! and lists nomenclature data. Tokens are obtained and cached by
//! [`token::TokenProvider`]; every request goes through
//! [`transport::Transport`].
//!
//! ```no_run
//! use oblioctl::client::OblioClient;
//! use std::collections::BTreeMap;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = OblioClient::new("me@example.com", "api-secret")?;
//!
//! let companies = client.list_nomenclature("companies", &BTreeMap::new()).await?;
//! for company in companies.rows() {
//!     println!("{}", company["company"]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `TokenProvider` serialises refreshes behind an async mutex, so a single
//! client can be shared between tasks.

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// API facade: document creation and nomenclature lookups.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

/// Bearer token acquisition and caching.
pub mod token;

/// Request dispatch and error translation.
pub mod transport;

#[cfg(test)]
pub mod test_utils;
