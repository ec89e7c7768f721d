//! Command-line interface for the Oblio client
//!
//! - [`commands`] - clap definitions for commands, flags and filter parsing
//! - [`handlers`] - Command execution, document loading and the sample invoice

mod commands;
mod handlers;

pub use commands::*;
pub use handlers::*;
