//! Command-line client for the tanksync shared collections.
//!
//! `bootstrap` is the composition root; `handlers` are thin wrappers over
//! the sync facade; `presentation` formats records for the terminal.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod speaker;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
pub use speaker::ConsoleSpeaker;
