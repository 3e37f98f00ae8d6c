//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line client for the shared tanksync collections.
///
/// Global options choose the stores; subcommands read and write records.
#[derive(Parser)]
#[command(name = "tanksync")]
#[command(about = "Read, write and follow the shared tanksync collections")]
#[command(version)]
pub struct Cli {
    /// Shared document store (`sqlite:` URL)
    #[arg(long = "remote-url", env = "TANKSYNC_REMOTE_URL", global = true)]
    pub remote_url: Option<String>,

    /// This client's local fallback database file
    #[arg(long = "local-db", env = "TANKSYNC_LOCAL_DB", global = true)]
    pub local_db: Option<PathBuf>,

    /// Skip the shared store and use the local one only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
