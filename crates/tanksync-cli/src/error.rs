//! CLI-specific error types and mappings.
//!
//! Maps sync-layer errors to exit codes and user-facing messages.

use tanksync_core::{SettingsError, SyncError, UnknownCollection};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Both stores failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A data source could not be read.
    #[error("Source error: {0}")]
    Source(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions (see sysexits.h).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Storage(_) => 74,  // EX_IOERR
            Self::Source(_) => 69,   // EX_UNAVAILABLE
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Persist { .. } => Self::Storage(err.to_string()),
            SyncError::Validation(msg) => Self::Arguments(msg),
            SyncError::Source(source) => Self::Source(source.to_string()),
        }
    }
}

impl From<UnknownCollection> for CliError {
    fn from(err: UnknownCollection) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_usage_errors() {
        let err = CliError::from(SyncError::Validation("remark text is empty".into()));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_collection_is_an_argument_error() {
        let err: CliError = "nope".parse::<tanksync_core::Collection>().unwrap_err().into();
        assert!(matches!(err, CliError::Arguments(_)));
    }
}
