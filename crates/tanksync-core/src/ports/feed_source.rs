//! Data source port for ingest.
//!
//! Sources return raw JSON records; normalization into domain records happens
//! in the ingest service. Retries and rate limits are the source's concern.

use async_trait::async_trait;
use thiserror::Error;

/// Which domain records a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// News items (title, source, content, url, publishedAt).
    News,
    /// Token quotes forming a full market snapshot.
    Market,
    /// Knowledge entries, stored as auto-generated.
    Knowledge,
}

/// Errors a data source may report.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source {source_name} unreachable: {reason}")]
    Unreachable { source_name: String, reason: String },

    #[error("Source {source_name} returned an invalid payload: {reason}")]
    InvalidPayload { source_name: String, reason: String },
}

/// A collaborator that fetches raw records from a third-party API.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short name, used as the default `source` of normalized records.
    fn name(&self) -> &str;

    fn kind(&self) -> FeedKind;

    /// Fetch the current batch of raw records.
    async fn fetch(&self) -> Result<Vec<serde_json::Value>, SourceError>;
}
