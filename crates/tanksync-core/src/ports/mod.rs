//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the sync core expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - Stores speak in [`Document`]s; typed records are decoded in the core
//! - Backend failures are values (`StoreError`), never panics

pub mod durable_store;
pub mod event_emitter;
pub mod feed_source;
pub mod ledger;
pub mod speech;

use thiserror::Error;

use crate::collections::Collection;

pub use durable_store::{Document, DurableStore, StoreBackend, decode_document, decode_documents};
pub use event_emitter::{ChannelEmitter, NoopEmitter, SyncEventEmitter};
pub use feed_source::{FeedKind, FeedSource, SourceError};
pub use ledger::SpokenLedgerPort;
pub use speech::{SpeechPort, SpeechPortError};

/// Errors raised by a durable store backend.
///
/// This error type abstracts away storage implementation details (e.g. sqlx
/// errors). The sync facade absorbs every variant by falling back to the
/// local store; none of them reach end users.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is unreachable (never initialised, offline, closed).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected a write.
    #[error("Write to {collection} failed: {reason}")]
    WriteFailed {
        collection: Collection,
        reason: String,
    },

    /// Opening a change subscription failed.
    #[error("Subscription to {collection} failed: {reason}")]
    Subscription {
        collection: Collection,
        reason: String,
    },

    /// A stored or ingested record is missing a required field.
    #[error("Malformed record in {collection}: {reason}")]
    MalformedRecord {
        collection: Collection,
        reason: String,
    },

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn write_failed(collection: Collection, reason: impl ToString) -> Self {
        Self::WriteFailed {
            collection,
            reason: reason.to_string(),
        }
    }

    pub fn malformed(collection: Collection, reason: impl ToString) -> Self {
        Self::MalformedRecord {
            collection,
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Errors surfaced by the sync facade.
///
/// Remote failures never appear here: they are absorbed by the local
/// fallback. Only the failure of every store, or invalid input, is reported.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Neither the remote nor the local store accepted the operation.
    #[error("Could not persist {collection}: {source}")]
    Persist {
        collection: Collection,
        #[source]
        source: StoreError,
    },

    /// The caller supplied an invalid record.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A data source failed to deliver records.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl SyncError {
    pub const fn persist(collection: Collection, source: StoreError) -> Self {
        Self::Persist { collection, source }
    }
}
