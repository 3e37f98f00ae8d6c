//! Durable store trait definition.
//!
//! A durable store persists [`Document`]s in named collections and pushes a
//! full snapshot of a collection to every subscriber after each successful
//! mutation. Two adapters exist: a shared remote document store and a
//! per-client local key-value store. Call sites depend only on this trait.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::collections::Collection;
use crate::domain::Record;
use crate::subscription::Subscription;

/// A stored document: a record's JSON body plus its id and ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    /// Epoch milliseconds; documents are listed in ascending order.
    pub created_at: i64,
    pub data: serde_json::Value,
}

impl Document {
    /// Encode a record.
    pub fn from_record<T: Record>(record: &T) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.id().to_string(),
            created_at: record.timestamp(),
            data: serde_json::to_value(record)?,
        })
    }

    /// Decode the document into a record of type `T`.
    pub fn decode<T: Record>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| StoreError::malformed(T::COLLECTION, format!("{}: {e}", self.id)))
    }
}

/// Which adapter a store is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Shared by every client.
    Remote,
    /// Private to this client.
    Local,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// Uniform access to a collection-oriented store.
///
/// # Contract
///
/// - `init` is idempotent and caches its result.
/// - `write` to a singleton collection replaces the document (its id is
///   forced to [`SINGLETON_KEY`](crate::collections::SINGLETON_KEY)); to an
///   append collection it inserts according to the collection's
///   [`WritePolicy`](crate::collections::WritePolicy).
/// - Every mutation that changes a collection publishes the new snapshot to
///   all subscribers, the writer's own subscriptions included.
/// - The first delivery on a fresh subscription is the current snapshot.
#[async_trait]
pub trait DurableStore: Send + Sync {
    fn backend(&self) -> StoreBackend;

    /// Prepare the store. Returns whether it is ready.
    async fn init(&self) -> bool;

    /// Whether the store initialised successfully and is reachable.
    fn is_available(&self) -> bool;

    async fn write(&self, collection: Collection, document: Document) -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// All documents of a collection, oldest first.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Delete documents by id. Returns how many were removed.
    async fn delete(&self, collection: Collection, ids: &[String]) -> Result<usize, StoreError>;

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError>;
}

/// Decode a single document, logging and discarding it when malformed.
pub fn decode_document<T: Record>(document: &Document) -> Option<T> {
    match document.decode::<T>() {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(collection = %T::COLLECTION, error = %e, "Dropping malformed record");
            None
        }
    }
}

/// Decode a snapshot, dropping malformed documents.
pub fn decode_documents<T: Record>(documents: &[Document]) -> Vec<T> {
    documents.iter().filter_map(decode_document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewsItem, Remark};

    #[test]
    fn document_round_trip_keeps_identity() {
        let mut remark = Remark::new("hello", "test");
        remark.id = "r1".to_string();
        remark.created_at = 7;

        let doc = Document::from_record(&remark).unwrap();
        assert_eq!(doc.id, "r1");
        assert_eq!(doc.created_at, 7);
        assert_eq!(doc.decode::<Remark>().unwrap(), remark);
    }

    #[test]
    fn malformed_documents_are_dropped() {
        let good = Document::from_record(&NewsItem::new("t", "s")).unwrap();
        let bad = Document {
            id: "broken".to_string(),
            created_at: 0,
            data: serde_json::json!({ "content": "no title" }),
        };

        let decoded: Vec<NewsItem> = decode_documents(&[good, bad]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].title, "t");
    }
}
