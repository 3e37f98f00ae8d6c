//! Change subscriptions.
//!
//! Stores deliver full snapshots, never deltas. A [`SnapshotHub`] fans each
//! published snapshot out to the live [`Subscription`]s of a collection.
//! Dropping a subscription (or calling [`Subscription::unsubscribe`])
//! detaches it; nothing else keeps a listener alive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::collections::Collection;
use crate::ports::Document;

/// Snapshots buffered per subscriber before the oldest are skipped.
const SNAPSHOT_BUFFER: usize = 32;

type Snapshot = Arc<Vec<Document>>;

/// An explicit handle on a collection's change stream.
#[derive(Debug)]
pub struct Subscription {
    collection: Collection,
    pending: Option<Vec<Document>>,
    updates: Option<broadcast::Receiver<Snapshot>>,
}

impl Subscription {
    /// A live subscription: `initial` first, then every published snapshot.
    pub fn live(
        collection: Collection,
        initial: Vec<Document>,
        updates: broadcast::Receiver<Snapshot>,
    ) -> Self {
        Self {
            collection,
            pending: Some(initial),
            updates: Some(updates),
        }
    }

    /// A one-shot subscription that delivers `snapshot` once and then ends.
    pub fn once(collection: Collection, snapshot: Vec<Document>) -> Self {
        Self {
            collection,
            pending: Some(snapshot),
            updates: None,
        }
    }

    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Whether further deliveries can still arrive.
    pub const fn is_live(&self) -> bool {
        self.updates.is_some()
    }

    /// Wait for the next snapshot. Returns `None` once the stream has ended.
    ///
    /// A subscriber that falls behind skips straight to the oldest snapshot
    /// still buffered; since every delivery is a full snapshot, no state is
    /// lost.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        if let Some(snapshot) = self.pending.take() {
            return Some(snapshot);
        }

        let updates = self.updates.as_mut()?;
        loop {
            match updates.recv().await {
                Ok(snapshot) => return Some(snapshot.as_ref().clone()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(collection = %self.collection, skipped, "Subscriber lagged, skipping to newer snapshot");
                }
                Err(RecvError::Closed) => {
                    self.updates = None;
                    return None;
                }
            }
        }
    }

    /// Detach from the store.
    pub fn unsubscribe(self) {
        tracing::debug!(collection = %self.collection, "Unsubscribed");
    }
}

/// Per-collection broadcast channels shared by a store's subscribers.
#[derive(Debug, Default)]
pub struct SnapshotHub {
    channels: Mutex<HashMap<Collection, broadcast::Sender<Snapshot>>>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a receiver for future snapshots of `collection`.
    ///
    /// Subscribe *before* reading the initial snapshot so no publish can
    /// fall between the read and the registration.
    pub fn subscribe(&self, collection: Collection) -> broadcast::Receiver<Snapshot> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(collection)
            .or_insert_with(|| broadcast::channel(SNAPSHOT_BUFFER).0)
            .subscribe()
    }

    /// Publish a snapshot to every live subscriber. Returns how many received it.
    pub fn publish(&self, collection: Collection, snapshot: Vec<Document>) -> usize {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(&collection)
            .and_then(|tx| tx.send(Arc::new(snapshot)).ok())
            .unwrap_or(0)
    }

    pub fn has_subscribers(&self, collection: Collection) -> bool {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(&collection)
            .is_some_and(|tx| tx.receiver_count() > 0)
    }
}
