//! Typed change feeds.
//!
//! A [`TypedFeed`] pairs a [`Subscription`] with a [`ChangeDemultiplexer`]:
//! raw snapshots go in, typed deliveries come out, and each delivery is
//! mirrored to the UI event emitter.

use std::sync::Arc;

use serde::Serialize;

use crate::collections::Collection;
use crate::demux::{ChangeDemultiplexer, Delivery};
use crate::domain::Record;
use crate::events::SyncEvent;
use crate::ports::{SyncEventEmitter, decode_documents};
use crate::subscription::Subscription;

/// A live, typed view of one collection.
pub struct TypedFeed<T> {
    subscription: Subscription,
    demux: ChangeDemultiplexer<T>,
    emitter: Arc<dyn SyncEventEmitter>,
}

impl<T: Record> TypedFeed<T> {
    pub fn new(subscription: Subscription, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        Self {
            subscription,
            demux: ChangeDemultiplexer::new(),
            emitter,
        }
    }

    pub const fn collection(&self) -> Collection {
        T::COLLECTION
    }

    /// Wait for the next delivery. `None` once the subscription has ended.
    ///
    /// Malformed documents are dropped before diffing.
    pub async fn next(&mut self) -> Option<Delivery<T>> {
        let documents = self.subscription.next().await?;
        let delivery = self.demux.ingest(decode_documents(&documents));
        self.emit(&delivery);
        Some(delivery)
    }

    fn emit(&self, delivery: &Delivery<T>) {
        self.emitter.emit(SyncEvent::Snapshot {
            collection: T::COLLECTION,
            items: to_values(&delivery.items),
            is_initial_load: delivery.is_initial_load,
        });

        if !delivery.is_initial_load && !delivery.changes.is_empty() {
            self.emitter.emit(SyncEvent::Change {
                collection: T::COLLECTION,
                added: to_values(&delivery.changes.added),
                modified: to_values(&delivery.changes.modified),
                removed: to_values(&delivery.changes.removed),
            });
        }
    }

    /// Detach from the store.
    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}

fn to_values<T: Serialize>(records: &[T]) -> Vec<serde_json::Value> {
    records
        .iter()
        .filter_map(|r| serde_json::to_value(r).ok())
        .collect()
}

impl<T> std::fmt::Debug for TypedFeed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedFeed")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}
