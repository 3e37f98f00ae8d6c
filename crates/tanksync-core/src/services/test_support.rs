//! In-memory store for service tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::collections::{Collection, SINGLETON_KEY, WritePolicy};
use crate::ports::{Document, DurableStore, StoreBackend, StoreError};
use crate::subscription::{SnapshotHub, Subscription};

pub struct MemoryStore {
    backend: StoreBackend,
    reachable: bool,
    failing: AtomicBool,
    docs: Mutex<BTreeMap<Collection, Vec<Document>>>,
    hub: SnapshotHub,
}

impl MemoryStore {
    fn with_backend(backend: StoreBackend) -> Self {
        Self {
            backend,
            reachable: true,
            failing: AtomicBool::new(false),
            docs: Mutex::new(BTreeMap::new()),
            hub: SnapshotHub::new(),
        }
    }

    pub fn remote() -> Self {
        Self::with_backend(StoreBackend::Remote)
    }

    pub fn local() -> Self {
        Self::with_backend(StoreBackend::Local)
    }

    /// A store whose `init` reports failure.
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Make every call fail while keeping `is_available` true.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.docs
            .lock()
            .unwrap()
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn check(&self, collection: Collection) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::write_failed(collection, "simulated failure"));
        }
        Ok(())
    }

    fn snapshot(&self, collection: Collection) -> Vec<Document> {
        self.docs
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    fn backend(&self) -> StoreBackend {
        self.backend
    }

    async fn init(&self) -> bool {
        self.reachable
    }

    fn is_available(&self) -> bool {
        self.reachable
    }

    async fn write(&self, collection: Collection, mut document: Document) -> Result<(), StoreError> {
        self.check(collection)?;
        let snapshot = {
            let mut docs = self.docs.lock().unwrap();
            let entries = docs.entry(collection).or_default();
            match collection.write_policy() {
                WritePolicy::Replace => {
                    document.id = SINGLETON_KEY.to_string();
                    *entries = vec![document];
                }
                WritePolicy::Upsert => {
                    if let Some(existing) = entries.iter_mut().find(|d| d.id == document.id) {
                        *existing = document;
                    } else {
                        entries.push(document);
                    }
                }
                WritePolicy::InsertIfAbsent => {
                    if entries.iter().any(|d| d.id == document.id) {
                        return Ok(());
                    }
                    entries.push(document);
                }
            }
            entries.sort_by_key(|d| d.created_at);
            entries.clone()
        };
        self.hub.publish(collection, snapshot);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.check(collection)?;
        Ok(self.snapshot(collection).into_iter().find(|d| d.id == id))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.check(collection)?;
        Ok(self.snapshot(collection))
    }

    async fn delete(&self, collection: Collection, ids: &[String]) -> Result<usize, StoreError> {
        self.check(collection)?;
        let (removed, snapshot) = {
            let mut docs = self.docs.lock().unwrap();
            let entries = docs.entry(collection).or_default();
            let before = entries.len();
            entries.retain(|d| !ids.contains(&d.id));
            (before - entries.len(), entries.clone())
        };
        if removed > 0 {
            self.hub.publish(collection, snapshot);
        }
        Ok(removed)
    }

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Subscription {
                collection,
                reason: "simulated failure".to_string(),
            });
        }
        let rx = self.hub.subscribe(collection);
        Ok(Subscription::live(collection, self.snapshot(collection), rx))
    }
}
