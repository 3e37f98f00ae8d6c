//! Per-client key-value store over `SQLite`.
//!
//! Each collection is one JSON value under its local key: a document for
//! singletons, an array of documents for append collections. The status
//! record additionally mirrors its scalar fields into their own keys.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, OnceCell};

use tanksync_core::ports::{Document, DurableStore, StoreBackend, StoreError};
use tanksync_core::settings::DEFAULT_LOCAL_SPOKEN_CAP;
use tanksync_core::{
    Collection, SINGLETON_KEY, STATUS_SCALAR_KEYS, SnapshotHub, Subscription, WritePolicy,
};

use crate::setup::create_local_schema;

/// `SQLite` implementation of the local fallback [`DurableStore`].
pub struct SqliteLocalStore {
    pool: SqlitePool,
    spoken_cap: usize,
    ready: OnceCell<bool>,
    /// Serializes read-modify-write cycles on the stored arrays.
    write_lock: Mutex<()>,
    hub: SnapshotHub,
}

impl SqliteLocalStore {
    /// Create a local store over `pool`. The schema is created on `init()`.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            spoken_cap: DEFAULT_LOCAL_SPOKEN_CAP,
            ready: OnceCell::new(),
            write_lock: Mutex::new(()),
            hub: SnapshotHub::new(),
        }
    }

    /// Bound the local spoken ledger to the newest `cap` entries.
    #[must_use]
    pub const fn with_spoken_cap(mut self, cap: usize) -> Self {
        self.spoken_cap = cap;
        self
    }

    /// Read a raw key, e.g. one of the mirrored status scalars.
    pub async fn read_key(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        row.map(|(json,)| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    async fn read_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let Some(value) = self.read_key(collection.local_key()).await? else {
            return Ok(Vec::new());
        };

        if collection.is_singleton() {
            serde_json::from_value::<Document>(value)
                .map(|document| vec![document])
                .map_err(|e| StoreError::malformed(collection, e))
        } else {
            let Value::Array(entries) = value else {
                return Err(StoreError::malformed(collection, "expected an array of documents"));
            };
            Ok(entries
                .into_iter()
                .filter_map(|entry| match serde_json::from_value::<Document>(entry) {
                    Ok(document) => Some(document),
                    Err(e) => {
                        tracing::warn!(%collection, error = %e, "Dropping malformed local entry");
                        None
                    }
                })
                .collect())
        }
    }

    async fn persist(
        &self,
        collection: Collection,
        documents: &[Document],
    ) -> Result<(), StoreError> {
        let failed = |e: sqlx::Error| StoreError::write_failed(collection, e);
        let value = if collection.is_singleton() {
            documents
                .first()
                .map_or(Ok(Value::Null), serde_json::to_value)?
        } else {
            serde_json::to_value(documents)?
        };

        let mut tx = self.pool.begin().await.map_err(failed)?;
        put(&mut tx, collection.local_key(), &value)
            .await
            .map_err(failed)?;

        if collection == Collection::Status {
            if let Some(status) = documents.first() {
                for (field, key) in STATUS_SCALAR_KEYS {
                    if let Some(scalar) = status.data.get(field) {
                        put(&mut tx, key, scalar).await.map_err(failed)?;
                    }
                }
            }
        }

        tx.commit().await.map_err(failed)
    }

    fn apply(&self, collection: Collection, entries: &mut Vec<Document>, mut document: Document) -> bool {
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
                    return false;
                }
                entries.push(document);
            }
        }

        entries.sort_by_key(|d| d.created_at);
        if collection == Collection::SpokenNews && entries.len() > self.spoken_cap {
            let excess = entries.len() - self.spoken_cap;
            entries.drain(..excess);
        }
        true
    }
}

async fn put(tx: &mut Transaction<'_, Sqlite>, key: &str, value: &Value) -> Result<(), sqlx::Error> {
    let updated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    sqlx::query("INSERT OR REPLACE INTO local_kv (key, value, updated_at) VALUES (?, ?, ?)")
        .bind(key)
        .bind(value.to_string())
        .bind(&updated_at)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl DurableStore for SqliteLocalStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Local
    }

    async fn init(&self) -> bool {
        *self
            .ready
            .get_or_init(|| async {
                match create_local_schema(&self.pool).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "Local store unavailable");
                        false
                    }
                }
            })
            .await
    }

    fn is_available(&self) -> bool {
        self.ready.get().copied().unwrap_or(false)
    }

    async fn write(&self, collection: Collection, document: Document) -> Result<(), StoreError> {
        let snapshot = {
            let _guard = self.write_lock.lock().await;
            let mut entries = self.read_documents(collection).await?;
            if !self.apply(collection, &mut entries, document) {
                return Ok(());
            }
            self.persist(collection, &entries).await?;
            entries
        };

        self.hub.publish(collection, snapshot);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let documents = self.read_documents(collection).await?;
        Ok(documents.into_iter().find(|d| d.id == id))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.read_documents(collection).await
    }

    async fn delete(&self, collection: Collection, ids: &[String]) -> Result<usize, StoreError> {
        let (removed, snapshot) = {
            let _guard = self.write_lock.lock().await;
            let mut entries = self.read_documents(collection).await?;
            let before = entries.len();
            entries.retain(|d| !ids.contains(&d.id));
            let removed = before - entries.len();
            if removed > 0 {
                self.persist(collection, &entries).await?;
            }
            (removed, entries)
        };

        if removed > 0 {
            self.hub.publish(collection, snapshot);
        }
        Ok(removed)
    }

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError> {
        let updates = self.hub.subscribe(collection);
        let initial = self
            .read_documents(collection)
            .await
            .map_err(|e| StoreError::Subscription {
                collection,
                reason: e.to_string(),
            })?;
        Ok(Subscription::live(collection, initial, updates))
    }
}

impl std::fmt::Debug for SqliteLocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLocalStore")
            .field("available", &self.is_available())
            .field("spoken_cap", &self.spoken_cap)
            .finish_non_exhaustive()
    }
}
