//! Shared document store over `SQLite`.
//!
//! Every client opens the same database file. Writes publish the new
//! snapshot to this process's subscribers directly; a revision watcher
//! picks up writes made by other processes and republishes them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
#[cfg(any(test, feature = "test-utils"))]
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::OnceCell;
use tokio::time::MissedTickBehavior;

use tanksync_core::ports::{Document, DurableStore, StoreBackend, StoreError};
use tanksync_core::{Collection, SINGLETON_KEY, SnapshotHub, Subscription, WritePolicy};

use crate::setup::{connect_pool, create_document_schema};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

type DocumentRow = (String, i64, String);

enum PoolSource {
    Url(String),
    Pool(SqlitePool),
}

struct Inner {
    source: PoolSource,
    poll_interval: Duration,
    pool: OnceCell<Option<SqlitePool>>,
    hub: SnapshotHub,
    /// Highest revision seen per collection.
    seen: Mutex<HashMap<Collection, i64>>,
    #[cfg(any(test, feature = "test-utils"))]
    offline: AtomicBool,
}

/// `SQLite` implementation of the shared [`DurableStore`].
///
/// Cheap to clone; clones share the pool and the subscribers.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    inner: Arc<Inner>,
}

impl SqliteDocumentStore {
    /// Create a store for a `sqlite:` URL. Nothing is opened until `init()`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_source(PoolSource::Url(url.into()))
    }

    /// Create a store over an existing pool.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self::from_source(PoolSource::Pool(pool))
    }

    fn from_source(source: PoolSource) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                poll_interval: DEFAULT_POLL_INTERVAL,
                pool: OnceCell::new(),
                hub: SnapshotHub::new(),
                seen: Mutex::new(HashMap::new()),
                #[cfg(any(test, feature = "test-utils"))]
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Set how often other processes' writes are picked up.
    ///
    /// Only effective before the store is shared or initialised.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.poll_interval = interval;
        }
        self
    }

    /// Make every call fail as if the connection had dropped, while
    /// `is_available()` keeps reporting the state at init.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_offline_for_test(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }
}

impl Inner {
    async fn open(self: &Arc<Self>) -> Result<SqlitePool, sqlx::Error> {
        let pool = match &self.source {
            PoolSource::Url(url) => connect_pool(url).await?,
            PoolSource::Pool(pool) => pool.clone(),
        };
        create_document_schema(&pool).await?;

        let revisions: Vec<(String, i64)> =
            sqlx::query_as("SELECT collection, revision FROM collection_revisions")
                .fetch_all(&pool)
                .await?;
        for (name, revision) in revisions {
            if let Ok(collection) = name.parse::<Collection>() {
                self.note_revision(collection, revision);
            }
        }

        tokio::spawn(watch_revisions(Arc::downgrade(self), self.poll_interval));
        Ok(pool)
    }

    #[cfg(any(test, feature = "test-utils"))]
    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    #[cfg(not(any(test, feature = "test-utils")))]
    const fn is_offline(&self) -> bool {
        false
    }

    fn pool(&self) -> Result<&SqlitePool, StoreError> {
        if self.is_offline() {
            return Err(StoreError::Unavailable("offline".to_string()));
        }

        self.pool
            .get()
            .and_then(Option::as_ref)
            .ok_or_else(|| StoreError::Unavailable("document store not initialised".to_string()))
    }

    /// Record `revision` for `collection`. Returns whether it was new.
    fn note_revision(&self, collection: Collection, revision: i64) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        let last = seen.entry(collection).or_insert(0);
        if revision > *last {
            *last = revision;
            true
        } else {
            false
        }
    }

    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, created_at, data FROM documents WHERE collection = ? ORDER BY created_at, rowid",
        )
        .bind(collection.name())
        .fetch_all(self.pool()?)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        rows.into_iter()
            .map(|row| row_to_document(collection, row))
            .collect()
    }

    /// Publish the collection after a committed change of ours.
    async fn publish_committed(&self, collection: Collection, revision: i64) {
        self.note_revision(collection, revision);
        if !self.hub.has_subscribers(collection) {
            return;
        }
        match self.list_documents(collection).await {
            Ok(documents) => {
                self.hub.publish(collection, documents);
            }
            Err(e) => {
                tracing::warn!(%collection, error = %e, "Could not read back snapshot after write");
            }
        }
    }

    /// Republish collections whose revision moved under another process.
    async fn poll_revisions(&self) {
        let Ok(pool) = self.pool() else {
            return;
        };
        let revisions: Vec<(String, i64)> =
            match sqlx::query_as("SELECT collection, revision FROM collection_revisions")
                .fetch_all(pool)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::debug!(error = %e, "Revision poll failed");
                    return;
                }
            };

        for (name, revision) in revisions {
            let Ok(collection) = name.parse::<Collection>() else {
                continue;
            };
            if !self.note_revision(collection, revision) || !self.hub.has_subscribers(collection) {
                continue;
            }
            tracing::debug!(%collection, revision, "External change detected");
            if let Ok(documents) = self.list_documents(collection).await {
                self.hub.publish(collection, documents);
            }
        }
    }
}

async fn watch_revisions(inner: Weak<Inner>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.poll_revisions().await;
    }
    tracing::debug!("Revision watcher stopped");
}

async fn bump_revision(
    tx: &mut Transaction<'_, Sqlite>,
    collection: Collection,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r"
        INSERT INTO collection_revisions (collection, revision) VALUES (?, 1)
        ON CONFLICT(collection) DO UPDATE SET revision = revision + 1
        RETURNING revision
        ",
    )
    .bind(collection.name())
    .fetch_one(&mut **tx)
    .await
}

fn row_to_document(
    collection: Collection,
    (id, created_at, data): DocumentRow,
) -> Result<Document, StoreError> {
    let data = serde_json::from_str(&data)
        .map_err(|e| StoreError::malformed(collection, format!("{id}: {e}")))?;
    Ok(Document {
        id,
        created_at,
        data,
    })
}

#[async_trait]
impl DurableStore for SqliteDocumentStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Remote
    }

    async fn init(&self) -> bool {
        let inner = &self.inner;
        inner
            .pool
            .get_or_init(|| async move {
                match inner.open().await {
                    Ok(pool) => {
                        tracing::info!("Shared document store opened");
                        Some(pool)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Shared document store unavailable");
                        None
                    }
                }
            })
            .await
            .is_some()
    }

    fn is_available(&self) -> bool {
        self.inner.pool.get().is_some_and(Option::is_some)
    }

    async fn write(&self, collection: Collection, mut document: Document) -> Result<(), StoreError> {
        let pool = self.inner.pool()?;
        if collection.is_singleton() {
            document.id = SINGLETON_KEY.to_string();
        }
        let data = serde_json::to_string(&document.data)?;
        let now = chrono::Utc::now().timestamp_millis();
        let failed = |e: sqlx::Error| StoreError::write_failed(collection, e);

        let sql = match collection.write_policy() {
            WritePolicy::InsertIfAbsent => {
                "INSERT OR IGNORE INTO documents (collection, id, created_at, data, updated_at) VALUES (?, ?, ?, ?, ?)"
            }
            WritePolicy::Replace | WritePolicy::Upsert => {
                r"
                INSERT INTO documents (collection, id, created_at, data, updated_at) VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    created_at = excluded.created_at,
                    data = excluded.data,
                    updated_at = excluded.updated_at
                "
            }
        };

        let mut tx = pool.begin().await.map_err(failed)?;
        let changed = sqlx::query(sql)
            .bind(collection.name())
            .bind(&document.id)
            .bind(document.created_at)
            .bind(&data)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(failed)?
            .rows_affected();

        if changed == 0 {
            tx.rollback().await.map_err(failed)?;
            tracing::debug!(%collection, id = %document.id, "Document already present, nothing written");
            return Ok(());
        }

        let revision = bump_revision(&mut tx, collection).await.map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        self.inner.publish_committed(collection, revision).await;
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, created_at, data FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection.name())
        .bind(id)
        .fetch_optional(self.inner.pool()?)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        row.map(|row| row_to_document(collection, row)).transpose()
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.inner.list_documents(collection).await
    }

    async fn delete(&self, collection: Collection, ids: &[String]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let pool = self.inner.pool()?;
        let failed = |e: sqlx::Error| StoreError::Storage(e.to_string());

        let mut tx = pool.begin().await.map_err(failed)?;
        let mut removed = 0;
        for id in ids {
            removed += sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                .bind(collection.name())
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(failed)?
                .rows_affected();
        }

        if removed == 0 {
            tx.rollback().await.map_err(failed)?;
            return Ok(0);
        }

        let revision = bump_revision(&mut tx, collection).await.map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        self.inner.publish_committed(collection, revision).await;
        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, StoreError> {
        let subscription_failed = |e: StoreError| StoreError::Subscription {
            collection,
            reason: e.to_string(),
        };
        self.inner.pool().map_err(subscription_failed)?;

        let updates = self.inner.hub.subscribe(collection);
        let initial = self
            .inner
            .list_documents(collection)
            .await
            .map_err(subscription_failed)?;
        Ok(Subscription::live(collection, initial, updates))
    }
}

impl std::fmt::Debug for SqliteDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDocumentStore")
            .field("available", &self.is_available())
            .field("poll_interval", &self.inner.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_store() -> SqliteDocumentStore {
        let pool = connect_pool("sqlite::memory:").await.unwrap();
        let store = SqliteDocumentStore::with_pool(pool);
        assert!(store.init().await);
        store
    }

    fn doc(id: &str, created_at: i64) -> Document {
        Document {
            id: id.to_string(),
            created_at,
            data: json!({ "id": id, "text": format!("text {id}") }),
        }
    }

    #[tokio::test]
    async fn test_uninitialised_store_is_unavailable() {
        let store = SqliteDocumentStore::new("sqlite::memory:");
        assert!(!store.is_available());
        let err = store.list(Collection::News).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let store = memory_store().await;
        assert!(store.init().await);
        assert!(store.is_available());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_timestamp() {
        let store = memory_store().await;
        store.write(Collection::Remarks, doc("late", 20)).await.unwrap();
        store.write(Collection::Remarks, doc("early", 10)).await.unwrap();

        let ids: Vec<_> = store
            .list(Collection::Remarks)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_singleton_write_replaces() {
        let store = memory_store().await;
        store.write(Collection::Status, doc("ignored", 1)).await.unwrap();
        store.write(Collection::Status, doc("also-ignored", 2)).await.unwrap();

        let documents = store.list(Collection::Status).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, SINGLETON_KEY);
        assert_eq!(documents[0].created_at, 2);
    }

    #[tokio::test]
    async fn test_spoken_marker_is_never_overwritten() {
        let store = memory_store().await;
        store.write(Collection::SpokenNews, doc("n1", 1)).await.unwrap();
        store.write(Collection::SpokenNews, doc("n1", 99)).await.unwrap();

        let marker = store.get(Collection::SpokenNews, "n1").await.unwrap().unwrap();
        assert_eq!(marker.created_at, 1);
    }

    #[tokio::test]
    async fn test_writer_receives_its_own_change() {
        let store = memory_store().await;
        let mut sub = store.subscribe(Collection::News).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        store.write(Collection::News, doc("a", 1)).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_publishes_and_counts() {
        let store = memory_store().await;
        store.write(Collection::Knowledge, doc("a", 1)).await.unwrap();
        store.write(Collection::Knowledge, doc("b", 2)).await.unwrap();
        let mut sub = store.subscribe(Collection::Knowledge).await.unwrap();
        sub.next().await.unwrap();

        let removed = store
            .delete(Collection::Knowledge, &["a".to_string(), "zzz".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(sub.next().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_fails_per_call() {
        let store = memory_store().await;
        store.set_offline_for_test(true);

        assert!(store.is_available());
        assert!(store.write(Collection::News, doc("a", 1)).await.is_err());
        assert!(matches!(
            store.subscribe(Collection::News).await.unwrap_err(),
            StoreError::Subscription { .. }
        ));

        store.set_offline_for_test(false);
        assert!(store.write(Collection::News, doc("a", 1)).await.is_ok());
    }
}
