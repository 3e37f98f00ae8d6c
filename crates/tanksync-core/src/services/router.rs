//! Remote/local store routing.
//!
//! Every call goes to the shared remote store while it is available and
//! falls back to the local store when it is not, or when the remote call
//! fails. Callers never learn which store served them.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::collections::Collection;
use crate::ports::{Document, DurableStore, StoreBackend, SyncError};
use crate::subscription::Subscription;

/// Routes store operations between the remote and local adapters.
pub struct StoreRouter {
    remote: Option<Arc<dyn DurableStore>>,
    local: Arc<dyn DurableStore>,
    selected: OnceCell<StoreBackend>,
}

impl StoreRouter {
    /// Create a router. Without a remote store every call goes local.
    pub fn new(remote: Option<Arc<dyn DurableStore>>, local: Arc<dyn DurableStore>) -> Self {
        Self {
            remote,
            local,
            selected: OnceCell::new(),
        }
    }

    /// Initialise both stores and select the preferred backend.
    ///
    /// Idempotent: the selection is made once and cached.
    pub async fn init(&self) -> StoreBackend {
        let local = &self.local;
        let remote = self.remote.as_ref();
        *self
            .selected
            .get_or_init(|| async move {
                if !local.init().await {
                    tracing::warn!("Local store failed to initialise");
                }

                let Some(remote) = remote else {
                    tracing::info!("No remote store configured, using local store");
                    return StoreBackend::Local;
                };

                if remote.init().await {
                    tracing::info!("Remote store ready");
                    StoreBackend::Remote
                } else {
                    tracing::warn!("Remote store unavailable, using local store");
                    StoreBackend::Local
                }
            })
            .await
    }

    /// Backend selected at init, for diagnostics.
    pub fn selected_backend(&self) -> Option<StoreBackend> {
        self.selected.get().copied()
    }

    /// The local store, regardless of the selection.
    pub fn local(&self) -> &Arc<dyn DurableStore> {
        &self.local
    }

    async fn available_remote(&self) -> Option<&Arc<dyn DurableStore>> {
        if self.init().await != StoreBackend::Remote {
            return None;
        }
        self.remote.as_ref().filter(|remote| remote.is_available())
    }

    /// Write a document. Returns the backend that accepted it.
    ///
    /// A failed remote write is retried once against the local store; only
    /// a local failure is reported.
    pub async fn write(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<StoreBackend, SyncError> {
        if let Some(remote) = self.available_remote().await {
            match remote.write(collection, document.clone()).await {
                Ok(()) => return Ok(StoreBackend::Remote),
                Err(e) => {
                    tracing::warn!(%collection, id = %document.id, error = %e, "Remote write failed, writing locally");
                }
            }
        }

        self.local
            .write(collection, document)
            .await
            .map(|()| StoreBackend::Local)
            .map_err(|e| SyncError::persist(collection, e))
    }

    pub async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, SyncError> {
        if let Some(remote) = self.available_remote().await {
            match remote.get(collection, id).await {
                Ok(document) => return Ok(document),
                Err(e) => {
                    tracing::warn!(%collection, id, error = %e, "Remote read failed, reading locally");
                }
            }
        }

        self.local
            .get(collection, id)
            .await
            .map_err(|e| SyncError::persist(collection, e))
    }

    /// All documents of a collection, oldest first.
    pub async fn list(&self, collection: Collection) -> Result<Vec<Document>, SyncError> {
        if let Some(remote) = self.available_remote().await {
            match remote.list(collection).await {
                Ok(documents) => return Ok(documents),
                Err(e) => {
                    tracing::warn!(%collection, error = %e, "Remote list failed, listing locally");
                }
            }
        }

        self.local
            .list(collection)
            .await
            .map_err(|e| SyncError::persist(collection, e))
    }

    pub async fn delete(&self, collection: Collection, ids: &[String]) -> Result<usize, SyncError> {
        if ids.is_empty() {
            return Ok(0);
        }

        if let Some(remote) = self.available_remote().await {
            match remote.delete(collection, ids).await {
                Ok(removed) => return Ok(removed),
                Err(e) => {
                    tracing::warn!(%collection, count = ids.len(), error = %e, "Remote delete failed, deleting locally");
                }
            }
        }

        self.local
            .delete(collection, ids)
            .await
            .map_err(|e| SyncError::persist(collection, e))
    }

    /// Open a change subscription. Never fails.
    ///
    /// If the remote subscription cannot be opened, the caller gets a
    /// one-shot snapshot from the local store and no re-subscription is
    /// attempted.
    pub async fn subscribe(&self, collection: Collection) -> Subscription {
        if let Some(remote) = self.available_remote().await {
            match remote.subscribe(collection).await {
                Ok(subscription) => return subscription,
                Err(e) => {
                    tracing::warn!(%collection, error = %e, "Remote subscription failed, delivering local snapshot once");
                    let snapshot = self.local.list(collection).await.unwrap_or_else(|e| {
                        tracing::warn!(%collection, error = %e, "Local snapshot unavailable");
                        Vec::new()
                    });
                    return Subscription::once(collection, snapshot);
                }
            }
        }

        match self.local.subscribe(collection).await {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(%collection, error = %e, "Local subscription failed");
                Subscription::once(collection, Vec::new())
            }
        }
    }
}

impl std::fmt::Debug for StoreRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRouter")
            .field("has_remote", &self.remote.is_some())
            .field("selected", &self.selected.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::MemoryStore;

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            created_at: 1,
            data: serde_json::json!({ "id": id, "text": id }),
        }
    }

    #[tokio::test]
    async fn test_init_selects_remote_when_ready() {
        let remote = Arc::new(MemoryStore::remote());
        let local = Arc::new(MemoryStore::local());
        let router = StoreRouter::new(Some(remote), local);

        assert_eq!(router.init().await, StoreBackend::Remote);
        assert_eq!(router.selected_backend(), Some(StoreBackend::Remote));
    }

    #[tokio::test]
    async fn test_unreachable_remote_routes_everything_locally() {
        let remote = Arc::new(MemoryStore::remote().unreachable());
        let local = Arc::new(MemoryStore::local());
        let router = StoreRouter::new(Some(remote.clone()), local.clone());

        let backend = tokio_test::assert_ok!(router.write(Collection::Remarks, doc("a")).await);
        assert_eq!(backend, StoreBackend::Local);
        assert_eq!(router.list(Collection::Remarks).await.unwrap().len(), 1);
        assert_eq!(remote.len(Collection::Remarks), 0);
    }

    #[tokio::test]
    async fn test_failed_remote_write_falls_back_to_local() {
        let remote = Arc::new(MemoryStore::remote());
        let local = Arc::new(MemoryStore::local());
        let router = StoreRouter::new(Some(remote.clone()), local.clone());
        router.init().await;
        remote.set_failing(true);

        let backend = router.write(Collection::Remarks, doc("a")).await.unwrap();
        assert_eq!(backend, StoreBackend::Local);
        assert_eq!(local.len(Collection::Remarks), 1);

        // Reads fail remotely too, so the local copy is what comes back.
        let got = router.get(Collection::Remarks, "a").await.unwrap();
        assert_eq!(got.unwrap().id, "a");
    }

    #[tokio::test]
    async fn test_both_stores_failing_surfaces_error() {
        let remote = Arc::new(MemoryStore::remote());
        let local = Arc::new(MemoryStore::local());
        let router = StoreRouter::new(Some(remote.clone()), local.clone());
        router.init().await;
        remote.set_failing(true);
        local.set_failing(true);

        let err = tokio_test::assert_err!(router.write(Collection::News, doc("a")).await);
        assert!(matches!(err, SyncError::Persist { collection: Collection::News, .. }));
    }

    #[tokio::test]
    async fn test_failed_remote_subscription_delivers_local_snapshot_once() {
        let remote = Arc::new(MemoryStore::remote());
        let local = Arc::new(MemoryStore::local());
        local.write(Collection::Remarks, doc("l")).await.unwrap();
        let router = StoreRouter::new(Some(remote.clone()), local);
        router.init().await;
        remote.set_failing(true);

        let mut sub = router.subscribe(Collection::Remarks).await;
        assert!(!sub.is_live());
        assert_eq!(sub.next().await.unwrap()[0].id, "l");
        assert!(sub.next().await.is_none());
    }
}
