//! Composition utilities for building a [`SyncContext`] over `SQLite` stores.
//!
//! Construction only. Routing and fallback live in `tanksync-core`.

use std::path::PathBuf;
use std::sync::Arc;

use tanksync_core::{
    DurableStore, SyncContext, SyncEventEmitter, SyncSettings, local_store_path,
    remote_store_path,
};

use crate::setup::{setup_local_store, sqlite_url};
use crate::stores::SqliteDocumentStore;

/// Where a client's stores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `sqlite:` URL of the shared store. `None` runs local-only.
    pub remote_url: Option<String>,
    /// File backing this client's local store.
    pub local_path: PathBuf,
}

impl StoreConfig {
    /// Both stores in the default data directory.
    pub fn from_default_paths() -> anyhow::Result<Self> {
        Ok(Self {
            remote_url: Some(sqlite_url(&remote_store_path()?)),
            local_path: local_store_path()?,
        })
    }

    /// Drop the shared store so every operation goes to the local one.
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.remote_url = None;
        self
    }
}

/// Factory for the `SQLite`-backed sync layer.
pub struct StoreFactory;

impl StoreFactory {
    /// Build the shared store for `url`. Opening is deferred to `init()`.
    pub fn remote_store(url: &str, settings: &SyncSettings) -> Arc<SqliteDocumentStore> {
        Arc::new(SqliteDocumentStore::new(url).with_poll_interval(settings.poll_interval()))
    }

    /// Build a complete [`SyncContext`] and initialise it.
    ///
    /// An unreachable shared store is not an error: the context falls back
    /// to the local store, which must open.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use tanksync_db::{StoreConfig, StoreFactory};
    ///
    /// let config = StoreConfig::from_default_paths()?;
    /// let ctx = StoreFactory::build_context(&config, settings, emitter).await?;
    /// ctx.facade().add_remark("hello", "cli").await?;
    /// ```
    pub async fn build_context(
        config: &StoreConfig,
        settings: SyncSettings,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> anyhow::Result<SyncContext> {
        let local: Arc<dyn DurableStore> =
            Arc::new(setup_local_store(&config.local_path, &settings).await?);
        let remote = config
            .remote_url
            .as_deref()
            .map(|url| Self::remote_store(url, &settings) as Arc<dyn DurableStore>);

        let ctx = SyncContext::new(remote, local, settings, emitter);
        let backend = ctx.init().await;
        tracing::info!(?backend, local = %config.local_path.display(), "Sync layer ready");
        Ok(ctx)
    }
}

/// In-memory stores for tests, with a handle on the shared store so it can
/// be taken offline mid-test.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestStores {
    pub remote: Arc<SqliteDocumentStore>,
    pub local: Arc<crate::stores::SqliteLocalStore>,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestStores {
    pub async fn new() -> anyhow::Result<Self> {
        let remote_pool = crate::setup::connect_pool("sqlite::memory:").await?;
        let local_pool = crate::setup::connect_pool("sqlite::memory:").await?;
        Ok(Self {
            remote: Arc::new(SqliteDocumentStore::with_pool(remote_pool)),
            local: Arc::new(crate::stores::SqliteLocalStore::new(local_pool)),
        })
    }

    /// A fresh context over these stores.
    pub async fn context(
        &self,
        settings: SyncSettings,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> SyncContext {
        let ctx = SyncContext::new(
            Some(Arc::clone(&self.remote) as Arc<dyn DurableStore>),
            Arc::clone(&self.local) as Arc<dyn DurableStore>,
            settings,
            emitter,
        );
        ctx.init().await;
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanksync_core::{NoopEmitter, StoreBackend};

    #[tokio::test]
    async fn test_offline_config_runs_local_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            remote_url: Some(sqlite_url(&dir.path().join("shared.db"))),
            local_path: dir.path().join("local.db"),
        }
        .offline();

        let ctx = StoreFactory::build_context(&config, SyncSettings::default(), Arc::new(NoopEmitter::new()))
            .await
            .unwrap();
        assert_eq!(ctx.selected_backend(), Some(StoreBackend::Local));
        assert!(!dir.path().join("shared.db").exists());
    }

    #[tokio::test]
    async fn test_remote_outage_after_init_lands_locally() {
        let stores = TestStores::new().await.unwrap();
        let ctx = stores
            .context(SyncSettings::default(), Arc::new(NoopEmitter::new()))
            .await;
        assert_eq!(ctx.selected_backend(), Some(StoreBackend::Remote));

        stores.remote.set_offline_for_test(true);
        ctx.facade().add_remark("still here", "test").await.unwrap();

        let remarks = ctx.facade().load_remarks().await.unwrap();
        assert_eq!(remarks.len(), 1);
        assert_eq!(stores.local.list(tanksync_core::Collection::Remarks).await.unwrap().len(), 1);
    }
}
