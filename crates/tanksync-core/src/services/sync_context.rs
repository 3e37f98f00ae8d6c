//! `SyncContext` - the sync layer's composition root.
//!
//! Built once at startup by an adapter (CLI, GUI) from concrete stores and
//! handed to whatever needs the shared collections. There is no global
//! state besides what this struct owns.

use std::sync::Arc;

use super::{DedupLedger, IngestService, StoreRouter, SyncFacade};
use crate::clock::MonotonicClock;
use crate::ports::{DurableStore, SpokenLedgerPort, StoreBackend, SyncEventEmitter};
use crate::settings::SyncSettings;

/// Everything a client needs to read, write and announce shared records.
///
/// # Example
///
/// ```ignore
/// let ctx = SyncContext::new(Some(remote), local, settings, Arc::new(NoopEmitter::new()));
/// ctx.init().await;
///
/// ctx.facade().add_remark("hello", "cli").await?;
/// let mut feed = ctx.facade().watch_news().await;
/// ```
#[derive(Debug)]
pub struct SyncContext {
    router: Arc<StoreRouter>,
    facade: Arc<SyncFacade>,
    ledger: Arc<DedupLedger>,
    ingest: IngestService,
    settings: SyncSettings,
}

impl SyncContext {
    pub fn new(
        remote: Option<Arc<dyn DurableStore>>,
        local: Arc<dyn DurableStore>,
        settings: SyncSettings,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> Self {
        let clock = Arc::new(MonotonicClock::new());
        let router = Arc::new(StoreRouter::new(remote, local));
        let facade = Arc::new(SyncFacade::new(
            Arc::clone(&router),
            settings.clone(),
            Arc::clone(&clock),
            emitter,
        ));
        let ledger = Arc::new(DedupLedger::new(Arc::clone(&router), clock));
        let ingest = IngestService::new(Arc::clone(&facade));

        Self {
            router,
            facade,
            ledger,
            ingest,
            settings,
        }
    }

    /// Initialise the stores. Safe to call more than once.
    pub async fn init(&self) -> StoreBackend {
        self.router.init().await
    }

    pub fn facade(&self) -> &Arc<SyncFacade> {
        &self.facade
    }

    /// The dedup ledger as the port the speech queue consumes.
    pub fn ledger(&self) -> Arc<dyn SpokenLedgerPort> {
        Arc::clone(&self.ledger) as Arc<dyn SpokenLedgerPort>
    }

    pub const fn ingest(&self) -> &IngestService {
        &self.ingest
    }

    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Backend chosen at init, for diagnostics only.
    pub fn selected_backend(&self) -> Option<StoreBackend> {
        self.router.selected_backend()
    }
}
