//! Global announcement ledger.
//!
//! Backed by the `spoken_news` collection. Marks written to the remote store
//! are visible to every client sharing it; marks written while the remote
//! was unreachable live in the local store, which is consulted as well.

use std::sync::Arc;

use async_trait::async_trait;

use super::router::StoreRouter;
use crate::clock::MonotonicClock;
use crate::collections::Collection;
use crate::domain::SpokenMarker;
use crate::ports::{Document, SpokenLedgerPort, StoreBackend};

/// Dedup ledger over the routed stores.
#[derive(Debug)]
pub struct DedupLedger {
    router: Arc<StoreRouter>,
    clock: Arc<MonotonicClock>,
}

impl DedupLedger {
    pub const fn new(router: Arc<StoreRouter>, clock: Arc<MonotonicClock>) -> Self {
        Self { router, clock }
    }

    async fn marked_locally(&self, id: &str) -> bool {
        match self.router.local().get(Collection::SpokenNews, id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::debug!(id, error = %e, "Local ledger lookup failed");
                false
            }
        }
    }
}

#[async_trait]
impl SpokenLedgerPort for DedupLedger {
    async fn was_spoken(&self, id: &str) -> bool {
        match self.router.get(Collection::SpokenNews, id).await {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(id, error = %e, "Ledger lookup failed, treating as not spoken");
                return false;
            }
        }

        // A mark made during a remote outage only exists locally.
        self.router.selected_backend() == Some(StoreBackend::Remote) && self.marked_locally(id).await
    }

    async fn mark_spoken(&self, id: &str) {
        let marker = SpokenMarker::new(id, self.clock.now_ms());
        let document = match Document::from_record(&marker) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(id, error = %e, "Could not encode spoken marker");
                return;
            }
        };

        match self.router.write(Collection::SpokenNews, document).await {
            Ok(backend) => tracing::debug!(id, %backend, "Marked spoken"),
            Err(e) => tracing::warn!(id, error = %e, "Could not persist spoken marker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::DurableStore;
    use crate::services::test_support::MemoryStore;

    fn ledger(remote: Option<Arc<MemoryStore>>, local: Arc<MemoryStore>) -> DedupLedger {
        let remote = remote.map(|r| r as Arc<dyn DurableStore>);
        let router = Arc::new(StoreRouter::new(remote, local));
        DedupLedger::new(router, Arc::new(MonotonicClock::new()))
    }

    #[tokio::test]
    async fn test_mark_then_was_spoken() {
        let ledger = ledger(None, Arc::new(MemoryStore::local()));
        assert!(!ledger.was_spoken("n1").await);
        ledger.mark_spoken("n1").await;
        assert!(ledger.was_spoken("n1").await);
    }

    #[tokio::test]
    async fn test_marks_are_shared_through_the_remote_store() {
        let shared = Arc::new(MemoryStore::remote());
        let first = ledger(Some(shared.clone()), Arc::new(MemoryStore::local()));
        let second = ledger(Some(shared), Arc::new(MemoryStore::local()));

        first.mark_spoken("n1").await;
        assert!(second.was_spoken("n1").await);
    }

    #[tokio::test]
    async fn test_repeated_marks_keep_one_entry() {
        let local = Arc::new(MemoryStore::local());
        let ledger = ledger(None, local.clone());
        ledger.mark_spoken("n1").await;
        ledger.mark_spoken("n1").await;
        assert_eq!(local.len(Collection::SpokenNews), 1);
    }

    #[tokio::test]
    async fn test_total_failure_is_fail_open() {
        let remote = Arc::new(MemoryStore::remote());
        let local = Arc::new(MemoryStore::local());
        let ledger = ledger(Some(remote.clone()), local.clone());
        ledger.mark_spoken("n1").await;

        remote.set_failing(true);
        local.set_failing(true);
        assert!(!ledger.was_spoken("n1").await);
        // Marking must not panic or surface anything either.
        ledger.mark_spoken("n2").await;
    }

    #[tokio::test]
    async fn test_mark_made_during_outage_is_still_seen() {
        let remote = Arc::new(MemoryStore::remote());
        let ledger = ledger(Some(remote.clone()), Arc::new(MemoryStore::local()));
        ledger.router.init().await;

        remote.set_failing(true);
        ledger.mark_spoken("n1").await;
        remote.set_failing(false);

        assert!(ledger.was_spoken("n1").await);
    }
}
