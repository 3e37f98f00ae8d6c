//! Sync facade: one read/write pair per collection.
//!
//! Writes stamp missing ids and timestamps, enforce collection caps and
//! dedup rules, and go through the [`StoreRouter`]. Nothing here reveals
//! whether the remote store is reachable.

use std::collections::HashSet;
use std::sync::Arc;

use super::feed::TypedFeed;
use super::router::StoreRouter;
use crate::clock::{MonotonicClock, wall_clock_ms};
use crate::collections::SINGLETON_KEY;
use crate::domain::{
    KnowledgeItem, MarketSnapshot, NewsItem, Record, Remark, SpokenMarker, StatusRecord,
    WatchlistRecord,
};
use crate::ports::{Document, SyncError, SyncEventEmitter, decode_document, decode_documents};
use crate::settings::SyncSettings;

/// Typed access to every shared collection.
pub struct SyncFacade {
    router: Arc<StoreRouter>,
    settings: SyncSettings,
    clock: Arc<MonotonicClock>,
    emitter: Arc<dyn SyncEventEmitter>,
}

impl SyncFacade {
    pub fn new(
        router: Arc<StoreRouter>,
        settings: SyncSettings,
        clock: Arc<MonotonicClock>,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> Self {
        Self {
            router,
            settings,
            clock,
            emitter,
        }
    }

    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    // ========== Knowledge ==========

    /// Save a knowledge entry.
    ///
    /// Saving an auto-generated entry prunes the oldest auto entries beyond
    /// the cap; manual entries are never pruned.
    pub async fn save_knowledge(&self, mut item: KnowledgeItem) -> Result<KnowledgeItem, SyncError> {
        validate_not_blank("knowledge title", &item.title)?;
        self.write_record(&mut item).await?;

        if item.auto {
            let pruned = self
                .retain_newest::<KnowledgeItem>(self.settings.knowledge_auto_cap, |k| k.auto)
                .await?;
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned auto knowledge entries");
            }
        }
        Ok(item)
    }

    /// Delete a knowledge entry for every client. Returns whether it existed.
    pub async fn delete_knowledge(&self, id: &str) -> Result<bool, SyncError> {
        let removed = self
            .router
            .delete(KnowledgeItem::COLLECTION, &[id.to_string()])
            .await?;
        Ok(removed > 0)
    }

    pub async fn load_knowledge(&self) -> Result<Vec<KnowledgeItem>, SyncError> {
        self.load_records().await
    }

    pub async fn watch_knowledge(&self) -> TypedFeed<KnowledgeItem> {
        self.watch().await
    }

    // ========== News ==========

    /// Save a batch of news items. Returns how many were inserted.
    ///
    /// Items whose trimmed `(title, source)` pair is already stored (or
    /// appeared earlier in the batch) are skipped, as are items without a
    /// title and items already past retention. Expired items are pruned
    /// from the store afterwards.
    pub async fn save_news(&self, items: Vec<NewsItem>) -> Result<usize, SyncError> {
        let existing: Vec<NewsItem> = self.load_records().await?;
        let mut seen: HashSet<(String, String)> =
            existing.iter().map(NewsItem::dedup_key).collect();
        let retention_ms = self.settings.news_retention_ms();

        let mut inserted = 0;
        for mut item in items {
            if item.title.trim().is_empty() {
                tracing::warn!(source = %item.source, "Dropping news item without a title");
                continue;
            }
            if !seen.insert(item.dedup_key()) {
                tracing::debug!(title = %item.title, source = %item.source, "Skipping duplicate news item");
                continue;
            }

            item.assign_identity(self.clock.now_ms());
            if item.is_expired(wall_clock_ms(), retention_ms) {
                tracing::debug!(title = %item.title, "Skipping expired news item");
                continue;
            }

            self.write_record(&mut item).await?;
            inserted += 1;
        }

        self.prune_expired_news().await?;
        Ok(inserted)
    }

    /// Remove news items older than the retention window. Returns how many.
    pub async fn prune_expired_news(&self) -> Result<usize, SyncError> {
        let now = wall_clock_ms();
        let retention_ms = self.settings.news_retention_ms();
        let news: Vec<NewsItem> = self.load_records().await?;
        let expired: Vec<String> = news
            .iter()
            .filter(|n| n.is_expired(now, retention_ms))
            .map(|n| n.id.clone())
            .collect();

        self.router.delete(NewsItem::COLLECTION, &expired).await
    }

    pub async fn load_news(&self) -> Result<Vec<NewsItem>, SyncError> {
        self.load_records().await
    }

    pub async fn watch_news(&self) -> TypedFeed<NewsItem> {
        self.watch().await
    }

    // ========== Market ==========

    /// Replace the market snapshot.
    pub async fn save_market(&self, mut snapshot: MarketSnapshot) -> Result<MarketSnapshot, SyncError> {
        self.write_record(&mut snapshot).await?;
        Ok(snapshot)
    }

    pub async fn load_market(&self) -> Result<Option<MarketSnapshot>, SyncError> {
        self.load_singleton().await
    }

    pub async fn watch_market(&self) -> TypedFeed<MarketSnapshot> {
        self.watch().await
    }

    // ========== Status ==========

    /// Replace the shared status. Last write wins.
    pub async fn save_status(&self, mut status: StatusRecord) -> Result<StatusRecord, SyncError> {
        self.write_record(&mut status).await?;
        Ok(status)
    }

    pub async fn load_status(&self) -> Result<Option<StatusRecord>, SyncError> {
        self.load_singleton().await
    }

    pub async fn watch_status(&self) -> TypedFeed<StatusRecord> {
        self.watch().await
    }

    // ========== Remarks ==========

    /// Add a remark and keep only the most recent ones.
    pub async fn add_remark(
        &self,
        text: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Remark, SyncError> {
        self.save_remark(Remark::new(text, source)).await
    }

    pub async fn save_remark(&self, mut remark: Remark) -> Result<Remark, SyncError> {
        validate_not_blank("remark text", &remark.text)?;
        self.write_record(&mut remark).await?;
        self.retain_newest::<Remark>(self.settings.remarks_cap, |_| true)
            .await?;
        Ok(remark)
    }

    pub async fn load_remarks(&self) -> Result<Vec<Remark>, SyncError> {
        self.load_records().await
    }

    pub async fn watch_remarks(&self) -> TypedFeed<Remark> {
        self.watch().await
    }

    // ========== Watchlist ==========

    /// The shared watchlist, empty if none was ever saved.
    pub async fn load_watchlist(&self) -> Result<WatchlistRecord, SyncError> {
        Ok(self.load_singleton().await?.unwrap_or_default())
    }

    /// Put `symbol` at the front of the watchlist.
    pub async fn add_to_watchlist(&self, symbol: &str) -> Result<WatchlistRecord, SyncError> {
        validate_not_blank("watchlist symbol", symbol)?;
        let mut watchlist = self.load_watchlist().await?;
        watchlist.push(symbol, self.settings.watchlist_cap);
        self.save_watchlist(watchlist).await
    }

    pub async fn remove_from_watchlist(&self, symbol: &str) -> Result<WatchlistRecord, SyncError> {
        let mut watchlist = self.load_watchlist().await?;
        if !watchlist.remove(symbol) {
            return Ok(watchlist);
        }
        self.save_watchlist(watchlist).await
    }

    /// Replace the watchlist, re-applying its cap and uniqueness.
    pub async fn save_watchlist(
        &self,
        mut watchlist: WatchlistRecord,
    ) -> Result<WatchlistRecord, SyncError> {
        watchlist.normalize(self.settings.watchlist_cap);
        watchlist.updated_at = self.clock.now_ms();
        self.write_record(&mut watchlist).await?;
        Ok(watchlist)
    }

    pub async fn watch_watchlist(&self) -> TypedFeed<WatchlistRecord> {
        self.watch().await
    }

    // ========== Spoken markers ==========

    pub async fn load_spoken_markers(&self) -> Result<Vec<SpokenMarker>, SyncError> {
        self.load_records().await
    }

    pub async fn watch_spoken_markers(&self) -> TypedFeed<SpokenMarker> {
        self.watch().await
    }

    // ========== Helpers ==========

    async fn write_record<T: Record>(&self, record: &mut T) -> Result<(), SyncError> {
        record.assign_identity(self.clock.now_ms());
        let document =
            Document::from_record(record).map_err(|e| SyncError::persist(T::COLLECTION, e))?;
        self.router.write(T::COLLECTION, document).await?;
        Ok(())
    }

    async fn load_records<T: Record>(&self) -> Result<Vec<T>, SyncError> {
        let documents = self.router.list(T::COLLECTION).await?;
        Ok(decode_documents(&documents))
    }

    async fn load_singleton<T: Record>(&self) -> Result<Option<T>, SyncError> {
        let document = self.router.get(T::COLLECTION, SINGLETON_KEY).await?;
        Ok(document.as_ref().and_then(decode_document))
    }

    async fn watch<T: Record>(&self) -> TypedFeed<T> {
        let subscription = self.router.subscribe(T::COLLECTION).await;
        TypedFeed::new(subscription, Arc::clone(&self.emitter))
    }

    /// Delete the oldest records matching `filter` beyond the newest `keep`.
    async fn retain_newest<T: Record>(
        &self,
        keep: usize,
        filter: impl Fn(&T) -> bool + Send,
    ) -> Result<usize, SyncError> {
        let records: Vec<T> = self.load_records().await?;
        let mut matching: Vec<&T> = records.iter().filter(|r| filter(r)).collect();
        if matching.len() <= keep {
            return Ok(0);
        }

        matching.sort_by_key(|r| r.timestamp());
        let excess = matching.len() - keep;
        let ids: Vec<String> = matching[..excess]
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        self.router.delete(T::COLLECTION, &ids).await
    }
}

fn validate_not_blank(what: &str, value: &str) -> Result<(), SyncError> {
    if value.trim().is_empty() {
        return Err(SyncError::Validation(format!("{what} cannot be empty")));
    }
    Ok(())
}

impl std::fmt::Debug for SyncFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncFacade")
            .field("router", &self.router)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
