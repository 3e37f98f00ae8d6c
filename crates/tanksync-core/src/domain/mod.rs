//! Core domain types.
//!
//! These types represent the shared records, independent of any
//! infrastructure concerns (document store, key-value store, etc.).
//!
//! # Structure
//!
//! - `knowledge` - Knowledge entries (`KnowledgeItem`, `KnowledgeType`)
//! - `news` - Syndicated news (`NewsItem`)
//! - `market` - Market snapshot and token quotes
//! - `status` - Shared world status
//! - `watchlist` - Shared symbol watchlist
//! - `remark` - Short remarks
//! - `spoken` - Announcement ledger markers

mod knowledge;
mod market;
mod news;
mod remark;
mod spoken;
mod status;
mod watchlist;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::collections::Collection;

pub use knowledge::{KnowledgeItem, KnowledgeType};
pub use market::{MarketSnapshot, TokenQuote};
pub use news::NewsItem;
pub use remark::Remark;
pub use spoken::SpokenMarker;
pub use status::StatusRecord;
pub use watchlist::WatchlistRecord;

/// A record stored in one of the shared collections.
///
/// Ids must be stable across deliveries: the change demultiplexer diffs
/// snapshots by id.
pub trait Record: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static {
    /// Collection holding records of this type.
    const COLLECTION: Collection;

    /// Stable identifier.
    fn id(&self) -> &str;

    /// Ordering timestamp in epoch milliseconds.
    fn timestamp(&self) -> i64;

    /// Fill in an id and timestamp the caller left empty.
    ///
    /// Existing values are never overwritten.
    fn assign_identity(&mut self, now_ms: i64);
}

/// Generate a fresh record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn fill_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = new_record_id();
    }
}

pub(crate) fn fill_timestamp(ts: &mut i64, now_ms: i64) {
    if *ts <= 0 {
        *ts = now_ms;
    }
}
