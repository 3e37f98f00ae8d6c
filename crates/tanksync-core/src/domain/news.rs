//! Syndicated news items.

use serde::{Deserialize, Serialize};

use super::{Record, fill_id, fill_timestamp};
use crate::collections::Collection;

/// A news item collected from a syndication feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub source: String,
    #[serde(default)]
    pub url: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub published_at: i64,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            content: String::new(),
            source: source.into(),
            url: String::new(),
            published_at: 0,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn published(mut self, published_at: i64) -> Self {
        self.published_at = published_at;
        self
    }

    /// Identity used for write-time dedup: the trimmed `(title, source)` pair.
    pub fn dedup_key(&self) -> (String, String) {
        (self.title.trim().to_string(), self.source.trim().to_string())
    }

    /// Whether the item is at least `retention_ms` old at `now_ms`.
    pub const fn is_expired(&self, now_ms: i64, retention_ms: i64) -> bool {
        now_ms - self.published_at >= retention_ms
    }
}

impl Record for NewsItem {
    const COLLECTION: Collection = Collection::News;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.published_at
    }

    fn assign_identity(&mut self, now_ms: i64) {
        fill_id(&mut self.id);
        fill_timestamp(&mut self.published_at, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_ignores_surrounding_whitespace() {
        let a = NewsItem::new("BTC rallies", "X");
        let b = NewsItem::new("  BTC rallies ", "X ");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn expiry_is_inclusive() {
        let item = NewsItem::new("t", "s").published(1_000);
        assert!(!item.is_expired(1_999, 1_000));
        assert!(item.is_expired(2_000, 1_000));
    }
}
