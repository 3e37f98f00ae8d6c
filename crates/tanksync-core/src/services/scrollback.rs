//! Display scrollback.
//!
//! The durable store prunes old items; the scrollback keeps showing them.
//! Each snapshot is merged in by id and nothing is dropped when it vanishes
//! from the store, only when the cache is full.

use std::collections::HashMap;

use crate::domain::Record;

/// Bounded, newest-first merge of every record ever delivered.
#[derive(Debug, Clone)]
pub struct ScrollbackCache<T> {
    capacity: usize,
    entries: HashMap<String, T>,
}

impl<T: Record> ScrollbackCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Merge a snapshot (or any batch of records). Same-id records are
    /// replaced; the oldest entries are evicted past capacity.
    pub fn merge<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        for record in records {
            self.entries.insert(record.id().to_string(), record.clone());
        }
        self.evict();
    }

    fn evict(&mut self) {
        if self.entries.len() <= self.capacity {
            return;
        }
        let mut by_age: Vec<(i64, String)> = self
            .entries
            .values()
            .map(|r| (r.timestamp(), r.id().to_string()))
            .collect();
        by_age.sort();
        let excess = self.entries.len() - self.capacity;
        for (_, id) in by_age.into_iter().take(excess) {
            self.entries.remove(&id);
        }
    }

    /// Cached records, newest first.
    pub fn items(&self) -> Vec<T> {
        let mut items: Vec<T> = self.entries.values().cloned().collect();
        items.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });
        items
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewsItem;

    fn news(id: &str, at: i64) -> NewsItem {
        let mut item = NewsItem::new(format!("title {id}"), "X").published(at);
        item.id = id.to_string();
        item
    }

    #[test]
    fn pruned_items_stay_visible() {
        let mut cache = ScrollbackCache::new(10);
        cache.merge(&[news("a", 1), news("b", 2)]);
        cache.merge(&[news("b", 2)]);

        let ids: Vec<_> = cache.items().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn oldest_entries_are_evicted_past_capacity() {
        let mut cache = ScrollbackCache::new(2);
        cache.merge(&[news("a", 1), news("b", 2), news("c", 3)]);
        assert_eq!(cache.len(), 2);
        assert!(cache.items().iter().all(|n| n.id != "a"));
    }

    #[test]
    fn same_id_is_replaced() {
        let mut cache = ScrollbackCache::new(5);
        cache.merge(&[news("a", 1)]);
        let mut updated = news("a", 1);
        updated.content = "edited".to_string();
        cache.merge(&[updated]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.items()[0].content, "edited");
    }
}
