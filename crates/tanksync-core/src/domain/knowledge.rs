//! Knowledge entries.

use serde::{Deserialize, Serialize};

use super::{Record, fill_id, fill_timestamp};
use crate::collections::Collection;

/// Category of a knowledge entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnowledgeType {
    #[default]
    Knowledge,
    News,
    Market,
    Prediction,
    Observation,
}

/// A knowledge entry shared by every client.
///
/// Entries with `auto = true` were generated from a data source and are
/// subject to retention pruning; manual entries are kept until deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: KnowledgeType,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub auto: bool,
}

impl KnowledgeItem {
    /// Create an unsaved entry; id and timestamp are assigned on write.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        kind: KnowledgeType,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            content: content.into(),
            kind,
            source: source.into(),
            url: None,
            created_at: 0,
            tags: Vec::new(),
            auto: false,
        }
    }

    /// Mark the entry as auto-generated.
    #[must_use]
    pub fn automatic(mut self) -> Self {
        self.auto = true;
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl Record for KnowledgeItem {
    const COLLECTION: Collection = Collection::Knowledge;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.created_at
    }

    fn assign_identity(&mut self, now_ms: i64) {
        fill_id(&mut self.id);
        fill_timestamp(&mut self.created_at, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_in_screaming_case() {
        let item = KnowledgeItem::new("Ice shelf", "Cracking", KnowledgeType::Observation, "cam");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "OBSERVATION");
        assert_eq!(json["createdAt"], 0);
        assert!(json.get("url").is_none());
    }

    #[test]
    fn assign_identity_keeps_existing_values() {
        let mut item = KnowledgeItem::new("a", "b", KnowledgeType::Knowledge, "s");
        item.id = "fixed".to_string();
        item.created_at = 42;
        item.assign_identity(1_000);
        assert_eq!(item.id, "fixed");
        assert_eq!(item.created_at, 42);
    }

    #[test]
    fn assign_identity_fills_blanks() {
        let mut item = KnowledgeItem::new("a", "b", KnowledgeType::Knowledge, "s");
        item.assign_identity(1_000);
        assert!(!item.id.is_empty());
        assert_eq!(item.created_at, 1_000);
    }
}
