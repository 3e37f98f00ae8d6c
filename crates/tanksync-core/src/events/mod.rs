//! UI-facing sync events.
//!
//! Typed feeds emit one [`SyncEvent::Snapshot`] per delivery and, for
//! deliveries after the first, a [`SyncEvent::Change`] carrying the id diff
//! when it is not empty.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "snapshot", "collection": "news", "items": [], "isInitialLoad": true }
//! ```

use serde::{Deserialize, Serialize};

use crate::collections::Collection;

/// Events describing what a subscription delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The full current contents of a collection.
    Snapshot {
        collection: Collection,
        items: Vec<serde_json::Value>,
        /// Set on the first delivery of a subscription only.
        #[serde(rename = "isInitialLoad")]
        is_initial_load: bool,
    },

    /// The difference between two consecutive snapshots.
    Change {
        collection: Collection,
        added: Vec<serde_json::Value>,
        modified: Vec<serde_json::Value>,
        removed: Vec<serde_json::Value>,
    },
}

impl SyncEvent {
    /// Get the event name for transports that route by name.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "sync:snapshot",
            Self::Change { .. } => "sync:change",
        }
    }

    pub const fn collection(&self) -> Collection {
        match self {
            Self::Snapshot { collection, .. } | Self::Change { collection, .. } => *collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serialization() {
        let event = SyncEvent::Snapshot {
            collection: Collection::SpokenNews,
            items: vec![serde_json::json!({ "id": "a" })],
            is_initial_load: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["collection"], "spoken_news");
        assert_eq!(json["isInitialLoad"], true);
    }

    #[test]
    fn test_change_round_trip() {
        let event = SyncEvent::Change {
            collection: Collection::Knowledge,
            added: vec![serde_json::json!({ "id": "n" })],
            modified: Vec::new(),
            removed: Vec::new(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"change\""));
        let back: SyncEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.event_name(), "sync:change");
    }
}
