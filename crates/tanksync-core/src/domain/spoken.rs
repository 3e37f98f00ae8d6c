//! Announcement ledger markers.

use serde::{Deserialize, Serialize};

use super::{Record, fill_timestamp};
use crate::collections::Collection;

/// Presence of a marker means the item with the same id has been announced
/// to every user. Markers are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpokenMarker {
    /// Id of the announced item.
    pub id: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub spoken_at: i64,
}

impl SpokenMarker {
    pub fn new(id: impl Into<String>, spoken_at: i64) -> Self {
        Self {
            id: id.into(),
            spoken_at,
        }
    }
}

impl Record for SpokenMarker {
    const COLLECTION: Collection = Collection::SpokenNews;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.spoken_at
    }

    // The id is the announced item's id and is never generated here.
    fn assign_identity(&mut self, now_ms: i64) {
        fill_timestamp(&mut self.spoken_at, now_ms);
    }
}
