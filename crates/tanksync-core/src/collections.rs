//! Collection catalogue.
//!
//! Every record lives in exactly one named collection. A collection is either
//! a singleton document (replaced wholesale) or an append collection keyed by
//! record id. The catalogue also fixes the key each collection uses in the
//! per-client local store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document id used by every singleton collection.
pub const SINGLETON_KEY: &str = "current";

/// Logical collections shared by all clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Knowledge,
    News,
    Market,
    Status,
    Watchlist,
    Remarks,
    SpokenNews,
}

/// Storage shape of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Exactly one document, replaced on every write.
    Singleton,
    /// Many documents keyed by id, listed in timestamp order.
    Append,
}

/// How a write treats an existing document with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Replace the singleton document.
    Replace,
    /// Insert, or overwrite the document with the same id (last write wins).
    Upsert,
    /// Insert only when no document with the same id exists.
    InsertIfAbsent,
}

impl Collection {
    /// All collections, in catalogue order.
    pub const ALL: [Self; 7] = [
        Self::Knowledge,
        Self::News,
        Self::Market,
        Self::Status,
        Self::Watchlist,
        Self::Remarks,
        Self::SpokenNews,
    ];

    /// Name of the collection in the shared document store.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::News => "news",
            Self::Market => "market",
            Self::Status => "status",
            Self::Watchlist => "watchlist",
            Self::Remarks => "remarks",
            Self::SpokenNews => "spoken_news",
        }
    }

    pub const fn kind(self) -> CollectionKind {
        match self {
            Self::Market | Self::Status | Self::Watchlist => CollectionKind::Singleton,
            Self::Knowledge | Self::News | Self::Remarks | Self::SpokenNews => {
                CollectionKind::Append
            }
        }
    }

    pub const fn is_singleton(self) -> bool {
        matches!(self.kind(), CollectionKind::Singleton)
    }

    pub const fn write_policy(self) -> WritePolicy {
        match self {
            Self::Market | Self::Status | Self::Watchlist => WritePolicy::Replace,
            // Spoken markers are append-only: a second mark never touches the first.
            Self::SpokenNews => WritePolicy::InsertIfAbsent,
            Self::Knowledge | Self::News | Self::Remarks => WritePolicy::Upsert,
        }
    }

    /// Path of the document a singleton write targets (e.g. `market/current`).
    pub fn document_path(self, id: &str) -> String {
        format!("{}/{}", self.name(), id)
    }

    /// Key under which the local fallback store persists this collection.
    ///
    /// The status record is kept whole under `arcticStatus`; its scalar
    /// fields are additionally mirrored into [`STATUS_SCALAR_KEYS`].
    pub const fn local_key(self) -> &'static str {
        match self {
            Self::Knowledge => "tank_knowledge_db",
            Self::News => "allNews",
            Self::Market => "marketTokens",
            Self::Status => "arcticStatus",
            Self::Watchlist => "tank_watchlist",
            Self::Remarks => "tank_remarks",
            Self::SpokenNews => "tank_spoken_news",
        }
    }
}

/// Local keys mirroring individual status fields: `(field, key)`.
pub const STATUS_SCALAR_KEYS: [(&str, &str); 4] = [
    ("temp", "arcticTemp"),
    ("iceLevel", "arcticIce"),
    ("snowState", "arcticSnow"),
    ("auroraState", "arcticAurora"),
];

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown collection name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown collection: {0}")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_collections_replace() {
        for collection in [Collection::Market, Collection::Status, Collection::Watchlist] {
            assert!(collection.is_singleton());
            assert_eq!(collection.write_policy(), WritePolicy::Replace);
        }
    }

    #[test]
    fn spoken_ledger_never_overwrites() {
        assert_eq!(
            Collection::SpokenNews.write_policy(),
            WritePolicy::InsertIfAbsent
        );
    }

    #[test]
    fn parse_round_trips_names() {
        for collection in Collection::ALL {
            assert_eq!(collection.name().parse::<Collection>(), Ok(collection));
        }
        assert_eq!("spoken-news".parse::<Collection>(), Ok(Collection::SpokenNews));
        assert!("weather".parse::<Collection>().is_err());
    }

    #[test]
    fn local_keys_are_unique() {
        let mut keys: Vec<_> = Collection::ALL.iter().map(|c| c.local_key()).collect();
        keys.extend(STATUS_SCALAR_KEYS.iter().map(|(_, key)| *key));
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn document_path_joins_name_and_id() {
        assert_eq!(
            Collection::Market.document_path(SINGLETON_KEY),
            "market/current"
        );
    }
}
