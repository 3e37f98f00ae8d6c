//! Shared symbol watchlist.

use serde::{Deserialize, Serialize};

use super::{Record, fill_timestamp};
use crate::collections::{Collection, SINGLETON_KEY};

/// The shared watchlist: newest symbol first, unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchlistRecord {
    pub symbols: Vec<String>,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl WatchlistRecord {
    /// Put `symbol` at the front, dropping any case-insensitive duplicate and
    /// evicting the oldest entries beyond `cap`.
    ///
    /// Returns `false` for a blank symbol.
    pub fn push(&mut self, symbol: &str, cap: usize) -> bool {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return false;
        }
        self.symbols.retain(|s| !s.eq_ignore_ascii_case(symbol));
        self.symbols.insert(0, symbol.to_string());
        self.symbols.truncate(cap);
        true
    }

    /// Remove `symbol` (ignoring case). Returns whether anything was removed.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let before = self.symbols.len();
        self.symbols
            .retain(|s| !s.eq_ignore_ascii_case(symbol.trim()));
        self.symbols.len() != before
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols
            .iter()
            .any(|s| s.eq_ignore_ascii_case(symbol.trim()))
    }

    /// Re-apply the watchlist invariants to a record built elsewhere: blank
    /// entries dropped, first occurrence of each symbol kept, at most `cap`.
    pub fn normalize(&mut self, cap: usize) {
        let mut kept: Vec<String> = Vec::with_capacity(self.symbols.len().min(cap));
        for symbol in &self.symbols {
            let symbol = symbol.trim();
            if symbol.is_empty() || kept.iter().any(|k| k.eq_ignore_ascii_case(symbol)) {
                continue;
            }
            kept.push(symbol.to_string());
        }
        kept.truncate(cap);
        self.symbols = kept;
    }
}

impl Record for WatchlistRecord {
    const COLLECTION: Collection = Collection::Watchlist;

    fn id(&self) -> &str {
        SINGLETON_KEY
    }

    fn timestamp(&self) -> i64 {
        self.updated_at
    }

    fn assign_identity(&mut self, now_ms: i64) {
        fill_timestamp(&mut self.updated_at, now_ms);
    }
}
