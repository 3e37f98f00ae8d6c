//! Market snapshot and token quotes.

use serde::{Deserialize, Serialize};

use super::{Record, fill_timestamp};
use crate::collections::{Collection, SINGLETON_KEY};

/// A single token quote as observed on a market feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenQuote {
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    #[serde(rename = "change24hPct")]
    pub change_24h_pct: f64,
    pub volume_usd: f64,
    pub liquidity_usd: f64,
    pub chain: String,
    /// Kind of feed that produced the quote (e.g. `"dex"`, `"trending"`).
    pub source_type: String,
    pub url: String,
    /// Epoch milliseconds.
    pub observed_at: i64,
}

/// The shared market snapshot. Every write replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketSnapshot {
    pub tokens: Vec<TokenQuote>,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl MarketSnapshot {
    pub const fn new(tokens: Vec<TokenQuote>) -> Self {
        Self {
            tokens,
            updated_at: 0,
        }
    }

    /// Look up a quote by symbol, case-insensitively.
    pub fn quote(&self, symbol: &str) -> Option<&TokenQuote> {
        self.tokens
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
    }
}

impl Record for MarketSnapshot {
    const COLLECTION: Collection = Collection::Market;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_lookup_is_case_insensitive() {
        let snapshot = MarketSnapshot::new(vec![TokenQuote {
            symbol: "SOL".to_string(),
            price_usd: 140.5,
            ..TokenQuote::default()
        }]);
        assert!(snapshot.quote("sol").is_some());
        assert!(snapshot.quote("eth").is_none());
    }

    #[test]
    fn change_field_uses_wire_name() {
        let quote = TokenQuote {
            change_24h_pct: -3.5,
            ..TokenQuote::default()
        };
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["change24hPct"], -3.5);
    }
}
