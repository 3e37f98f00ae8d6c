//! Ingest normalization.
//!
//! Raw JSON records fetched from a [`FeedSource`] are normalized into domain
//! records and written through the [`SyncFacade`]. Records missing a
//! required field are dropped with a warning; the rest of the batch is still
//! written.

use std::sync::Arc;

use chrono::DateTime;
use serde_json::Value;

use super::sync_facade::SyncFacade;
use crate::clock::wall_clock_ms;
use crate::domain::{KnowledgeItem, KnowledgeType, MarketSnapshot, NewsItem, TokenQuote};
use crate::ports::{FeedKind, FeedSource, SyncError};

/// Outcome of one refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Raw records returned by the source.
    pub fetched: usize,
    /// Records that normalized cleanly.
    pub accepted: usize,
    /// Records dropped as malformed.
    pub dropped: usize,
    /// Records the store actually gained (after dedup).
    pub written: usize,
}

/// Pulls from data sources into the shared collections.
#[derive(Debug)]
pub struct IngestService {
    facade: Arc<SyncFacade>,
}

impl IngestService {
    pub const fn new(facade: Arc<SyncFacade>) -> Self {
        Self { facade }
    }

    /// Fetch one batch from `source` and store it.
    pub async fn refresh(&self, source: &dyn FeedSource) -> Result<IngestReport, SyncError> {
        let raw = source.fetch().await?;
        let fetched = raw.len();
        let name = source.name();

        let report = match source.kind() {
            FeedKind::News => {
                let items = normalize_all(name, &raw, normalize_news);
                let accepted = items.len();
                let written = self.facade.save_news(items).await?;
                IngestReport {
                    fetched,
                    accepted,
                    dropped: fetched - accepted,
                    written,
                }
            }
            FeedKind::Market => {
                let tokens = normalize_all(name, &raw, normalize_token);
                let accepted = tokens.len();
                self.facade.save_market(MarketSnapshot::new(tokens)).await?;
                IngestReport {
                    fetched,
                    accepted,
                    dropped: fetched - accepted,
                    written: accepted,
                }
            }
            FeedKind::Knowledge => {
                let items = normalize_all(name, &raw, normalize_knowledge);
                let accepted = items.len();
                for item in items {
                    self.facade.save_knowledge(item).await?;
                }
                IngestReport {
                    fetched,
                    accepted,
                    dropped: fetched - accepted,
                    written: accepted,
                }
            }
        };

        tracing::info!(
            source = name,
            fetched = report.fetched,
            dropped = report.dropped,
            written = report.written,
            "Ingested batch"
        );
        Ok(report)
    }
}

fn normalize_all<T>(
    source: &str,
    raw: &[Value],
    normalize: fn(&str, &Value) -> Result<T, String>,
) -> Vec<T> {
    raw.iter()
        .filter_map(|value| match normalize(source, value) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::warn!(source, %reason, "Dropping malformed record");
                None
            }
        })
        .collect()
}

/// Normalize a raw news record. `title` is required; `source` defaults to
/// the feed name and `publishedAt` accepts epoch milliseconds or RFC 3339.
pub fn normalize_news(feed: &str, raw: &Value) -> Result<NewsItem, String> {
    let title = required_str(raw, "title")?;
    let source = optional_str(raw, "source").unwrap_or_else(|| feed.to_string());
    let content = optional_str(raw, "content")
        .or_else(|| optional_str(raw, "description"))
        .unwrap_or_default();
    let url = optional_str(raw, "url")
        .or_else(|| optional_str(raw, "link"))
        .unwrap_or_default();
    let published_at = timestamp(raw, "publishedAt").unwrap_or(0);

    Ok(NewsItem::new(title, source)
        .with_content(content)
        .with_url(url)
        .published(published_at))
}

/// Normalize a raw token quote. `symbol` and `priceUsd` are required;
/// numeric fields may arrive as strings.
pub fn normalize_token(feed: &str, raw: &Value) -> Result<TokenQuote, String> {
    let symbol = required_str(raw, "symbol")?.to_uppercase();
    let price_usd = number(raw, "priceUsd").ok_or_else(|| "missing priceUsd".to_string())?;

    Ok(TokenQuote {
        name: optional_str(raw, "name").unwrap_or_else(|| symbol.clone()),
        symbol,
        price_usd,
        change_24h_pct: number(raw, "change24hPct").unwrap_or_default(),
        volume_usd: number(raw, "volumeUsd").unwrap_or_default(),
        liquidity_usd: number(raw, "liquidityUsd").unwrap_or_default(),
        chain: optional_str(raw, "chain").unwrap_or_default(),
        source_type: optional_str(raw, "sourceType").unwrap_or_else(|| feed.to_string()),
        url: optional_str(raw, "url").unwrap_or_default(),
        observed_at: timestamp(raw, "observedAt").unwrap_or_else(wall_clock_ms),
    })
}

/// Normalize a raw knowledge record into an auto-generated entry.
pub fn normalize_knowledge(feed: &str, raw: &Value) -> Result<KnowledgeItem, String> {
    let title = required_str(raw, "title")?;
    let content = required_str(raw, "content")?;
    let kind = raw
        .get("type")
        .and_then(|v| serde_json::from_value::<KnowledgeType>(v.clone()).ok())
        .unwrap_or_default();
    let source = optional_str(raw, "source").unwrap_or_else(|| feed.to_string());
    let tags = raw
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut item = KnowledgeItem::new(title, content, kind, source)
        .with_tags(tags)
        .automatic();
    if let Some(url) = optional_str(raw, "url") {
        item = item.with_url(url);
    }
    Ok(item)
}

fn optional_str(raw: &Value, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_str(raw: &Value, field: &str) -> Result<String, String> {
    optional_str(raw, field).ok_or_else(|| format!("missing {field}"))
}

fn number(raw: &Value, field: &str) -> Option<f64> {
    let value = match raw.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|n| n.is_finite())
}

fn timestamp(raw: &Value, field: &str) -> Option<i64> {
    match raw.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}
