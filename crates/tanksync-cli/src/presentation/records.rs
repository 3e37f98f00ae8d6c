//! One-line renderings of shared records.
//!
//! Format-only: records arrive already ordered and filtered.

use tanksync_core::{
    KnowledgeItem, MarketSnapshot, NewsItem, Remark, SpokenMarker, StatusRecord,
    WatchlistRecord,
};

use super::tables::{format_timestamp, truncate_string};

pub fn news_line(item: &NewsItem) -> String {
    format!(
        "{:<19}  {:<16}  {}",
        format_timestamp(item.published_at),
        truncate_string(&item.source, 16),
        truncate_string(&item.title, 80)
    )
}

pub fn knowledge_line(item: &KnowledgeItem) -> String {
    let origin = if item.auto { "auto" } else { "manual" };
    format!(
        "{:<19}  {:<11}  {:<6}  {}",
        format_timestamp(item.created_at),
        format!("{:?}", item.kind).to_uppercase(),
        origin,
        truncate_string(&item.title, 70)
    )
}

pub fn remark_line(remark: &Remark) -> String {
    format!(
        "{:<19}  {:<12}  {}",
        format_timestamp(remark.created_at),
        truncate_string(&remark.source, 12),
        remark.text
    )
}

pub fn spoken_line(marker: &SpokenMarker) -> String {
    format!("{:<19}  {}", format_timestamp(marker.spoken_at), marker.id)
}

pub fn market_lines(snapshot: &MarketSnapshot) -> Vec<String> {
    let mut lines = vec![format!("Updated {}", format_timestamp(snapshot.updated_at))];
    lines.extend(snapshot.tokens.iter().map(|token| {
        format!(
            "{:<10}  {:>14.6}  {:>+7.2}%  {}",
            truncate_string(&token.symbol, 10),
            token.price_usd,
            token.change_24h_pct,
            token.chain
        )
    }));
    lines
}

pub fn status_lines(status: &StatusRecord) -> Vec<String> {
    vec![
        format!("Temperature  {:.1} °C", status.temp),
        format!("Ice level    {:.0}%", status.ice_level),
        format!("Snow         {}", status.snow_state),
        format!("Aurora       {}", status.aurora_state),
        format!("Mood         {}", status.mood),
        format!("Health       {:.0}", status.health),
        format!("Updated      {}", format_timestamp(status.updated_at)),
    ]
}

pub fn watchlist_line(watchlist: &WatchlistRecord) -> String {
    if watchlist.symbols.is_empty() {
        "(empty)".to_string()
    } else {
        watchlist.symbols.join(", ")
    }
}
