//! Show command handler.
//!
//! Prints the current contents of one collection, newest first.

use anyhow::Result;

use tanksync_core::Collection;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_separator;
use crate::presentation::records::{
    knowledge_line, market_lines, news_line, remark_line, spoken_line, status_lines,
    watchlist_line,
};

pub async fn execute(ctx: &CliContext, collection: &str, limit: usize) -> Result<()> {
    let collection: Collection = collection.parse().map_err(CliError::from)?;
    let facade = ctx.facade();

    let lines = match collection {
        Collection::Knowledge => newest(
            facade.load_knowledge().await.map_err(CliError::from)?,
            limit,
            knowledge_line,
        ),
        Collection::News => newest(
            facade.load_news().await.map_err(CliError::from)?,
            limit,
            news_line,
        ),
        Collection::Remarks => newest(
            facade.load_remarks().await.map_err(CliError::from)?,
            limit,
            remark_line,
        ),
        Collection::SpokenNews => newest(
            facade.load_spoken_markers().await.map_err(CliError::from)?,
            limit,
            spoken_line,
        ),
        Collection::Market => facade
            .load_market()
            .await
            .map_err(CliError::from)?
            .map(|snapshot| market_lines(&snapshot))
            .unwrap_or_default(),
        Collection::Status => facade
            .load_status()
            .await
            .map_err(CliError::from)?
            .map(|status| status_lines(&status))
            .unwrap_or_default(),
        Collection::Watchlist => vec![watchlist_line(
            &facade.load_watchlist().await.map_err(CliError::from)?,
        )],
    };

    if lines.is_empty() {
        println!("No records in {collection}.");
        return Ok(());
    }

    if let Some(backend) = ctx.backend() {
        println!("{collection} ({backend} store)");
    }
    print_separator(80);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Records arrive oldest first; show the newest `limit`.
fn newest<T>(records: Vec<T>, limit: usize, render: fn(&T) -> String) -> Vec<String> {
    records.iter().rev().take(limit).map(render).collect()
}
