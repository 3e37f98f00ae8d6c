//! Watchlist command handlers.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::records::watchlist_line;

/// Push each symbol to the front of the watchlist, in argument order.
pub async fn add(ctx: &CliContext, symbols: &[String]) -> Result<()> {
    let mut watchlist = None;
    for symbol in symbols {
        watchlist = Some(
            ctx.facade()
                .add_to_watchlist(symbol)
                .await
                .map_err(CliError::from)?,
        );
    }

    if let Some(watchlist) = watchlist {
        println!("Watchlist: {}", watchlist_line(&watchlist));
    }
    Ok(())
}

pub async fn remove(ctx: &CliContext, symbol: &str) -> Result<()> {
    let before = ctx.facade().load_watchlist().await.map_err(CliError::from)?;
    if !before.contains(symbol) {
        println!("{symbol} is not on the watchlist");
        return Ok(());
    }

    let watchlist = ctx
        .facade()
        .remove_from_watchlist(symbol)
        .await
        .map_err(CliError::from)?;
    println!("Watchlist: {}", watchlist_line(&watchlist));
    Ok(())
}
