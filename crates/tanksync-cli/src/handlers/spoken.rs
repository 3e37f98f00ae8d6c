//! Spoken command handler.
//!
//! Reads (and optionally writes) the shared announcement ledger.

use anyhow::Result;

use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext, id: &str, mark: bool) -> Result<()> {
    let ledger = ctx.sync.ledger();
    if mark {
        ledger.mark_spoken(id).await;
    }

    if ledger.was_spoken(id).await {
        println!("{id}: announced");
    } else {
        println!("{id}: not announced");
    }
    Ok(())
}
