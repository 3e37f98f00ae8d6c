//! Remark command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, text: &str, source: &str) -> Result<()> {
    let remark = ctx
        .facade()
        .add_remark(text, source)
        .await
        .map_err(CliError::from)?;
    println!("Remark {} saved", remark.id);
    Ok(())
}
