//! Command handlers that delegate to the sync facade.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call `SyncFacade` / ledger methods
//!   3. Format output for the terminal
//!
//! Handlers should NOT open stores or contain sync logic.

pub mod follow;
pub mod paths;
pub mod post_news;
pub mod remark;
pub mod show;
pub mod spoken;
pub mod watchlist;
