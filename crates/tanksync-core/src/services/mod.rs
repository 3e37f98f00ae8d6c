//! Core services - the sync layer's business logic.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They don't know about concrete store implementations.

mod dedup_ledger;
mod feed;
mod ingest;
mod router;
mod scrollback;
mod sync_context;
mod sync_facade;

#[cfg(test)]
pub(crate) mod test_support;

pub use dedup_ledger::DedupLedger;
pub use feed::TypedFeed;
pub use ingest::{IngestReport, IngestService, normalize_knowledge, normalize_news, normalize_token};
pub use router::StoreRouter;
pub use scrollback::ScrollbackCache;
pub use sync_context::SyncContext;
pub use sync_facade::SyncFacade;
