//! Announcement ledger port.

use async_trait::async_trait;

/// Shared "has this been announced" set.
///
/// Neither operation fails: `was_spoken` answers `false` when no store can
/// be consulted, and `mark_spoken` logs and swallows persistence errors.
#[async_trait]
pub trait SpokenLedgerPort: Send + Sync {
    async fn was_spoken(&self, id: &str) -> bool;

    /// Record `id` as announced. Repeated marks are no-ops.
    async fn mark_spoken(&self, id: &str);
}
