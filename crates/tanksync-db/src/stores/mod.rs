//! `SQLite` adapters for the [`DurableStore`](tanksync_core::DurableStore) port.

mod document_store;
mod local_store;

pub use document_store::SqliteDocumentStore;
pub use local_store::SqliteLocalStore;
