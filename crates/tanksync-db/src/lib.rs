//! `SQLite` storage adapters for tanksync.
//!
//! Two stores implement the core [`DurableStore`](tanksync_core::DurableStore)
//! port: a shared document store that several processes may open at once,
//! and a per-client key-value store used when the shared one is unreachable.
//! [`StoreFactory`] wires them into a [`SyncContext`](tanksync_core::SyncContext).

#![deny(unsafe_code)]

pub mod factory;
pub mod setup;
pub mod stores;

pub use factory::{StoreConfig, StoreFactory};

#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestStores;

pub use stores::{SqliteDocumentStore, SqliteLocalStore};

pub use setup::{connect_pool, setup_local_store, sqlite_url};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
