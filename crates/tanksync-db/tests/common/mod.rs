//! Shared helpers for tanksync-db integration tests.

use std::path::Path;
use std::sync::Arc;

use tanksync_core::{NoopEmitter, SyncContext, SyncSettings};
use tanksync_db::{StoreConfig, StoreFactory, sqlite_url};

/// Shared store URL that can never open: its parent directory is missing.
pub const UNREACHABLE_REMOTE_URL: &str = "sqlite:/nonexistent-dir/sub/remote.db";

/// Settings with a short poll interval so cross-process changes land quickly.
pub fn fast_settings() -> SyncSettings {
    SyncSettings {
        poll_interval_ms: 20,
        ..SyncSettings::default()
    }
}

/// A client with its own local file, sharing `shared_db` with other clients.
pub async fn client(dir: &Path, name: &str, shared_db: &Path) -> SyncContext {
    let config = StoreConfig {
        remote_url: Some(sqlite_url(shared_db)),
        local_path: dir.join(format!("{name}-local.db")),
    };
    StoreFactory::build_context(&config, fast_settings(), Arc::new(NoopEmitter::new()))
        .await
        .unwrap()
}

/// A client whose shared store is unreachable.
// Only some test binaries run without a shared store
#[allow(dead_code)]
pub async fn stranded_client(dir: &Path) -> SyncContext {
    let config = StoreConfig {
        remote_url: Some(UNREACHABLE_REMOTE_URL.to_string()),
        local_path: dir.join("local.db"),
    };
    StoreFactory::build_context(&config, SyncSettings::default(), Arc::new(NoopEmitter::new()))
        .await
        .unwrap()
}
