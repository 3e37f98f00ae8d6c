//! Connection and schema setup.
//!
//! Both stores are plain `SQLite` files. The shared store may be opened by
//! several processes at once, so connections use WAL and a busy timeout.
//! Every schema statement is `IF NOT EXISTS` and safe to repeat.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use tanksync_core::SyncSettings;

use crate::stores::SqliteLocalStore;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a pool for a `sqlite:` URL, creating the file if it is missing.
///
/// In-memory URLs get a single connection so every query sees the same
/// database.
pub async fn connect_pool(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    };

    pool_options.connect_with(options).await
}

/// `sqlite:` URL for a file path.
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

/// Create the shared document store schema.
///
/// `documents` holds every collection; `collection_revisions` is bumped in
/// the same transaction as each change so other processes can detect it.
pub async fn create_document_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            data TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (collection, id)
        )
        ",
    )
    .execute(pool)
    .await?;

    // Listing is always by collection in timestamp order
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(collection, created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS collection_revisions (
            collection TEXT PRIMARY KEY NOT NULL,
            revision INTEGER NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the per-client key-value schema.
pub async fn create_local_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS local_kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Open this client's local store, creating its file and schema.
///
/// # Example
///
/// ```rust,no_run
/// use tanksync_core::SyncSettings;
/// use tanksync_db::setup_local_store;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = setup_local_store(Path::new("/tmp/local.db"), &SyncSettings::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_local_store(db_path: &Path, settings: &SyncSettings) -> Result<SqliteLocalStore> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = connect_pool(&sqlite_url(db_path)).await?;
    create_local_schema(&pool).await?;
    Ok(SqliteLocalStore::new(pool).with_spoken_cap(settings.local_spoken_cap))
}

/// In-memory pool with both schemas applied.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = connect_pool("sqlite::memory:").await?;
    create_document_schema(&pool).await?;
    create_local_schema(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_test_database() {
        let pool = setup_test_database().await.unwrap();

        let _: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&pool)
            .await
            .unwrap();

        let _: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM collection_revisions")
            .fetch_one(&pool)
            .await
            .unwrap();

        let _: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM local_kv")
            .fetch_one(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_schema_creation_is_repeatable() {
        let pool = setup_test_database().await.unwrap();
        create_document_schema(&pool).await.unwrap();
        create_local_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.db");
        setup_local_store(&path, &SyncSettings::default()).await.unwrap();
        assert!(path.exists());
    }
}
