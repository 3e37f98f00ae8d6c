//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter: store locations, settings and the `SyncContext`
//! built over the `SQLite` stores from tanksync-db.
//!
//! Command handlers receive the composed context and delegate to it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tanksync_core::{
    NoopEmitter, StoreBackend, SyncContext, SyncFacade, SyncSettings, data_root,
    resolve_user_path, validate_settings,
};
use tanksync_db::{StoreConfig, StoreFactory, sqlite_url};

use crate::error::CliError;
use crate::parser::Cli;

/// Optional settings file in the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub stores: StoreConfig,
    pub settings: SyncSettings,
}

impl CliConfig {
    /// Resolve store locations from flags (or their env fallbacks) and load
    /// settings from the data directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut stores = StoreConfig::from_default_paths()?;

        if let Some(remote) = &cli.remote_url {
            stores.remote_url = Some(remote_store_url(remote)?);
        }
        if let Some(local) = &cli.local_db {
            stores.local_path = resolve_user_path(&local.to_string_lossy())?;
        }
        if cli.offline {
            stores = stores.offline();
        }

        let settings = load_settings(&data_root()?.join(SETTINGS_FILE))?;
        Ok(Self { stores, settings })
    }
}

/// Accept either a `sqlite:` URL or a plain file path for the shared store.
fn remote_store_url(raw: &str) -> Result<String> {
    if raw.starts_with("sqlite:") {
        return Ok(raw.to_string());
    }
    Ok(sqlite_url(&resolve_user_path(raw)?))
}

/// Read settings from `path`, falling back to defaults when it is absent.
pub fn load_settings(path: &Path) -> Result<SyncSettings> {
    if !path.exists() {
        return Ok(SyncSettings::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: SyncSettings = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    validate_settings(&settings).map_err(CliError::from)?;

    tracing::debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub sync: SyncContext,
    pub stores: StoreConfig,
}

impl CliContext {
    pub fn facade(&self) -> &Arc<SyncFacade> {
        self.sync.facade()
    }

    pub fn backend(&self) -> Option<StoreBackend> {
        self.sync.selected_backend()
    }
}

/// Bootstrap the CLI application.
///
/// Opens the local store, probes the shared one and returns a context that
/// routes to whichever is available.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let sync = StoreFactory::build_context(
        &config.stores,
        config.settings,
        Arc::new(NoopEmitter::new()),
    )
    .await?;

    if sync.selected_backend() == Some(StoreBackend::Local) && config.stores.remote_url.is_some() {
        tracing::warn!("Shared store unreachable, using local store");
    }

    Ok(CliContext {
        sync,
        stores: config.stores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "watchlistCap": 5 }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.watchlist_cap, 5);
        assert_eq!(settings.remarks_cap, SyncSettings::default().remarks_cap);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "watchlistCap": 0 }"#).unwrap();

        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn plain_paths_become_sqlite_urls() {
        assert_eq!(
            remote_store_url("sqlite:/srv/shared.db").unwrap(),
            "sqlite:/srv/shared.db"
        );
        assert!(remote_store_url("/srv/shared.db").unwrap().starts_with("sqlite://"));
    }
}
