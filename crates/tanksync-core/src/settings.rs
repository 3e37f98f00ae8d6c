//! Sync settings and validation.
//!
//! Pure configuration types with no infrastructure dependencies. Every field
//! has a default so partial JSON (or none at all) yields a usable value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Most recent auto-generated knowledge items kept in the store.
pub const DEFAULT_KNOWLEDGE_AUTO_CAP: usize = 50;
pub const DEFAULT_REMARKS_CAP: usize = 50;
pub const DEFAULT_WATCHLIST_CAP: usize = 20;
/// Entries kept by the local fallback ledger.
pub const DEFAULT_LOCAL_SPOKEN_CAP: usize = 500;
pub const DEFAULT_NEWS_RETENTION_HOURS: u64 = 24;
/// Pause between two announcements.
pub const DEFAULT_SPEECH_PAUSE_MS: u64 = 2_000;
/// Announcements accepted per session from initial-load batches.
pub const DEFAULT_INITIAL_LOAD_ANNOUNCE_LIMIT: usize = 3;
/// How often the shared store checks for writes from other processes.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Settings for the sync layer and the speech queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    pub knowledge_auto_cap: usize,
    pub remarks_cap: usize,
    pub watchlist_cap: usize,
    pub local_spoken_cap: usize,
    pub news_retention_hours: u64,
    pub speech_pause_ms: u64,
    pub initial_load_announce_limit: usize,
    /// Whether announcements are spoken at startup.
    pub voice_enabled: bool,
    pub poll_interval_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SyncSettings {
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            knowledge_auto_cap: DEFAULT_KNOWLEDGE_AUTO_CAP,
            remarks_cap: DEFAULT_REMARKS_CAP,
            watchlist_cap: DEFAULT_WATCHLIST_CAP,
            local_spoken_cap: DEFAULT_LOCAL_SPOKEN_CAP,
            news_retention_hours: DEFAULT_NEWS_RETENTION_HOURS,
            speech_pause_ms: DEFAULT_SPEECH_PAUSE_MS,
            initial_load_announce_limit: DEFAULT_INITIAL_LOAD_ANNOUNCE_LIMIT,
            voice_enabled: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    pub const fn news_retention(&self) -> Duration {
        Duration::from_secs(self.news_retention_hours * 3_600)
    }

    /// News retention in milliseconds, saturating at `i64::MAX`.
    pub fn news_retention_ms(&self) -> i64 {
        i64::try_from(self.news_retention().as_millis()).unwrap_or(i64::MAX)
    }

    pub const fn speech_pause(&self) -> Duration {
        Duration::from_millis(self.speech_pause_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Settings validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be at least 1, got {value}")]
    ZeroCap { name: &'static str, value: usize },

    #[error("News retention must be between 1 and 720 hours, got {0}")]
    InvalidRetention(u64),

    #[error("Poll interval must be between 10 and 60000 ms, got {0}")]
    InvalidPollInterval(u64),
}

/// Validate settings values.
pub fn validate_settings(settings: &SyncSettings) -> Result<(), SettingsError> {
    let caps = [
        ("knowledgeAutoCap", settings.knowledge_auto_cap),
        ("remarksCap", settings.remarks_cap),
        ("watchlistCap", settings.watchlist_cap),
        ("localSpokenCap", settings.local_spoken_cap),
    ];
    if let Some((name, value)) = caps.into_iter().find(|(_, value)| *value == 0) {
        return Err(SettingsError::ZeroCap { name, value });
    }

    if !(1..=720).contains(&settings.news_retention_hours) {
        return Err(SettingsError::InvalidRetention(settings.news_retention_hours));
    }

    if !(10..=60_000).contains(&settings.poll_interval_ms) {
        return Err(SettingsError::InvalidPollInterval(settings.poll_interval_ms));
    }

    Ok(())
}
