//! Shared world status.

use serde::{Deserialize, Serialize};

use super::{Record, fill_timestamp};
use crate::collections::{Collection, SINGLETON_KEY};

/// Coarse shared "world state". Last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusRecord {
    /// Air temperature in degrees Celsius.
    pub temp: f64,
    /// Ice coverage, 0–100.
    pub ice_level: f64,
    pub snow_state: String,
    pub aurora_state: String,
    pub mood: String,
    /// Health, 0–100.
    pub health: f64,
    pub volatility: f64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Record for StatusRecord {
    const COLLECTION: Collection = Collection::Status;

    fn id(&self) -> &str {
        SINGLETON_KEY
    }

    fn timestamp(&self) -> i64 {
        self.updated_at
    }

    fn assign_identity(&mut self, now_ms: i64) {
        fill_timestamp(&mut self.updated_at, now_ms);
    }
}
