//! Short remarks.

use serde::{Deserialize, Serialize};

use super::{Record, fill_id, fill_timestamp};
use crate::collections::Collection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub source: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

impl Remark {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            source: source.into(),
            created_at: 0,
        }
    }
}

impl Record for Remark {
    const COLLECTION: Collection = Collection::Remarks;

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.created_at
    }

    fn assign_identity(&mut self, now_ms: i64) {
        fill_id(&mut self.id);
        fill_timestamp(&mut self.created_at, now_ms);
    }
}
