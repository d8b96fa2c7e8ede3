//! Storage models.

use serde::{Deserialize, Serialize};

/// A persisted setting: one key with a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Setting key.
    pub key: String,
    /// Setting value (JSON).
    pub value: serde_json::Value,
}
