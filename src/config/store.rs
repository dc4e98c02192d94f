//! Ledger storage configuration

use serde::{Deserialize, Serialize};

/// Settings for the persistent rating ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Key prefix under which the host stores the rating sequence
    pub key_prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            // Matches the prefix the original contract deployment used
            key_prefix: "r".to_string(),
        }
    }
}
