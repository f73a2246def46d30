//! Weaver configuration

use serde::{Deserialize, Serialize};

/// Bridge and hint behaviour of a `WeaverIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaverConfig {
    /// On append to a key, give the previous key's head a bridge to the new
    /// node if it has none (default: true)
    #[serde(default = "default_bridge_backfill")]
    pub bridge_backfill: bool,

    /// Follow ladder pointers when locating a range step's hint source
    /// (default: false)
    #[serde(default)]
    pub laddered_first_ge: bool,
}

fn default_bridge_backfill() -> bool {
    true
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            bridge_backfill: default_bridge_backfill(),
            laddered_first_ge: false,
        }
    }
}
