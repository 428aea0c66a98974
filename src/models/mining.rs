// Derived network metrics and pool distribution

use serde::{Deserialize, Serialize};

/// Sentinel pool name for blocks that could not be attributed.
pub const UNKNOWN_POOL: &str = "Unknown Pool";

/// Derived from the latest block's difficulty and height, never fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashrateDifficulty {
    /// Expected H/s at the current difficulty.
    pub hashrate: f64,
    pub difficulty: f64,
    /// In `[0, 100)`.
    pub adjustment_progress_percent: f64,
    pub time_to_adjustment_ms: u64,
    pub blocks_remaining: u64,
    pub next_adjustment_height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningPool {
    pub name: String,
    pub block_count: u64,
    pub percentage: f64,
    /// Palette entry picked by rank, not by pool identity.
    pub color_token: String,
}

impl MiningPool {
    /// Name as it should be shown to a user.
    pub fn display_name(&self) -> &str {
        if self.name == UNKNOWN_POOL {
            "Unknown (Unidentified Pool)"
        } else {
            &self.name
        }
    }
}
