// Block header + summary fields, as shown on the dashboard

use serde::{Deserialize, Serialize};

/// One block as returned by a chain provider. Trusted as-is: no PoW or
/// reorg checks, and `height` is not forced to be monotonic across fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// 64 hex chars.
    pub id: String,
    pub height: u64,
    #[serde(default)]
    pub version: u32,
    pub timestamp: u64,
    pub tx_count: u64,
    pub size_bytes: u64,
    pub weight: u64,
    pub merkle_root: String,
    pub previous_block_hash: String,
    pub median_time: u64,
    pub nonce: u64,
    pub bits: u32,
    pub difficulty: f64,
}
