// Hashrate and difficulty-adjustment countdown derived from the latest block.

use crate::models::{Block, HashrateDifficulty};

/// Target seconds between blocks.
pub const TARGET_BLOCK_INTERVAL_SECS: u64 = 600;
/// Blocks per difficulty retarget period.
pub const ADJUSTMENT_PERIOD_BLOCKS: u64 = 2016;

/// Expected-hashes estimator (`difficulty * 2^32 / 600`) and a retarget ETA
/// that assumes every remaining block arrives exactly on target.
pub fn hashrate_difficulty(difficulty: f64, height: u64) -> HashrateDifficulty {
    let hashrate = difficulty * 2f64.powi(32) / TARGET_BLOCK_INTERVAL_SECS as f64;
    let current_period_block = height % ADJUSTMENT_PERIOD_BLOCKS;
    let blocks_remaining = ADJUSTMENT_PERIOD_BLOCKS - current_period_block;
    HashrateDifficulty {
        hashrate,
        difficulty,
        adjustment_progress_percent: current_period_block as f64
            / ADJUSTMENT_PERIOD_BLOCKS as f64
            * 100.0,
        time_to_adjustment_ms: blocks_remaining * TARGET_BLOCK_INTERVAL_SECS * 1000,
        blocks_remaining,
        next_adjustment_height: height.saturating_add(blocks_remaining),
    }
}

pub fn from_block(block: &Block) -> HashrateDifficulty {
    hashrate_difficulty(block.difficulty, block.height)
}
