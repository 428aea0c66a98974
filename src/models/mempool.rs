// Mempool summary and fee estimates (pass-through from the provider)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolSnapshot {
    pub tx_count: u64,
    pub vsize_bytes: u64,
    pub total_fee: f64,
    /// `[feeRate, vsize]` pairs in provider order.
    pub fee_histogram: Vec<[f64; 2]>,
}

/// Recommended fee rates in sat/vByte.
/// Expected `fastest >= half_hour >= hour >= economy >= minimum`; not re-checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimates {
    pub fastest: u64,
    pub half_hour: u64,
    pub hour: u64,
    pub economy: u64,
    pub minimum: u64,
}
