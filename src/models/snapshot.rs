// Aggregate dashboard snapshot: one slot per data kind

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Block, FeeEstimates, HashrateDifficulty, MempoolSnapshot, MiningPool, PriceSnapshot};
use crate::error::{ErrorKind, FetchError};

/// Each independently fetched (or derived) piece of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataKind {
    Price,
    LatestBlock,
    RecentBlocks,
    Mempool,
    Fees,
    HashrateDifficulty,
    MiningPools,
}

impl DataKind {
    pub const ALL: [DataKind; 7] = [
        DataKind::Price,
        DataKind::LatestBlock,
        DataKind::RecentBlocks,
        DataKind::Mempool,
        DataKind::Fees,
        DataKind::HashrateDifficulty,
        DataKind::MiningPools,
    ];

    /// Wire name, same as the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Price => "price",
            DataKind::LatestBlock => "latestBlock",
            DataKind::RecentBlocks => "recentBlocks",
            DataKind::Mempool => "mempool",
            DataKind::Fees => "fees",
            DataKind::HashrateDifficulty => "hashrateDifficulty",
            DataKind::MiningPools => "miningPools",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown data kind: {s}"))
    }
}

/// A recorded fetch failure; clonable so it can live in published snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindError {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&FetchError> for KindError {
    fn from(e: &FetchError) -> Self {
        KindError {
            error_kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Keeps "not fetched yet" apart from "fetch failed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum Slot<T> {
    Pending,
    Ready(T),
    Failed(KindError),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Pending
    }
}

impl<T> Slot<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&KindError> {
        match self {
            Slot::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The `(value | absent, error | none)` pair collaborators consume.
    pub fn view(&self) -> (Option<&T>, Option<&KindError>) {
        (self.value(), self.error())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed(_))
    }
}

/// A successful result for one data kind.
#[derive(Debug, Clone, PartialEq)]
pub enum KindValue {
    Price(PriceSnapshot),
    LatestBlock(Block),
    RecentBlocks(Vec<Block>),
    Mempool(MempoolSnapshot),
    Fees(FeeEstimates),
    HashrateDifficulty(HashrateDifficulty),
    MiningPools(Vec<MiningPool>),
}

impl KindValue {
    pub fn kind(&self) -> DataKind {
        match self {
            KindValue::Price(_) => DataKind::Price,
            KindValue::LatestBlock(_) => DataKind::LatestBlock,
            KindValue::RecentBlocks(_) => DataKind::RecentBlocks,
            KindValue::Mempool(_) => DataKind::Mempool,
            KindValue::Fees(_) => DataKind::Fees,
            KindValue::HashrateDifficulty(_) => DataKind::HashrateDifficulty,
            KindValue::MiningPools(_) => DataKind::MiningPools,
        }
    }
}

/// Loading/error summary over all slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatus {
    pub is_loading: bool,
    pub has_error: bool,
    pub error_count: usize,
}

/// JSON view of one kind for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindView<T> {
    pub value: Option<T>,
    pub error: Option<KindError>,
}

/// Immutable aggregate published by the aggregator. Updates build a new
/// snapshot (`with_value` / `with_failure` consume `self`); `status` is
/// recomputed on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Unix millis of the last transition.
    pub generated_at: i64,
    pub price: Slot<PriceSnapshot>,
    pub latest_block: Slot<Block>,
    pub recent_blocks: Slot<Vec<Block>>,
    pub mempool: Slot<MempoolSnapshot>,
    pub fees: Slot<FeeEstimates>,
    pub hashrate_difficulty: Slot<HashrateDifficulty>,
    pub mining_pools: Slot<Vec<MiningPool>>,
    pub status: DashboardStatus,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self::pending(0)
    }
}

impl DashboardSnapshot {
    /// Every slot pending (nothing fetched yet).
    pub fn pending(generated_at: i64) -> Self {
        let mut s = Self {
            generated_at,
            price: Slot::Pending,
            latest_block: Slot::Pending,
            recent_blocks: Slot::Pending,
            mempool: Slot::Pending,
            fees: Slot::Pending,
            hashrate_difficulty: Slot::Pending,
            mining_pools: Slot::Pending,
            status: DashboardStatus::default(),
        };
        s.status = s.compute_status();
        s
    }

    pub fn with_value(mut self, value: KindValue, generated_at: i64) -> Self {
        match value {
            KindValue::Price(v) => self.price = Slot::Ready(v),
            KindValue::LatestBlock(v) => self.latest_block = Slot::Ready(v),
            KindValue::RecentBlocks(v) => self.recent_blocks = Slot::Ready(v),
            KindValue::Mempool(v) => self.mempool = Slot::Ready(v),
            KindValue::Fees(v) => self.fees = Slot::Ready(v),
            KindValue::HashrateDifficulty(v) => self.hashrate_difficulty = Slot::Ready(v),
            KindValue::MiningPools(v) => self.mining_pools = Slot::Ready(v),
        }
        self.finish(generated_at)
    }

    /// Marks `kind` failed; its previous value is dropped, never kept as stale data.
    pub fn with_failure(mut self, kind: DataKind, error: KindError, generated_at: i64) -> Self {
        match kind {
            DataKind::Price => self.price = Slot::Failed(error),
            DataKind::LatestBlock => self.latest_block = Slot::Failed(error),
            DataKind::RecentBlocks => self.recent_blocks = Slot::Failed(error),
            DataKind::Mempool => self.mempool = Slot::Failed(error),
            DataKind::Fees => self.fees = Slot::Failed(error),
            DataKind::HashrateDifficulty => self.hashrate_difficulty = Slot::Failed(error),
            DataKind::MiningPools => self.mining_pools = Slot::Failed(error),
        }
        self.finish(generated_at)
    }

    /// Apply one fetch outcome for `kind`.
    pub fn with_outcome(
        self,
        kind: DataKind,
        outcome: Result<KindValue, KindError>,
        generated_at: i64,
    ) -> Self {
        match outcome {
            Ok(v) => self.with_value(v, generated_at),
            Err(e) => self.with_failure(kind, e, generated_at),
        }
    }

    pub fn error_for(&self, kind: DataKind) -> Option<&KindError> {
        match kind {
            DataKind::Price => self.price.error(),
            DataKind::LatestBlock => self.latest_block.error(),
            DataKind::RecentBlocks => self.recent_blocks.error(),
            DataKind::Mempool => self.mempool.error(),
            DataKind::Fees => self.fees.error(),
            DataKind::HashrateDifficulty => self.hashrate_difficulty.error(),
            DataKind::MiningPools => self.mining_pools.error(),
        }
    }

    /// `{value, error}` for one kind, value as JSON.
    pub fn kind_view(&self, kind: DataKind) -> serde_json::Result<KindView<serde_json::Value>> {
        fn view<T: Serialize>(slot: &Slot<T>) -> serde_json::Result<KindView<serde_json::Value>> {
            Ok(KindView {
                value: slot.value().map(serde_json::to_value).transpose()?,
                error: slot.error().cloned(),
            })
        }
        match kind {
            DataKind::Price => view(&self.price),
            DataKind::LatestBlock => view(&self.latest_block),
            DataKind::RecentBlocks => view(&self.recent_blocks),
            DataKind::Mempool => view(&self.mempool),
            DataKind::Fees => view(&self.fees),
            DataKind::HashrateDifficulty => view(&self.hashrate_difficulty),
            DataKind::MiningPools => view(&self.mining_pools),
        }
    }

    fn finish(mut self, generated_at: i64) -> Self {
        self.generated_at = generated_at;
        self.status = self.compute_status();
        self
    }

    fn compute_status(&self) -> DashboardStatus {
        let pending = [
            self.price.is_pending(),
            self.latest_block.is_pending(),
            self.recent_blocks.is_pending(),
            self.mempool.is_pending(),
            self.fees.is_pending(),
            self.hashrate_difficulty.is_pending(),
            self.mining_pools.is_pending(),
        ];
        let error_count = DataKind::ALL
            .into_iter()
            .filter(|k| self.error_for(*k).is_some())
            .count();
        DashboardStatus {
            is_loading: pending.into_iter().any(|p| p),
            has_error: error_count > 0,
            error_count,
        }
    }
}
