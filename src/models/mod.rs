// Normalized, provider-agnostic data model

mod block;
mod market;
mod mempool;
mod mining;
mod snapshot;

pub use block::Block;
pub use market::{PriceSnapshot, UnitMode};
pub use mempool::{FeeEstimates, MempoolSnapshot};
pub use mining::{HashrateDifficulty, MiningPool, UNKNOWN_POOL};
pub use snapshot::{
    DashboardSnapshot, DashboardStatus, DataKind, KindError, KindValue, KindView, Slot,
};
