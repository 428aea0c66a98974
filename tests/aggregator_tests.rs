// Aggregator: fan-out, per-kind refresh, snapshot publication

mod common;

use btc_dashboard::aggregator::Aggregator;
use btc_dashboard::error::ErrorKind;
use btc_dashboard::models::{DataKind, Slot};
use btc_dashboard::provider_repo::ProviderRepo;
use common::{FakeUpstream, TIP_HEIGHT};
use std::sync::Arc;
use tokio::sync::broadcast;

fn aggregator(up: &FakeUpstream) -> Aggregator {
    let repo = Arc::new(ProviderRepo::new(&up.providers_config()).unwrap());
    let (tx, _) = broadcast::channel(16);
    Aggregator::new(repo, 6, tx)
}

#[tokio::test]
async fn test_initial_snapshot_is_pending() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    let s = agg.snapshot().await;
    assert!(s.price.is_pending());
    assert!(s.status.is_loading);
    assert!(!s.status.has_error);
    assert_eq!(up.total_hits("/"), 0);
}

#[tokio::test]
async fn test_refresh_all_fills_every_kind() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    let s = agg.refresh_all().await;
    assert!(!s.status.is_loading);
    assert!(!s.status.has_error);
    assert_eq!(s.price.value().unwrap().usd, 67432.1);
    assert_eq!(s.latest_block.value().unwrap().height, TIP_HEIGHT);
    assert_eq!(s.recent_blocks.value().unwrap().len(), 6);
    assert_eq!(s.mempool.value().unwrap().tx_count, 45_000);
    assert_eq!(s.fees.value().unwrap().fastest, 20);
    let hd = s.hashrate_difficulty.value().unwrap();
    assert_eq!(hd.difficulty, common::DIFFICULTY);
    assert_eq!(hd.blocks_remaining, 672);
    assert_eq!(hd.next_adjustment_height, 840_672);
    assert_eq!(s.mining_pools.value().unwrap().len(), 2);
    assert_eq!(agg.snapshot().await, s);
}

#[tokio::test]
async fn test_refresh_all_derives_hashrate_from_same_latest_block() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    agg.refresh_all().await;
    // One latest-block chain per cycle, shared by both kinds.
    assert_eq!(up.hits("/mempool/blocks/tip/height"), 1);
}

#[tokio::test]
async fn test_failed_kind_is_isolated() {
    let up = FakeUpstream::healthy().await;
    up.fail("/mempool/v1/fees/recommended");
    let agg = aggregator(&up);
    let s = agg.refresh_all().await;
    let err = s.fees.error().unwrap();
    assert_eq!(err.error_kind, ErrorKind::Upstream);
    assert!(s.fees.value().is_none());
    assert!(s.price.value().is_some());
    assert!(s.mempool.value().is_some());
    assert!(s.status.has_error);
    assert_eq!(s.status.error_count, 1);
}

#[tokio::test]
async fn test_latest_block_failure_also_fails_hashrate() {
    let up = FakeUpstream::healthy().await;
    up.fail("/mempool/blocks/tip/height");
    up.fail("/esplora/blocks/tip/height");
    let agg = aggregator(&up);
    let s = agg.refresh_all().await;
    assert_eq!(
        s.latest_block.error().unwrap().error_kind,
        ErrorKind::AllProvidersExhausted
    );
    assert_eq!(s.hashrate_difficulty.error(), s.latest_block.error());
    assert_eq!(s.status.error_count, 2);
}

#[tokio::test]
async fn test_refresh_one_kind_leaves_others_pending() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    let s = agg.refresh(DataKind::Fees).await;
    assert!(s.fees.value().is_some());
    assert!(s.price.is_pending());
    assert!(s.status.is_loading);
    assert_eq!(up.hits("/cg/simple/price"), 0);
}

#[tokio::test]
async fn test_refresh_failure_drops_stale_value() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    agg.refresh(DataKind::Price).await;
    up.fail("/cg/simple/price");
    let s = agg.refresh(DataKind::Price).await;
    assert!(matches!(s.price, Slot::Failed(_)));
    assert!(s.price.value().is_none());
}

#[tokio::test]
async fn test_hashrate_kind_refreshes_from_latest_block() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    let s = agg.refresh(DataKind::HashrateDifficulty).await;
    assert!(s.hashrate_difficulty.value().is_some());
    assert!(s.latest_block.is_pending());
    assert_eq!(up.hits("/mempool/blocks/tip/height"), 1);
}

#[tokio::test]
async fn test_every_change_is_published() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    let mut rx = agg.subscribe();
    agg.refresh(DataKind::Mempool).await;
    agg.refresh_all().await;
    let first = rx.recv().await.unwrap();
    assert!(first.mempool.value().is_some());
    assert!(first.price.is_pending());
    let second = rx.recv().await.unwrap();
    assert!(!second.status.is_loading);
}

#[tokio::test]
async fn test_apply_records_outcome() {
    let up = FakeUpstream::healthy().await;
    let agg = aggregator(&up);
    let outcome = agg.fetch_kind(DataKind::RecentBlocks).await;
    assert!(agg.snapshot().await.recent_blocks.is_pending());
    let s = agg.apply(DataKind::RecentBlocks, outcome).await;
    assert_eq!(s.recent_blocks.value().unwrap()[0].height, TIP_HEIGHT);
}
