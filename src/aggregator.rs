// Aggregator: fans out provider fetches and owns the published dashboard snapshot.
// Every change builds a new snapshot, stores it, and broadcasts a copy.

use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::instrument;

use crate::derived;
use crate::error::FetchError;
use crate::models::{DashboardSnapshot, DataKind, KindError, KindValue};
use crate::provider_repo::ProviderRepo;

pub struct Aggregator {
    repo: Arc<ProviderRepo>,
    recent_blocks_count: usize,
    current: RwLock<DashboardSnapshot>,
    tx: broadcast::Sender<DashboardSnapshot>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn settle(outcome: Result<KindValue, FetchError>) -> Result<KindValue, KindError> {
    outcome.map_err(|e| KindError::from(&e))
}

impl Aggregator {
    pub fn new(
        repo: Arc<ProviderRepo>,
        recent_blocks_count: usize,
        tx: broadcast::Sender<DashboardSnapshot>,
    ) -> Self {
        Self {
            repo,
            recent_blocks_count,
            current: RwLock::new(DashboardSnapshot::pending(now_millis())),
            tx,
        }
    }

    /// Copy of the current snapshot.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.current.read().await.clone()
    }

    /// Receives every snapshot published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardSnapshot> {
        self.tx.subscribe()
    }

    /// One fetch for `kind`, without touching the snapshot.
    /// Hashrate/difficulty fetches the latest block and derives from it.
    pub async fn fetch_kind(&self, kind: DataKind) -> Result<KindValue, FetchError> {
        match kind {
            DataKind::Price => self.repo.fetch_price().await.map(KindValue::Price),
            DataKind::LatestBlock => self
                .repo
                .fetch_latest_block()
                .await
                .map(KindValue::LatestBlock),
            DataKind::RecentBlocks => self
                .repo
                .fetch_recent_blocks(self.recent_blocks_count)
                .await
                .map(KindValue::RecentBlocks),
            DataKind::Mempool => self
                .repo
                .fetch_mempool_info()
                .await
                .map(KindValue::Mempool),
            DataKind::Fees => self
                .repo
                .fetch_fee_estimates()
                .await
                .map(KindValue::Fees),
            DataKind::HashrateDifficulty => self
                .repo
                .fetch_latest_block()
                .await
                .map(|b| KindValue::HashrateDifficulty(derived::from_block(&b))),
            DataKind::MiningPools => self
                .repo
                .fetch_mining_pool_distribution()
                .await
                .map(KindValue::MiningPools),
        }
    }

    /// Record the outcome for `kind` in a new snapshot and publish it.
    pub async fn apply(
        &self,
        kind: DataKind,
        outcome: Result<KindValue, FetchError>,
    ) -> DashboardSnapshot {
        let outcome = settle(outcome);
        let next = {
            let mut current = self.current.write().await;
            let next = current.clone().with_outcome(kind, outcome, now_millis());
            *current = next.clone();
            next
        };
        self.publish(next.clone());
        next
    }

    /// One-shot refresh trigger for a single kind.
    #[instrument(skip(self))]
    pub async fn refresh(&self, kind: DataKind) -> DashboardSnapshot {
        let outcome = self.fetch_kind(kind).await;
        self.apply(kind, outcome).await
    }

    /// Full cycle: every kind fetched concurrently, hashrate derived from this
    /// cycle's latest block, snapshot rebuilt from scratch.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> DashboardSnapshot {
        let (price, latest, recent, mempool, fees, pools) = tokio::join!(
            self.fetch_kind(DataKind::Price),
            self.repo.fetch_latest_block(),
            self.fetch_kind(DataKind::RecentBlocks),
            self.fetch_kind(DataKind::Mempool),
            self.fetch_kind(DataKind::Fees),
            self.fetch_kind(DataKind::MiningPools),
        );
        let (latest, hashrate) = match latest {
            Ok(block) => {
                let metrics = derived::from_block(&block);
                (
                    Ok(KindValue::LatestBlock(block)),
                    Ok(KindValue::HashrateDifficulty(metrics)),
                )
            }
            Err(e) => {
                let e = KindError::from(&e);
                (Err(e.clone()), Err(e))
            }
        };

        let at = now_millis();
        let next = [
            (DataKind::Price, settle(price)),
            (DataKind::LatestBlock, latest),
            (DataKind::RecentBlocks, settle(recent)),
            (DataKind::Mempool, settle(mempool)),
            (DataKind::Fees, settle(fees)),
            (DataKind::HashrateDifficulty, hashrate),
            (DataKind::MiningPools, settle(pools)),
        ]
        .into_iter()
        .fold(DashboardSnapshot::pending(at), |s, (kind, outcome)| {
            s.with_outcome(kind, outcome, at)
        });

        tracing::debug!(
            error_count = next.status.error_count,
            "aggregation cycle complete"
        );
        *self.current.write().await = next.clone();
        self.publish(next.clone());
        next
    }

    fn publish(&self, snapshot: DashboardSnapshot) {
        if self.tx.send(snapshot).is_err() {
            tracing::trace!("no dashboard subscribers");
        }
    }
}
