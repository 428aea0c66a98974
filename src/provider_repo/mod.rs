// Upstream blockchain data providers via reqwest

mod fallback;
mod http;
mod wire;

use std::time::Duration;
use tracing::instrument;

use crate::config::ProvidersConfig;
use crate::error::FetchError;
use crate::models::{Block, FeeEstimates, MempoolSnapshot, MiningPool, PriceSnapshot};
use fallback::{Attempt, first_success};
use wire::{RawBlock, RawFees, RawMempool, RawPoolStats, RawPriceResponse};

/// Most recent blocks scanned when pool stats are unavailable.
pub const POOL_WINDOW_BLOCKS: usize = 100;

const PRICE_PATH: &str = "/simple/price?ids=bitcoin&vs_currencies=usd&include_24hr_change=true&include_24hr_vol=true&include_last_updated_at=true";

/// One-shot, fail-fast fetches per data kind. No retries and no caching:
/// every call does fresh network I/O.
pub struct ProviderRepo {
    client: reqwest::Client,
    price_url: String,
    mempool_url: String,
    blockstream_url: String,
}

impl ProviderRepo {
    pub fn new(config: &ProvidersConfig) -> anyhow::Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(crate::version::user_agent);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            price_url: config.price_url.clone(),
            mempool_url: config.mempool_url.clone(),
            blockstream_url: config.blockstream_url.clone(),
        })
    }

    #[instrument(skip(self), fields(repo = "provider", operation = "fetch_price"))]
    pub async fn fetch_price(&self) -> Result<PriceSnapshot, FetchError> {
        let url = format!("{}{}", self.price_url, PRICE_PATH);
        let raw: RawPriceResponse = http::get_json(&self.client, &url).await?;
        wire::normalize_price(raw, chrono::Utc::now().timestamp())
            .map_err(|reason| FetchError::upstream(&url, reason))
    }

    /// Tip height -> hash at height -> block, on the primary provider and then,
    /// only if any of those three calls failed, on the secondary.
    #[instrument(skip(self), fields(repo = "provider", operation = "fetch_latest_block"))]
    pub async fn fetch_latest_block(&self) -> Result<Block, FetchError> {
        first_success(
            "latest_block",
            vec![
                Attempt::new("mempool", self.latest_block_from(&self.mempool_url)),
                Attempt::new("blockstream", self.latest_block_from(&self.blockstream_url)),
            ],
        )
        .await
    }

    async fn latest_block_from(&self, base: &str) -> Result<Block, FetchError> {
        let url = format!("{base}/blocks/tip/height");
        let height = wire::parse_tip_height(&http::get_text(&self.client, &url).await?)
            .map_err(|reason| FetchError::upstream(&url, reason))?;

        let url = format!("{base}/block-height/{height}");
        let hash = wire::parse_block_hash(&http::get_text(&self.client, &url).await?)
            .map_err(|reason| FetchError::upstream(&url, reason))?;

        let url = format!("{base}/block/{hash}");
        let raw: RawBlock = http::get_json(&self.client, &url).await?;
        raw.into_block()
            .map_err(|reason| FetchError::upstream(&url, reason))
    }

    /// Newest-first list truncated to `count`, primary then secondary provider.
    #[instrument(skip(self), fields(repo = "provider", operation = "fetch_recent_blocks"))]
    pub async fn fetch_recent_blocks(&self, count: usize) -> Result<Vec<Block>, FetchError> {
        let primary = format!("{}/v1/blocks", self.mempool_url);
        let secondary = format!("{}/blocks", self.blockstream_url);
        first_success(
            "recent_blocks",
            vec![
                Attempt::new("mempool", self.block_list(primary, count)),
                Attempt::new("blockstream", self.block_list(secondary, count)),
            ],
        )
        .await
    }

    async fn block_list(&self, url: String, count: usize) -> Result<Vec<Block>, FetchError> {
        let raw: Vec<RawBlock> = http::get_json(&self.client, &url).await?;
        wire::normalize_block_list(raw, count).map_err(|reason| FetchError::upstream(&url, reason))
    }

    #[instrument(skip(self), fields(repo = "provider", operation = "fetch_mempool_info"))]
    pub async fn fetch_mempool_info(&self) -> Result<MempoolSnapshot, FetchError> {
        let url = format!("{}/mempool", self.mempool_url);
        let raw: RawMempool = http::get_json(&self.client, &url).await?;
        Ok(raw.into())
    }

    #[instrument(skip(self), fields(repo = "provider", operation = "fetch_fee_estimates"))]
    pub async fn fetch_fee_estimates(&self) -> Result<FeeEstimates, FetchError> {
        let url = format!("{}/v1/fees/recommended", self.mempool_url);
        let raw: RawFees = http::get_json(&self.client, &url).await?;
        Ok(raw.into())
    }

    /// Pool stats endpoint first; otherwise attribute the last
    /// [`POOL_WINDOW_BLOCKS`] blocks one by one (embedded pool tag, then
    /// coinbase heuristic).
    #[instrument(skip(self), fields(repo = "provider", operation = "fetch_mining_pools"))]
    pub async fn fetch_mining_pool_distribution(&self) -> Result<Vec<MiningPool>, FetchError> {
        first_success(
            "mining_pools",
            vec![
                Attempt::new("pool stats", self.pools_from_stats()),
                Attempt::new("block scan", self.pools_from_blocks()),
            ],
        )
        .await
    }

    async fn pools_from_stats(&self) -> Result<Vec<MiningPool>, FetchError> {
        let url = format!("{}/v1/mining/pools/1w", self.mempool_url);
        let raw: RawPoolStats = http::get_json(&self.client, &url).await?;
        wire::rank_pool_stats(raw).map_err(|reason| FetchError::upstream(&url, reason))
    }

    async fn pools_from_blocks(&self) -> Result<Vec<MiningPool>, FetchError> {
        let url = format!("{}/v1/blocks", self.mempool_url);
        let mut raw: Vec<RawBlock> = http::get_json(&self.client, &url).await?;
        raw.truncate(POOL_WINDOW_BLOCKS);
        Ok(wire::rank_block_window(&raw))
    }
}
