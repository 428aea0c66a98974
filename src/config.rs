use serde::Deserialize;
use std::time::Duration;

use crate::models::DataKind;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Upstream base URLs. Paths (`/blocks/tip/height`, `/v1/fees/recommended`, ...)
/// are appended by the provider repo.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// CoinGecko-compatible price API.
    pub price_url: String,
    /// Primary chain provider (mempool.space-compatible).
    pub mempool_url: String,
    /// Secondary chain provider (Esplora-compatible).
    pub blockstream_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub user_agent: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Desired refresh cadence per data kind, consumed by the polling worker.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_fast_secs")]
    pub price_secs: u64,
    #[serde(default = "default_block_secs")]
    pub latest_block_secs: u64,
    #[serde(default = "default_block_secs")]
    pub recent_blocks_secs: u64,
    #[serde(default = "default_fast_secs")]
    pub mempool_secs: u64,
    #[serde(default = "default_fast_secs")]
    pub fees_secs: u64,
    #[serde(default = "default_hashrate_secs")]
    pub hashrate_secs: u64,
    #[serde(default = "default_mining_pools_secs")]
    pub mining_pools_secs: u64,
    /// How many entries `recentBlocks` keeps.
    #[serde(default = "default_recent_blocks_count")]
    pub recent_blocks_count: usize,
    /// Extra attempts after a failed fetch before the failure is published.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Whether scheduled refreshes start running; toggled at runtime via
    /// `POST /api/auto-refresh`.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
}

fn default_fast_secs() -> u64 {
    30
}

fn default_block_secs() -> u64 {
    60
}

fn default_hashrate_secs() -> u64 {
    300
}

fn default_mining_pools_secs() -> u64 {
    600
}

fn default_recent_blocks_count() -> usize {
    6
}

fn default_retry_count() -> u32 {
    3
}

fn default_auto_refresh() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            price_secs: default_fast_secs(),
            latest_block_secs: default_block_secs(),
            recent_blocks_secs: default_block_secs(),
            mempool_secs: default_fast_secs(),
            fees_secs: default_fast_secs(),
            hashrate_secs: default_hashrate_secs(),
            mining_pools_secs: default_mining_pools_secs(),
            recent_blocks_count: default_recent_blocks_count(),
            retry_count: default_retry_count(),
            auto_refresh: default_auto_refresh(),
        }
    }
}

impl RefreshConfig {
    pub fn interval_for(&self, kind: DataKind) -> Duration {
        let secs = match kind {
            DataKind::Price => self.price_secs,
            DataKind::LatestBlock => self.latest_block_secs,
            DataKind::RecentBlocks => self.recent_blocks_secs,
            DataKind::Mempool => self.mempool_secs,
            DataKind::Fees => self.fees_secs,
            DataKind::HashrateDifficulty => self.hashrate_secs,
            DataKind::MiningPools => self.mining_pools_secs,
        };
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of dashboard snapshots kept in the broadcast channel for /ws/dashboard (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws clients, refresh successes/failures) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        config.providers.normalize();
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        for (key, url) in [
            ("providers.price_url", &self.providers.price_url),
            ("providers.mempool_url", &self.providers.mempool_url),
            ("providers.blockstream_url", &self.providers.blockstream_url),
        ] {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "{} must be an http(s) URL, got {:?}",
                key,
                url
            );
        }
        anyhow::ensure!(
            self.providers.request_timeout_secs > 0,
            "providers.request_timeout_secs must be > 0, got {}",
            self.providers.request_timeout_secs
        );
        let r = &self.refresh;
        for (key, secs) in [
            ("refresh.price_secs", r.price_secs),
            ("refresh.latest_block_secs", r.latest_block_secs),
            ("refresh.recent_blocks_secs", r.recent_blocks_secs),
            ("refresh.mempool_secs", r.mempool_secs),
            ("refresh.fees_secs", r.fees_secs),
            ("refresh.hashrate_secs", r.hashrate_secs),
            ("refresh.mining_pools_secs", r.mining_pools_secs),
        ] {
            anyhow::ensure!(secs > 0, "{} must be > 0, got {}", key, secs);
        }
        anyhow::ensure!(
            (1..=100).contains(&self.refresh.recent_blocks_count),
            "refresh.recent_blocks_count must be between 1 and 100, got {}",
            self.refresh.recent_blocks_count
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}

impl ProvidersConfig {
    /// Strip trailing `/` so paths can be appended verbatim.
    fn normalize(&mut self) {
        for url in [
            &mut self.price_url,
            &mut self.mempool_url,
            &mut self.blockstream_url,
        ] {
            while url.ends_with('/') {
                url.pop();
            }
        }
    }
}
