// Upstream response shapes and their normalization into the dashboard models.
// Normalizers return a reason string; callers attach the URL.

use serde::Deserialize;

use crate::models::{Block, FeeEstimates, MempoolSnapshot, MiningPool, PriceSnapshot, UNKNOWN_POOL};
use crate::pool_classifier;

/// `/simple/price?ids=bitcoin&...`
#[derive(Debug, Deserialize)]
pub(crate) struct RawPriceResponse {
    bitcoin: Option<RawCoinPrice>,
}

#[derive(Debug, Deserialize)]
struct RawCoinPrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
    usd_24h_vol: Option<f64>,
    last_updated_at: Option<f64>,
}

/// Esplora block shape; mempool.space adds `extras` on `/v1/blocks`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBlock {
    id: String,
    height: u64,
    #[serde(default)]
    version: u32,
    timestamp: u64,
    tx_count: u64,
    size: u64,
    weight: u64,
    merkle_root: String,
    /// Absent on the genesis block.
    #[serde(default)]
    previousblockhash: Option<String>,
    mediantime: u64,
    nonce: u64,
    bits: u32,
    difficulty: f64,
    #[serde(default)]
    extras: Option<RawBlockExtras>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBlockExtras {
    pool: Option<RawPoolRef>,
    #[serde(rename = "coinbaseRaw")]
    coinbase_raw: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPoolRef {
    name: Option<String>,
}

/// `/mempool`
#[derive(Debug, Deserialize)]
pub(crate) struct RawMempool {
    count: u64,
    vsize: u64,
    total_fee: f64,
    #[serde(default)]
    fee_histogram: Vec<[f64; 2]>,
}

/// `/v1/fees/recommended`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFees {
    fastest_fee: u64,
    half_hour_fee: u64,
    hour_fee: u64,
    economy_fee: u64,
    minimum_fee: u64,
}

/// `/v1/mining/pools/1w`
#[derive(Debug, Deserialize)]
pub(crate) struct RawPoolStats {
    pools: Vec<RawPoolStat>,
    #[serde(rename = "blockCount")]
    block_count: u64,
}

#[derive(Debug, Deserialize)]
struct RawPoolStat {
    name: Option<String>,
    #[serde(rename = "blockCount")]
    block_count: u64,
}

/// `usd` is required and must be positive; the other fields default to zero,
/// `observed_at` to `now_secs`.
pub(crate) fn normalize_price(raw: RawPriceResponse, now_secs: i64) -> Result<PriceSnapshot, String> {
    let coin = raw.bitcoin.ok_or("response has no \"bitcoin\" entry")?;
    let usd = coin.usd.ok_or("response has no bitcoin.usd price")?;
    if !(usd.is_finite() && usd > 0.0) {
        return Err(format!("bitcoin.usd must be positive, got {usd}"));
    }
    Ok(PriceSnapshot {
        usd,
        usd_24h_change: coin.usd_24h_change.unwrap_or(0.0),
        usd_24h_volume: coin.usd_24h_vol.unwrap_or(0.0),
        observed_at: coin.last_updated_at.map_or(now_secs, |t| t as i64),
    })
}

pub(crate) fn parse_tip_height(body: &str) -> Result<u64, String> {
    body.trim()
        .parse::<u64>()
        .map_err(|_| format!("tip height is not an integer: {body:?}"))
}

pub(crate) fn is_block_hash(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

pub(crate) fn parse_block_hash(body: &str) -> Result<String, String> {
    let hash = body.trim();
    if is_block_hash(hash) {
        Ok(hash.to_string())
    } else {
        Err(format!("not a 64-hex block hash: {hash:?}"))
    }
}

impl RawBlock {
    pub(crate) fn into_block(self) -> Result<Block, String> {
        if !is_block_hash(&self.id) {
            return Err(format!("block id is not a 64-hex hash: {:?}", self.id));
        }
        if !(self.difficulty.is_finite() && self.difficulty > 0.0) {
            return Err(format!(
                "block {} has non-positive difficulty {}",
                self.height, self.difficulty
            ));
        }
        Ok(Block {
            id: self.id,
            height: self.height,
            version: self.version,
            timestamp: self.timestamp,
            tx_count: self.tx_count,
            size_bytes: self.size,
            weight: self.weight,
            merkle_root: self.merkle_root,
            previous_block_hash: self.previousblockhash.unwrap_or_default(),
            median_time: self.mediantime,
            nonce: self.nonce,
            bits: self.bits,
            difficulty: self.difficulty,
        })
    }

    /// Pool this block is attributed to: provider tag, then coinbase heuristic.
    pub(crate) fn pool_name(&self) -> String {
        let extras = self.extras.as_ref();
        let embedded = extras
            .and_then(|e| e.pool.as_ref())
            .and_then(|p| p.name.as_deref());
        let coinbase = extras.and_then(|e| e.coinbase_raw.as_deref());
        pool_classifier::resolve_pool_name(embedded, coinbase)
    }
}

/// First `count` blocks of a newest-first list; any malformed entry fails the list.
pub(crate) fn normalize_block_list(raw: Vec<RawBlock>, count: usize) -> Result<Vec<Block>, String> {
    raw.into_iter().take(count).map(RawBlock::into_block).collect()
}

impl From<RawMempool> for MempoolSnapshot {
    fn from(raw: RawMempool) -> Self {
        MempoolSnapshot {
            tx_count: raw.count,
            vsize_bytes: raw.vsize,
            total_fee: raw.total_fee,
            fee_histogram: raw.fee_histogram,
        }
    }
}

impl From<RawFees> for FeeEstimates {
    fn from(raw: RawFees) -> Self {
        FeeEstimates {
            fastest: raw.fastest_fee,
            half_hour: raw.half_hour_fee,
            hour: raw.hour_fee,
            economy: raw.economy_fee,
            minimum: raw.minimum_fee,
        }
    }
}

/// Direct pool stats: share of the provider's own block total.
pub(crate) fn rank_pool_stats(raw: RawPoolStats) -> Result<Vec<MiningPool>, String> {
    if raw.block_count == 0 {
        return Err("pool stats report zero blocks".into());
    }
    // Empty and missing names all land on one Unknown Pool row.
    let counts = pool_classifier::tally_weighted(raw.pools.into_iter().map(|p| {
        let name = p
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_POOL.to_string());
        (name, p.block_count)
    }));
    Ok(pool_classifier::rank_pools(counts, raw.block_count))
}

/// Attribute each block of the window and rank pools by share of the window.
pub(crate) fn rank_block_window(blocks: &[RawBlock]) -> Vec<MiningPool> {
    let counts = pool_classifier::tally(blocks.iter().map(RawBlock::pool_name));
    pool_classifier::rank_pools(counts, blocks.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HASH: &str = "00000000000000000001b2c3d4e5f60718293a4b5c6d7e8f9012345678abcdef";

    fn raw_block(height: u64, extras: serde_json::Value) -> RawBlock {
        serde_json::from_value(json!({
            "id": HASH,
            "height": height,
            "version": 536870912,
            "timestamp": 1_700_000_000,
            "tx_count": 3000,
            "size": 1_500_000,
            "weight": 3_993_000,
            "merkle_root": "ab".repeat(32),
            "previousblockhash": "cd".repeat(32),
            "mediantime": 1_699_999_000,
            "nonce": 12345,
            "bits": 386_089_497,
            "difficulty": 83_148_355_189_239.77,
            "extras": extras,
        }))
        .unwrap()
    }

    fn hex(s: &str) -> String {
        s.bytes().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn price_defaults_optional_fields() {
        let raw: RawPriceResponse =
            serde_json::from_value(json!({"bitcoin": {"usd": 67000.5}})).unwrap();
        let p = normalize_price(raw, 1_700_000_123).unwrap();
        assert_eq!(p.usd, 67000.5);
        assert_eq!(p.usd_24h_change, 0.0);
        assert_eq!(p.usd_24h_volume, 0.0);
        assert_eq!(p.observed_at, 1_700_000_123);
    }

    #[test]
    fn price_keeps_reported_fields() {
        let raw: RawPriceResponse = serde_json::from_value(json!({"bitcoin": {
            "usd": 67000.0, "usd_24h_change": -1.5, "usd_24h_vol": 3.2e10, "last_updated_at": 1_700_000_000
        }}))
        .unwrap();
        let p = normalize_price(raw, 0).unwrap();
        assert_eq!(p.usd_24h_change, -1.5);
        assert_eq!(p.usd_24h_volume, 3.2e10);
        assert_eq!(p.observed_at, 1_700_000_000);
    }

    #[test]
    fn price_without_currency_key_fails() {
        let raw: RawPriceResponse = serde_json::from_value(json!({})).unwrap();
        assert!(normalize_price(raw, 0).is_err());
        let raw: RawPriceResponse =
            serde_json::from_value(json!({"bitcoin": {"eur": 60000.0}})).unwrap();
        assert!(normalize_price(raw, 0).unwrap_err().contains("usd"));
        let raw: RawPriceResponse =
            serde_json::from_value(json!({"bitcoin": {"usd": 0.0}})).unwrap();
        assert!(normalize_price(raw, 0).is_err());
    }

    #[test]
    fn tip_height_accepts_text_or_json_integer() {
        assert_eq!(parse_tip_height("870123"), Ok(870123));
        assert_eq!(parse_tip_height(" 870123\n"), Ok(870123));
        assert!(parse_tip_height("\"abc\"").is_err());
    }

    #[test]
    fn block_hash_must_be_64_hex() {
        assert_eq!(parse_block_hash(&format!("{HASH}\n")).unwrap(), HASH);
        assert!(parse_block_hash("Block not found").is_err());
        assert!(parse_block_hash(&HASH[1..]).is_err());
    }

    #[test]
    fn raw_block_maps_esplora_field_names() {
        let b = raw_block(870_000, serde_json::Value::Null).into_block().unwrap();
        assert_eq!(b.height, 870_000);
        assert_eq!(b.size_bytes, 1_500_000);
        assert_eq!(b.previous_block_hash, "cd".repeat(32));
        assert_eq!(b.median_time, 1_699_999_000);
    }

    #[test]
    fn block_list_truncates_without_resorting() {
        let raw: Vec<RawBlock> = (0..10)
            .map(|i| raw_block(900 - i, serde_json::Value::Null))
            .collect();
        let blocks = normalize_block_list(raw, 6).unwrap();
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[0].height, 900);
        assert_eq!(blocks[5].height, 895);
    }

    #[test]
    fn pool_stats_percentages_use_reported_total() {
        let raw: RawPoolStats = serde_json::from_value(json!({
            "pools": [
                {"name": "AntPool", "blockCount": 200},
                {"name": "Foundry USA", "blockCount": 300},
                {"name": "", "blockCount": 8}
            ],
            "blockCount": 1000
        }))
        .unwrap();
        let pools = rank_pool_stats(raw).unwrap();
        assert_eq!(pools[0].name, "Foundry USA");
        assert_eq!(pools[0].percentage, 30.0);
        assert_eq!(pools[1].percentage, 20.0);
        assert_eq!(pools[2].name, UNKNOWN_POOL);
        assert_eq!(pools[2].block_count, 8);
    }

    #[test]
    fn pool_stats_merge_unnamed_pools_into_one_row() {
        let raw: RawPoolStats = serde_json::from_value(json!({
            "pools": [
                {"name": "", "blockCount": 3},
                {"name": null, "blockCount": 4},
                {"name": "A", "blockCount": 5},
                {"blockCount": 1}
            ],
            "blockCount": 20
        }))
        .unwrap();
        let pools = rank_pool_stats(raw).unwrap();
        let names: Vec<&str> = pools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![UNKNOWN_POOL, "A"]);
        assert_eq!(pools[0].block_count, 8);
        assert_eq!(pools[0].percentage, 40.0);
        assert_eq!(pools[1].percentage, 25.0);
    }

    #[test]
    fn pool_stats_with_zero_total_is_rejected() {
        let raw: RawPoolStats =
            serde_json::from_value(json!({"pools": [], "blockCount": 0})).unwrap();
        assert!(rank_pool_stats(raw).is_err());
    }

    #[test]
    fn block_window_uses_embedded_name_then_coinbase() {
        let blocks = vec![
            raw_block(4, json!({"pool": {"name": "SpiderPool"}})),
            raw_block(3, json!({"coinbaseRaw": hex("/Foundry USA Pool/")})),
            raw_block(2, json!({"coinbaseRaw": hex("mined by nobody")})),
            raw_block(1, serde_json::Value::Null),
        ];
        let pools = rank_block_window(&blocks);
        let names: Vec<&str> = pools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![UNKNOWN_POOL, "SpiderPool", "Foundry USA"]);
        assert_eq!(pools[0].block_count, 2);
        assert_eq!(pools[0].percentage, 50.0);
        let total: f64 = pools.iter().map(|p| p.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }
}
