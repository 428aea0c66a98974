// Mining-pool attribution from coinbase tags, and ranking of a block window
// into a colored share distribution.

use crate::models::{MiningPool, UNKNOWN_POOL};

/// Display name -> lowercase tags looked for in the coinbase text.
/// Checked top to bottom; the first pool with any matching tag wins.
pub const POOL_TAGS: &[(&str, &[&str])] = &[
    ("Foundry USA", &["foundry usa", "foundry", "foundryusa"]),
    ("AntPool", &["antpool", "ant pool", "bitmain"]),
    ("F2Pool", &["f2pool", "f2pool.com", "discus fish"]),
    ("ViaBTC", &["viabtc", "via btc"]),
    ("Binance Pool", &["binance", "bnb pool"]),
    ("Braiins Pool", &["braiins", "slush", "slushpool"]),
    ("Luxor", &["luxor", "luxor mining"]),
    ("Poolin", &["poolin", "poolin.com"]),
    ("MARA Pool", &["mara", "marathon"]),
    ("Ocean", &["ocean", "ocean mining"]),
    ("Accelerate Mining", &["accelerate"]),
    ("SBI Crypto", &["sbi crypto"]),
    ("Riot", &["riot blockchain"]),
];

/// Colors handed out by rank, cycling.
pub const POOL_PALETTE: [&str; 8] = [
    "#F7931A", "#3B82F6", "#10B981", "#8B5CF6", "#EF4444", "#6B7280", "#F59E0B", "#8B7355",
];

/// Printable-ASCII text hidden in a hex payload. Each two-char group is one
/// byte; bytes outside 0x20..=0x7E, and groups that are not hex, are dropped.
pub fn coinbase_ascii(coinbase_hex: &str) -> String {
    coinbase_hex
        .as_bytes()
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
        .filter(|b| (0x20..=0x7E).contains(b))
        .map(char::from)
        .collect()
}

/// Pool name for a raw coinbase, or [`UNKNOWN_POOL`].
pub fn classify_coinbase(coinbase_hex: &str) -> &'static str {
    if coinbase_hex.is_empty() {
        return UNKNOWN_POOL;
    }
    let text = coinbase_ascii(coinbase_hex).to_lowercase();
    POOL_TAGS
        .iter()
        .find(|(_, tags)| tags.iter().any(|tag| text.contains(tag)))
        .map(|(name, _)| *name)
        .unwrap_or(UNKNOWN_POOL)
}

/// Resolve one block's pool: embedded name first, then the coinbase heuristic.
pub fn resolve_pool_name(embedded: Option<&str>, coinbase_hex: Option<&str>) -> String {
    match (embedded.filter(|n| !n.is_empty()), coinbase_hex) {
        (Some(name), _) => name.to_string(),
        (None, Some(hex)) => classify_coinbase(hex).to_string(),
        (None, None) => UNKNOWN_POOL.to_string(),
    }
}

/// Count blocks per pool name in first-seen order.
pub fn tally<I, S>(names: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tally_weighted(names.into_iter().map(|name| (name, 1)))
}

/// Sum block counts per pool name, keeping first-seen order.
pub fn tally_weighted<I, S>(entries: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = (S, u64)>,
    S: Into<String>,
{
    let mut counts: Vec<(String, u64)> = Vec::new();
    for (name, blocks) in entries {
        let name = name.into();
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, c)) => *c += blocks,
            None => counts.push((name, blocks)),
        }
    }
    counts
}

/// Percentages against `total_blocks`, sorted by share descending (ties keep
/// input order), colors assigned by resulting rank.
///
/// A pool's color follows its rank, so it can change between refreshes.
pub fn rank_pools(counts: Vec<(String, u64)>, total_blocks: u64) -> Vec<MiningPool> {
    let mut pools: Vec<MiningPool> = counts
        .into_iter()
        .map(|(name, block_count)| MiningPool {
            name,
            block_count,
            percentage: block_count as f64 / total_blocks as f64 * 100.0,
            color_token: String::new(),
        })
        .collect();
    pools.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    for (rank, pool) in pools.iter_mut().enumerate() {
        pool.color_token = POOL_PALETTE[rank % POOL_PALETTE.len()].to_string();
    }
    pools
}
