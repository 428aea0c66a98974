// Ready-to-render strings for the dashboard, built from a snapshot through the formatters.

use serde::Serialize;

use crate::format;
use crate::models::{
    Block, DashboardSnapshot, HashrateDifficulty, MempoolSnapshot, MiningPool, PriceSnapshot,
    UnitMode,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDisplay {
    /// `"$67,432.10"` in BTC mode, `"1.5K sats"` (per dollar) in sats mode.
    pub primary: String,
    /// The other unit's rendering.
    pub secondary: String,
    pub change_24h: String,
    pub is_positive: bool,
    /// Compact dollar volume, `"$25B"`.
    pub volume_24h: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDisplay {
    pub height: u64,
    pub time_ago: String,
    pub size: String,
    pub tx_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolDisplay {
    pub tx_count: u64,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDisplay {
    pub hashrate: String,
    pub difficulty: String,
    pub adjustment_progress: String,
    pub time_to_adjustment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDisplay {
    pub label: String,
    pub blocks: u64,
    pub percentage: String,
    pub color_token: String,
}

/// Each section is absent while its kind is pending or failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDisplay {
    pub unit: UnitMode,
    pub price: Option<PriceDisplay>,
    pub latest_block: Option<BlockDisplay>,
    pub recent_blocks: Option<Vec<BlockDisplay>>,
    pub mempool: Option<MempoolDisplay>,
    pub network: Option<NetworkDisplay>,
    pub mining_pools: Option<Vec<PoolDisplay>>,
}

impl DashboardDisplay {
    /// `now_secs` is the wall clock used for "time ago" strings.
    pub fn build(snapshot: &DashboardSnapshot, unit: UnitMode, now_secs: f64) -> Self {
        Self {
            unit,
            price: snapshot.price.value().map(|p| price(p, unit)),
            latest_block: snapshot.latest_block.value().map(|b| block(b, now_secs)),
            recent_blocks: snapshot
                .recent_blocks
                .value()
                .map(|blocks| blocks.iter().map(|b| block(b, now_secs)).collect()),
            mempool: snapshot.mempool.value().map(mempool),
            network: snapshot.hashrate_difficulty.value().map(network),
            mining_pools: snapshot
                .mining_pools
                .value()
                .map(|pools| pools.iter().map(pool).collect()),
        }
    }
}

fn price(p: &PriceSnapshot, unit: UnitMode) -> PriceDisplay {
    let (primary, secondary) = match unit {
        UnitMode::Btc => (format::format_usd(p.usd), format::format_sat_price(p.usd)),
        UnitMode::Sats => (format::format_sats_per_usd(p.usd), format::format_usd(p.usd)),
    };
    PriceDisplay {
        primary,
        secondary,
        change_24h: format::format_percent_change(p.usd_24h_change),
        is_positive: p.usd_24h_change >= 0.0,
        volume_24h: format::format_usd_volume(p.usd_24h_volume),
    }
}

fn block(b: &Block, now_secs: f64) -> BlockDisplay {
    BlockDisplay {
        height: b.height,
        time_ago: format::format_time_ago(b.timestamp, now_secs),
        size: format::format_bytes(b.size_bytes as f64),
        tx_count: b.tx_count,
    }
}

fn mempool(m: &MempoolSnapshot) -> MempoolDisplay {
    MempoolDisplay {
        tx_count: m.tx_count,
        size: format::format_bytes(m.vsize_bytes as f64),
    }
}

fn network(h: &HashrateDifficulty) -> NetworkDisplay {
    NetworkDisplay {
        hashrate: format::format_hashrate(h.hashrate),
        difficulty: format::format_difficulty(h.difficulty),
        adjustment_progress: format!("{}%", format::to_fixed(h.adjustment_progress_percent, 0)),
        time_to_adjustment: format::format_duration(h.time_to_adjustment_ms),
    }
}

fn pool(p: &MiningPool) -> PoolDisplay {
    PoolDisplay {
        label: p.display_name().to_string(),
        blocks: p.block_count,
        percentage: format!("{}%", format::to_fixed(p.percentage, 1)),
        color_token: p.color_token.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KindValue, UNKNOWN_POOL};

    fn price_snapshot() -> PriceSnapshot {
        PriceSnapshot {
            usd: 67_432.1,
            usd_24h_change: -0.44,
            usd_24h_volume: 1.0e10,
            observed_at: 1_700_000_000,
        }
    }

    #[test]
    fn price_follows_unit_mode() {
        let s = DashboardSnapshot::pending(0).with_value(KindValue::Price(price_snapshot()), 1);

        let btc = DashboardDisplay::build(&s, UnitMode::Btc, 0.0).price.unwrap();
        assert_eq!(btc.primary, "$67,432.10");
        assert_eq!(btc.secondary, "1 sat = $0.00067432");
        assert_eq!(btc.change_24h, "-0.4%");
        assert!(!btc.is_positive);
        assert_eq!(btc.volume_24h, "$10B");

        let sats = DashboardDisplay::build(&s, UnitMode::Sats, 0.0).price.unwrap();
        assert_eq!(sats.primary, "1.5K sats");
        assert_eq!(sats.secondary, "$67,432.10");
    }

    #[test]
    fn unknown_pool_gets_readable_label() {
        let pools = vec![MiningPool {
            name: UNKNOWN_POOL.into(),
            block_count: 3,
            percentage: 3.0,
            color_token: "#F7931A".into(),
        }];
        let s = DashboardSnapshot::pending(0).with_value(KindValue::MiningPools(pools), 1);
        let d = DashboardDisplay::build(&s, UnitMode::Btc, 0.0);
        let shown = d.mining_pools.unwrap();
        assert_eq!(shown[0].label, "Unknown (Unidentified Pool)");
        assert_eq!(shown[0].percentage, "3.0%");
    }

    #[test]
    fn adjustment_progress_has_no_decimals() {
        let metrics = crate::derived::hashrate_difficulty(83e12, 2016 * 400 + 1000);
        let s = DashboardSnapshot::pending(0)
            .with_value(KindValue::HashrateDifficulty(metrics), 1);
        let network = DashboardDisplay::build(&s, UnitMode::Btc, 0.0).network.unwrap();
        // 1000 / 2016 is 49.6%
        assert_eq!(network.adjustment_progress, "50%");
        assert_eq!(network.difficulty, "83.00T");
    }

    #[test]
    fn pending_sections_are_absent() {
        let d = DashboardDisplay::build(&DashboardSnapshot::pending(0), UnitMode::Sats, 0.0);
        assert!(d.price.is_none());
        assert!(d.latest_block.is_none());
        assert!(d.network.is_none());
        assert_eq!(d.unit, UnitMode::Sats);
    }
}
