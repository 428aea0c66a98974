// Spot price and the collaborator's unit preference

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    /// Always > 0.
    pub usd: f64,
    /// Signed percent.
    pub usd_24h_change: f64,
    pub usd_24h_volume: f64,
    /// Unix seconds.
    pub observed_at: i64,
}

/// How prices are displayed; persisted by the client as "btc" or "sats".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    #[default]
    Btc,
    Sats,
}

impl UnitMode {
    /// Parse the last stored preference string; anything unrecognised is `Btc`.
    pub fn from_preference(s: &str) -> Self {
        match s {
            "sats" => UnitMode::Sats,
            _ => UnitMode::Btc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitMode::Btc => "btc",
            UnitMode::Sats => "sats",
        }
    }
}
