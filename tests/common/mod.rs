// Shared test helpers: a fake upstream serving both chain providers and the price API.
#![allow(dead_code)]

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use btc_dashboard::config::{AppConfig, ProvidersConfig};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TIP_HEIGHT: u64 = 840_000;
pub const DIFFICULTY: f64 = 83_148_355_189_239.77;

/// Canned responses keyed by request path (query ignored), with hit counters.
#[derive(Default)]
pub struct FakeState {
    responses: Mutex<HashMap<String, (StatusCode, String)>>,
    hits: Mutex<HashMap<String, usize>>,
}

pub struct FakeUpstream {
    pub base: String,
    state: Arc<FakeState>,
}

async fn serve_canned(State(state): State<Arc<FakeState>>, uri: Uri) -> impl IntoResponse {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_default() += 1;
    match state.responses.lock().unwrap().get(&path) {
        Some((status, body)) => (*status, body.clone()),
        None => (StatusCode::NOT_FOUND, format!("no route {path}")),
    }
}

pub fn block_hash(height: u64) -> String {
    format!("{height:064x}")
}

/// Esplora-shaped block; `extras` is the mempool.space addition (pass `Value::Null` to omit).
pub fn block_json(height: u64, extras: Value) -> Value {
    let mut block = json!({
        "id": block_hash(height),
        "height": height,
        "version": 536870912,
        "timestamp": 1_700_000_000 + height,
        "tx_count": 3000,
        "size": 1_500_000,
        "weight": 3_993_000,
        "merkle_root": "ab".repeat(32),
        "previousblockhash": block_hash(height - 1),
        "mediantime": 1_699_999_000,
        "nonce": 12345,
        "bits": 386_089_497,
        "difficulty": DIFFICULTY,
    });
    if !extras.is_null() {
        block["extras"] = extras;
    }
    block
}

pub fn pool_extras(name: &str) -> Value {
    json!({ "pool": { "name": name } })
}

/// Newest-first list of `n` blocks ending at the tip, pools cycling through `pools`.
pub fn block_list(n: u64, pools: &[&str]) -> Value {
    let blocks: Vec<Value> = (0..n)
        .map(|i| {
            let extras = if pools.is_empty() {
                Value::Null
            } else {
                pool_extras(pools[i as usize % pools.len()])
            };
            block_json(TIP_HEIGHT - i, extras)
        })
        .collect();
    Value::Array(blocks)
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(serve_canned).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base: format!("http://{addr}"),
            state,
        }
    }

    /// Every endpoint answering with healthy data.
    pub async fn healthy() -> Self {
        let up = Self::start().await;
        up.set_json(
            "/cg/simple/price",
            json!({"bitcoin": {
                "usd": 67432.1,
                "usd_24h_change": 1.25,
                "usd_24h_vol": 2.5e10,
                "last_updated_at": 1_700_000_000
            }}),
        );
        for provider in ["/mempool", "/esplora"] {
            up.set_text(&format!("{provider}/blocks/tip/height"), TIP_HEIGHT.to_string());
            up.set_text(
                &format!("{provider}/block-height/{TIP_HEIGHT}"),
                block_hash(TIP_HEIGHT),
            );
            up.set_json(
                &format!("{provider}/block/{}", block_hash(TIP_HEIGHT)),
                block_json(TIP_HEIGHT, Value::Null),
            );
        }
        up.set_json(
            "/mempool/v1/blocks",
            block_list(10, &["Foundry USA", "AntPool", "Foundry USA"]),
        );
        up.set_json("/esplora/blocks", block_list(10, &[]));
        up.set_json(
            "/mempool/mempool",
            json!({
                "count": 45_000,
                "vsize": 25_000_000,
                "total_fee": 1.2e7,
                "fee_histogram": [[12.5, 50_000.0], [3.0, 120_000.0]]
            }),
        );
        up.set_json(
            "/mempool/v1/fees/recommended",
            json!({
                "fastestFee": 20,
                "halfHourFee": 15,
                "hourFee": 10,
                "economyFee": 5,
                "minimumFee": 1
            }),
        );
        up.set_json(
            "/mempool/v1/mining/pools/1w",
            json!({
                "pools": [
                    {"name": "AntPool", "blockCount": 200},
                    {"name": "Foundry USA", "blockCount": 300}
                ],
                "blockCount": 1000
            }),
        );
        up
    }

    pub fn set(&self, path: &str, status: StatusCode, body: impl Into<String>) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    pub fn set_text(&self, path: &str, body: impl Into<String>) {
        self.set(path, StatusCode::OK, body);
    }

    pub fn set_json(&self, path: &str, body: Value) {
        self.set(path, StatusCode::OK, body.to_string());
    }

    pub fn fail(&self, path: &str) {
        self.set(path, StatusCode::INTERNAL_SERVER_ERROR, "upstream down");
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self, prefix: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p.starts_with(prefix))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn providers_config(&self) -> ProvidersConfig {
        ProvidersConfig {
            price_url: format!("{}/cg", self.base),
            mempool_url: format!("{}/mempool", self.base),
            blockstream_url: format!("{}/esplora", self.base),
            request_timeout_secs: 2,
            user_agent: None,
        }
    }

    /// Full app config pointing at this upstream; `refresh` is appended verbatim.
    pub fn app_config(&self, refresh: &str) -> AppConfig {
        let toml = format!(
            r#"
[server]
port = 8081
host = "127.0.0.1"

[providers]
price_url = "{base}/cg/"
mempool_url = "{base}/mempool"
blockstream_url = "{base}/esplora"
request_timeout_secs = 2

[refresh]
{refresh}

[publishing]
broadcast_capacity = 16

[monitoring]
stats_log_interval_secs = 60
"#,
            base = self.base,
        );
        AppConfig::load_from_str(&toml).unwrap()
    }
}
