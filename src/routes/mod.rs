// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::Aggregator;
use crate::config::AppConfig;
use crate::worker::AutoRefresh;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Arc<Aggregator>,
    pub(crate) ws_dashboard_connections: Arc<AtomicUsize>,
    pub(crate) auto_refresh: AutoRefresh,
    pub(crate) config: AppConfig,
}

pub fn app(
    aggregator: Arc<Aggregator>,
    ws_dashboard_connections: Arc<AtomicUsize>,
    auto_refresh: AutoRefresh,
    config: AppConfig,
) -> Router {
    let state = AppState {
        aggregator,
        ws_dashboard_connections,
        auto_refresh,
        config,
    };
    Router::new()
        .route("/", get(|| async { "btc-dashboard: data layer up" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/schedule", get(http::schedule_handler)) // GET /api/schedule
        .route("/api/display", get(http::display_handler)) // GET /api/display?unit=
        .route("/api/refresh", post(http::refresh_all_handler)) // POST /api/refresh
        .route("/api/refresh/{kind}", post(http::refresh_kind_handler)) // POST /api/refresh/{kind}
        .route("/api/auto-refresh", post(http::auto_refresh_handler)) // POST /api/auto-refresh
        .route("/api/{kind}", get(http::kind_handler)) // GET /api/{kind}
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
