// HTTP handlers: version, dashboard snapshot, per-kind views, refresh triggers, display strings

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::AppState;
use crate::display::DashboardDisplay;
use crate::models::{DataKind, KindView, UnitMode};
use crate::version::{NAME, VERSION};

/// Handler failures rendered as `{"error": "..."}`.
pub(super) enum ApiError {
    UnknownKind(String),
    Internal(anyhow::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownKind(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(e) => {
                tracing::warn!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn parse_kind(raw: &str) -> Result<DataKind, ApiError> {
    raw.parse().map_err(ApiError::UnknownKind)
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard: the current snapshot, every slot included.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.snapshot().await)
}

/// GET /api/{kind}
pub(super) async fn kind_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<KindView<serde_json::Value>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let snapshot = state.aggregator.snapshot().await;
    Ok(Json(snapshot.kind_view(kind)?))
}

/// POST /api/refresh/{kind}: fetch now, apply, return the kind's new view.
pub(super) async fn refresh_kind_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<KindView<serde_json::Value>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let snapshot = state.aggregator.refresh(kind).await;
    Ok(Json(snapshot.kind_view(kind)?))
}

/// POST /api/refresh: one full aggregation cycle.
pub(super) async fn refresh_all_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.refresh_all().await)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Schedule {
    intervals_ms: BTreeMap<&'static str, u64>,
    retry_count: u32,
    auto_refresh: bool,
}

/// GET /api/schedule: desired refresh interval per kind, as configured, and
/// whether scheduled refreshes are currently running.
pub(super) async fn schedule_handler(State(state): State<AppState>) -> impl IntoResponse {
    let refresh = &state.config.refresh;
    let intervals_ms = DataKind::ALL
        .into_iter()
        .map(|k| (k.as_str(), refresh.interval_for(k).as_millis() as u64))
        .collect();
    Json(Schedule {
        intervals_ms,
        retry_count: refresh.retry_count,
        auto_refresh: state.auto_refresh.is_enabled(),
    })
}

#[derive(Deserialize)]
pub(super) struct AutoRefreshRequest {
    enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoRefreshState {
    auto_refresh: bool,
}

/// POST /api/auto-refresh `{"enabled": false}` pauses scheduled refreshes,
/// `{"enabled": true}` resumes them.
pub(super) async fn auto_refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<AutoRefreshRequest>,
) -> impl IntoResponse {
    let previous = state.auto_refresh.set(request.enabled);
    if previous != request.enabled {
        tracing::info!(enabled = request.enabled, "auto-refresh toggled");
    }
    Json(AutoRefreshState {
        auto_refresh: request.enabled,
    })
}

#[derive(Deserialize)]
pub(super) struct DisplayQuery {
    unit: Option<String>,
}

/// GET /api/display?unit=btc|sats
pub(super) async fn display_handler(
    State(state): State<AppState>,
    Query(query): Query<DisplayQuery>,
) -> impl IntoResponse {
    let unit = query
        .unit
        .as_deref()
        .map(UnitMode::from_preference)
        .unwrap_or_default();
    let now_secs = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
    let snapshot = state.aggregator.snapshot().await;
    Json(DashboardDisplay::build(&snapshot, unit, now_secs))
}
