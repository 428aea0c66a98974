// Background polling harness: one refresh loop per data kind.
// Retries live here; the aggregator and provider repo stay one-shot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

use crate::aggregator::Aggregator;
use crate::config::RefreshConfig;
use crate::models::DataKind;

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Delay before retry number `attempt` (0-based): 1s, 2s, 4s, ... capped at 30s.
pub fn retry_delay(attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    RETRY_BASE_DELAY
        .checked_mul(factor)
        .map_or(RETRY_MAX_DELAY, |d| d.min(RETRY_MAX_DELAY))
}

/// Refresh outcome counters, shared with the stats log.
#[derive(Debug, Default)]
pub struct RefreshStats {
    pub successes: AtomicU64,
    pub failures: AtomicU64,
    pub retries: AtomicU64,
}

impl RefreshStats {
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

/// Pause/resume switch for scheduled refreshes, shared by the worker loops and
/// the HTTP routes. Manual refresh triggers ignore it.
#[derive(Debug, Clone)]
pub struct AutoRefresh(Arc<watch::Sender<bool>>);

impl AutoRefresh {
    pub fn new(enabled: bool) -> Self {
        let (tx, _) = watch::channel(enabled);
        Self(Arc::new(tx))
    }

    pub fn is_enabled(&self) -> bool {
        *self.0.borrow()
    }

    /// Flip the switch; returns the previous state.
    pub fn set(&self, enabled: bool) -> bool {
        self.0.send_replace(enabled)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}

/// Shared state and shutdown for the worker.
pub struct WorkerDeps {
    pub aggregator: Arc<Aggregator>,
    pub ws_dashboard_connections: Arc<AtomicUsize>,
    pub stats: Arc<RefreshStats>,
    pub auto_refresh: AutoRefresh,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Worker timing config.
pub struct WorkerConfig {
    pub refresh: RefreshConfig,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Spawns one loop per [`DataKind`] plus the stats logger. The returned handle
/// completes once every loop has observed shutdown.
pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        aggregator,
        ws_dashboard_connections,
        stats,
        auto_refresh,
        shutdown_rx,
    } = deps;
    let WorkerConfig {
        refresh,
        stats_log_interval_secs,
    } = config;

    let mut tasks = JoinSet::new();
    for kind in DataKind::ALL {
        let period = refresh.interval_for(kind);
        let span = tracing::debug_span!("poll", kind = %kind, period_secs = period.as_secs());
        tasks.spawn(
            poll_kind(
                aggregator.clone(),
                kind,
                period,
                refresh.retry_count,
                stats.clone(),
                auto_refresh.subscribe(),
                shutdown_rx.clone(),
            )
            .instrument(span),
        );
    }
    tasks.spawn(log_stats(
        Duration::from_secs(stats_log_interval_secs),
        ws_dashboard_connections,
        stats,
        shutdown_rx,
    ));

    tokio::spawn(async move {
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                tracing::warn!(error = %e, "worker task ended abnormally");
            }
        }
        tracing::debug!("Worker shutting down");
    })
}

/// The first tick always fetches so a paused dashboard still fills once.
/// Later ticks are skipped while auto-refresh is off; on resume the interval
/// restarts, so the next fetch is one full period later.
async fn poll_kind(
    aggregator: Arc<Aggregator>,
    kind: DataKind,
    period: Duration,
    retry_count: u32,
    stats: Arc<RefreshStats>,
    mut auto_refresh: watch::Receiver<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut initial = true;

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = shutdown_rx.changed() => break,
        }
        if !initial && !*auto_refresh.borrow_and_update() {
            tracing::debug!("auto-refresh paused");
            if !wait_for_resume(&mut auto_refresh, &mut shutdown_rx).await {
                break;
            }
            tracing::debug!("auto-refresh resumed");
            tick.reset();
            continue;
        }
        initial = false;
        if refresh_with_retry(&aggregator, kind, retry_count, &stats, &mut shutdown_rx).await {
            break;
        }
    }
}

/// Parks until auto-refresh is switched back on. `false` on shutdown.
async fn wait_for_resume(
    auto_refresh: &mut watch::Receiver<bool>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        resumed = async { auto_refresh.wait_for(|enabled| *enabled).await.is_ok() } => resumed,
        _ = shutdown_rx.changed() => false,
    }
}

/// One scheduled refresh. Returns `true` when shutdown arrived mid-retry.
async fn refresh_with_retry(
    aggregator: &Aggregator,
    kind: DataKind,
    retry_count: u32,
    stats: &RefreshStats,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> bool {
    let mut attempt = 0;
    loop {
        let outcome = aggregator.fetch_kind(kind).await;
        match &outcome {
            Ok(_) => {
                stats.successes.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) if attempt < retry_count => {
                let delay = retry_delay(attempt);
                tracing::debug!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "refresh failed, retrying");
                stats.retries.fetch_add(1, Ordering::Relaxed);
                attempt += 1;
                tokio::select! {
                    _ = tokio::time::sleep(delay) => continue,
                    _ = shutdown_rx.changed() => return true,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, attempts = attempt + 1, "refresh failed");
                stats.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        aggregator.apply(kind, outcome).await;
        return false;
    }
}

async fn log_stats(
    period: Duration,
    ws_dashboard_connections: Arc<AtomicUsize>,
    stats: Arc<RefreshStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick is immediate; nothing to report yet.
    tick.tick().await;
    loop {
        tokio::select! {
            _ = tick.tick() => {
                tracing::info!(
                    ws_dashboard_clients = ws_dashboard_connections.load(Ordering::Relaxed),
                    refresh_successes_total = stats.successes(),
                    refresh_failures_total = stats.failures(),
                    refresh_retries_total = stats.retries(),
                    "app stats"
                );
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}
