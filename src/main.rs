use anyhow::Result;
use btc_dashboard::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(name = version::NAME, version = version::VERSION, "starting");

    let (tx, _) =
        broadcast::channel::<models::DashboardSnapshot>(app_config.publishing.broadcast_capacity);
    let repo = Arc::new(provider_repo::ProviderRepo::new(&app_config.providers)?);
    let aggregator = Arc::new(aggregator::Aggregator::new(
        repo,
        app_config.refresh.recent_blocks_count,
        tx,
    ));

    let ws_dashboard_connections = Arc::new(AtomicUsize::new(0));
    let auto_refresh = worker::AutoRefresh::new(app_config.refresh.auto_refresh);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            aggregator: aggregator.clone(),
            ws_dashboard_connections: ws_dashboard_connections.clone(),
            stats: Arc::new(worker::RefreshStats::default()),
            auto_refresh: auto_refresh.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            refresh: app_config.refresh.clone(),
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(
        aggregator,
        ws_dashboard_connections,
        auto_refresh,
        app_config.clone(),
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    Ok(())
}
