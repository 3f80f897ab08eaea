//! procviz server: tails a trace log and streams it to WebSocket subscribers.
//!
//! Wires the file tailer, the ingestion pipeline, the two flush timers and the
//! Axum listener into a single process.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use pv_server::config::ServerConfig;
use pv_server::routes::build_router;
use pv_server::state::AppState;
use pv_server::{flush, pipeline};
use pv_trace_tools::FileTailer;

/// Lines buffered between the tailer and the pipeline.
const LINE_QUEUE: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pv-server starting");

    // ── Load config ─────────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(&path)?,
        None => ServerConfig::default(),
    }
    .with_env_overrides();
    tracing::info!(
        log_path = %config.log_path,
        batch_flush_secs = config.batch_flush_secs,
        stats_interval_secs = config.stats_interval_secs,
        "config loaded"
    );

    // ── Shared state + pipeline ─────────────────────────────────
    let state = AppState::new(config.subscriber_queue);
    let (line_tx, line_rx) = mpsc::channel(LINE_QUEUE);
    let tailer = FileTailer::new(config.tail_config());

    // ── Listener ────────────────────────────────────────────────
    let app = build_router(state.clone());
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    tokio::select! {
        () = tailer.run(line_tx) => {
            tracing::error!("tailer exited unexpectedly");
        }
        () = pipeline::run(state.clone(), line_rx) => {
            tracing::error!("ingestion pipeline exited unexpectedly");
        }
        () = flush::run_batches(state.clone(), config.batch_flush_interval()) => {
            tracing::error!("batch flush loop exited unexpectedly");
        }
        () = flush::run_stats(state.clone(), config.stats_interval()) => {
            tracing::error!("stats loop exited unexpectedly");
        }
        result = async { axum::serve(listener, app).await } => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("pv-server stopped");
    Ok(())
}
