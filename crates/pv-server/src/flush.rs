//! Periodic process-batch and stats broadcasts.
//!
//! Both timers run independently of ingestion and do nothing while no
//! subscriber is connected. While idle, buckets keep accumulating and are
//! delivered on the first flush after someone connects.

use std::time::Duration;

use tokio::time;

use pv_protocol::ServerMessage;

use crate::state::AppState;

/// Shortest accepted timer period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Publish one `ProcessBatch` per non-empty bucket.
///
/// Returns the number of batches sent; 0 without draining when nobody is
/// connected.
pub async fn flush_batches(state: &AppState) -> usize {
    if state.hub.subscriber_count().await == 0 {
        return 0;
    }

    let batches = state.core.lock().await.buckets.drain_all();
    let sent = batches.len();
    for batch in batches {
        state.hub.publish(&ServerMessage::ProcessBatch(batch)).await;
    }
    sent
}

/// Publish the current stats snapshot. Returns false when nobody is connected.
pub async fn broadcast_stats(state: &AppState) -> bool {
    if state.hub.subscriber_count().await == 0 {
        return false;
    }

    let snapshot = state.core.lock().await.stats.snapshot();
    state.hub.publish(&ServerMessage::Stats(snapshot)).await;
    true
}

/// Run the batch flush loop at `interval`.
///
/// This function runs forever until the task is cancelled.
pub async fn run_batches(state: AppState, interval: Duration) {
    let mut ticker = time::interval(interval.max(MIN_PERIOD));
    // Skip the first tick (fires immediately).
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let sent = flush_batches(&state).await;
        if sent > 0 {
            tracing::debug!(batches = sent, "process batches flushed");
        }
    }
}

/// Run the stats broadcast loop at `interval`.
pub async fn run_stats(state: AppState, interval: Duration) {
    let mut ticker = time::interval(interval.max(MIN_PERIOD));
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if broadcast_stats(&state).await {
            tracing::trace!("stats broadcast");
        }
    }
}
