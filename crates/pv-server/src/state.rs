//! Shared application state for the Axum server and background tasks.

use std::sync::Arc;

use tokio::sync::Mutex;

use pv_trace_tools::{BucketAggregator, FilterConfig, StatsTracker};

use crate::hub::BroadcastHub;

/// The mutable pipeline components, guarded together.
///
/// Ingestion holds the lock from admission through publishing, so a filter
/// change is either fully before or fully after any given event.
#[derive(Debug, Default)]
pub struct PipelineCore {
    /// Admission filters, one set for all subscribers.
    pub filters: FilterConfig,
    /// Running counters since startup.
    pub stats: StatsTracker,
    /// Per-process events awaiting the next batch flush.
    pub buckets: BucketAggregator,
}

/// Process-wide state, cheap to clone into handlers and tasks.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<Mutex<PipelineCore>>,
    /// Connected subscribers.
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    /// Create empty state with `subscriber_queue` slots per subscriber.
    pub fn new(subscriber_queue: usize) -> Self {
        Self {
            core: Arc::new(Mutex::new(PipelineCore::default())),
            hub: Arc::new(BroadcastHub::new(subscriber_queue)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(256)
    }
}
