//! Read-only views of the live pipeline state.

use axum::Json;
use axum::extract::State;

use pv_protocol::{FilterState, StatsSnapshot};

use crate::state::AppState;

/// GET /api/v1/stats: current counters.
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.core.lock().await.stats.snapshot())
}

/// GET /api/v1/filters: current filter sets.
pub async fn get_filters(State(state): State<AppState>) -> Json<FilterState> {
    Json(state.core.lock().await.filters.state())
}
