//! Inbound control messages from subscribers.
//!
//! Decodes raw text frames into typed `ControlMessage` variants, applies them
//! to the shared state and produces the reply for the requesting connection.

use serde::Deserialize;

use pv_protocol::{CMD_CLEAR_BUCKETS, ClientMessage, FilterUpdate, ServerMessage};

use crate::state::AppState;

/// A classified inbound control frame.
#[derive(Debug)]
pub enum ControlMessage {
    /// Replace some or all filter sets.
    Filters(FilterUpdate),
    /// Empty every process bucket.
    ClearBuckets,
    /// Ask for a stats snapshot.
    StatsRequest,
    /// Not valid JSON.
    Malformed(String),
    /// Valid JSON with an unrecognized shape.
    Unknown(serde_json::Value),
}

/// Classify a raw text frame.
pub fn classify(raw: &str) -> ControlMessage {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return ControlMessage::Malformed(e.to_string()),
    };

    match ClientMessage::deserialize(&value) {
        Ok(ClientMessage::Filters(update)) => ControlMessage::Filters(update),
        Ok(ClientMessage::Command { cmd }) if cmd == CMD_CLEAR_BUCKETS => {
            ControlMessage::ClearBuckets
        }
        Ok(ClientMessage::StatsRequest) => ControlMessage::StatsRequest,
        Ok(ClientMessage::Command { .. }) | Err(_) => ControlMessage::Unknown(value),
    }
}

/// Apply one control frame and return the reply for the sender, if any.
///
/// Replies are never broadcast; the caller sends them on the originating
/// connection only.
pub async fn handle_message(state: &AppState, raw: &str) -> Option<ServerMessage> {
    match classify(raw) {
        ControlMessage::Filters(update) => {
            let current = {
                let mut core = state.core.lock().await;
                core.filters.apply(update);
                core.filters.state()
            };
            tracing::info!(
                categories = ?current.categories,
                whitelist = ?current.whitelist,
                blacklist = ?current.blacklist,
                "filters updated"
            );
            Some(ServerMessage::FiltersAck(current))
        }
        ControlMessage::ClearBuckets => {
            let (dropped, processes) = {
                let mut core = state.core.lock().await;
                let pending = core.buckets.pending();
                core.buckets.clear();
                (pending, core.buckets.process_count())
            };
            tracing::info!(dropped, processes, "process buckets cleared");
            Some(ServerMessage::CommandAck {
                cmd: CMD_CLEAR_BUCKETS.to_string(),
            })
        }
        ControlMessage::StatsRequest => {
            let snapshot = state.core.lock().await.stats.snapshot();
            Some(ServerMessage::Stats(snapshot))
        }
        ControlMessage::Malformed(error) => {
            tracing::warn!(error = %error, len = raw.len(), "bad control message, discarding");
            None
        }
        ControlMessage::Unknown(value) => {
            tracing::debug!(message = %value, "ignoring unrecognized control message");
            None
        }
    }
}
