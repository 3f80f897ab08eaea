//! Server → subscriber messages.
//!
//! Individual events go out as bare `TraceEvent` objects and the greeting has
//! no `type` tag; everything else is a tagged `ServerMessage`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::TraceEvent;

pub const WELCOME_TEXT: &str = "Welcome to Process Visualizer+";

/// Greeting sent once on every new connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    pub status: String,
    pub message: String,
}

impl Welcome {
    pub fn connected() -> Self {
        Self {
            status: "connected".into(),
            message: WELCOME_TEXT.into(),
        }
    }
}

/// Events accumulated for one process since the previous flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessBatch {
    pub process_name: String,
    pub count: usize,
    pub events: Vec<TraceEvent>,
}

impl ProcessBatch {
    pub fn new(process_name: impl Into<String>, events: Vec<TraceEvent>) -> Self {
        Self {
            process_name: process_name.into(),
            count: events.len(),
            events,
        }
    }
}

/// Point-in-time copy of the running counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Total admitted events since startup.
    #[serde(rename = "events")]
    pub total_events: u64,
    pub per_category: BTreeMap<String, u64>,
}

/// Full filter state, echoed back after every filter update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub categories: Vec<String>,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

/// Tagged messages pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "ProcessBatch")]
    ProcessBatch(ProcessBatch),
    #[serde(rename = "stats")]
    Stats(StatsSnapshot),
    #[serde(rename = "filtersAck")]
    FiltersAck(FilterState),
    #[serde(rename = "commandAck")]
    CommandAck { cmd: String },
}
