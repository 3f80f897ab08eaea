//! Running event counters.

use std::collections::BTreeMap;

use pv_protocol::{StatsSnapshot, TraceEvent};

/// Category label used when an event carries no category.
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Monotonic counters over every admitted event.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    total_events: u64,
    per_category: BTreeMap<String, u64>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &TraceEvent) {
        self.total_events += 1;
        let category = if event.category.is_empty() {
            UNKNOWN_CATEGORY
        } else {
            event.category.as_str()
        };
        *self.per_category.entry(category.to_string()).or_default() += 1;
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_events: self.total_events,
            per_category: self.per_category.clone(),
        }
    }
}
