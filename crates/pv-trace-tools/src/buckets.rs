//! Per-process event buckets, drained on a timer.

use indexmap::IndexMap;

use pv_protocol::{ProcessBatch, TraceEvent};

/// Queues admitted events by process name until the next drain.
///
/// Keys are kept in first-seen order and are never removed; draining or
/// clearing only empties the queues.
#[derive(Debug, Clone, Default)]
pub struct BucketAggregator {
    buckets: IndexMap<String, Vec<TraceEvent>>,
}

impl BucketAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: TraceEvent) {
        self.buckets
            .entry(event.process_name.clone())
            .or_default()
            .push(event);
    }

    /// Take every non-empty bucket as a batch and leave it empty.
    pub fn drain_all(&mut self) -> Vec<ProcessBatch> {
        self.buckets
            .iter_mut()
            .filter(|(_, events)| !events.is_empty())
            .map(|(name, events)| ProcessBatch::new(name.clone(), std::mem::take(events)))
            .collect()
    }

    pub fn clear(&mut self) {
        for events in self.buckets.values_mut() {
            events.clear();
        }
    }

    /// Events waiting across all buckets.
    pub fn pending(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Processes seen since startup.
    pub fn process_count(&self) -> usize {
        self.buckets.len()
    }
}
