//! Trace processing building blocks for procviz.
//!
//! Parses wtrace-style output lines into `TraceEvent`s, classifies their
//! severity, decides admission against the live filter set, keeps running
//! counters and per-process buckets, and tails the growing trace file.

pub mod buckets;
pub mod error;
pub mod filter;
pub mod parser;
pub mod severity;
pub mod source;
pub mod stats;

// Re-export key types for convenience
pub use buckets::BucketAggregator;
pub use error::{TraceError, TraceResult};
pub use filter::FilterConfig;
pub use parser::{parse_line, parse_lines};
pub use severity::classify;
pub use source::{FileTailer, TailConfig};
pub use stats::StatsTracker;
