//! wtrace line parser.
//!
//! Recognizes lines of the shape
//! `HH:MM:SS.frac  process  (pid.tid)  Category/Operation  'target'  details  -> RESULT`
//! and nothing else. Lines that do not match in full are dropped.

use regex::Regex;
use std::sync::LazyLock;

use pv_protocol::{Severity, TraceEvent};

use crate::severity;

/// Maximum display length of `target_short`, in characters.
pub const TARGET_SHORT_MAX: usize = 40;

const ELLIPSIS: &str = "...";

static RE_TRACE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]+)\s+(\S+)\s+\(([0-9]+)\.([0-9]+)\)\s+(\S+)/(\S+)\s+'([^']+)'\s*(.*?)\s*->\s*(\S+)$",
    )
    .unwrap()
});

/// Parse one raw line (without its newline) into a classified event.
///
/// Returns `None` for anything that is not a complete trace line.
pub fn parse_line(line: &str) -> Option<TraceEvent> {
    let caps = RE_TRACE_LINE.captures(line)?;

    let target = caps[7].to_string();
    let mut event = TraceEvent {
        timestamp: caps[1].to_string(),
        process_name: caps[2].to_string(),
        process_id: caps[3].to_string(),
        thread_id: caps[4].to_string(),
        category: caps[5].to_string(),
        operation: caps[6].to_string(),
        target_short: shorten_target(&target),
        target,
        details: caps[8].to_string(),
        result: caps[9].to_string(),
        severity: Severity::Info,
    };
    event.severity = severity::classify(&event);
    Some(event)
}

/// Parse a batch of lines, skipping blank and unrecognized ones.
pub fn parse_lines(lines: &[String]) -> Vec<TraceEvent> {
    lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| parse_line(l))
        .collect()
}

/// Cut `target` to `TARGET_SHORT_MAX` characters, ending in "..." when cut.
pub fn shorten_target(target: &str) -> String {
    if target.chars().count() <= TARGET_SHORT_MAX {
        return target.to_string();
    }
    let keep = TARGET_SHORT_MAX - ELLIPSIS.len();
    let mut short: String = target.chars().take(keep).collect();
    short.push_str(ELLIPSIS);
    short
}
