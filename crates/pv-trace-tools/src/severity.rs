//! Keyword-based severity classification.

use pv_protocol::{Severity, TraceEvent};

/// Keyword rules in priority order. The first keyword found in either the
/// operation or the result decides; later rules are not consulted.
pub const SEVERITY_RULES: &[(&str, Severity)] = &[
    ("ERROR", Severity::High),
    ("ACCESS DENIED", Severity::High),
    ("SUCCESS", Severity::Low),
    ("READ", Severity::Medium),
    ("WRITE", Severity::Medium),
];

/// Classify an event by its operation and result text (case-sensitive).
pub fn classify(event: &TraceEvent) -> Severity {
    classify_text(&event.operation, &event.result)
}

pub(crate) fn classify_text(operation: &str, result: &str) -> Severity {
    SEVERITY_RULES
        .iter()
        .find(|(keyword, _)| operation.contains(keyword) || result.contains(keyword))
        .map(|(_, severity)| *severity)
        .unwrap_or_default()
}
