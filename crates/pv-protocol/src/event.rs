use serde::{Deserialize, Serialize};

/// Coarse priority assigned to a trace event from its operation/result text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    #[default]
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traced operation, parsed from a single line of tracer output.
///
/// Field values are kept exactly as the tracer printed them; ids stay
/// strings because the tracer never guarantees their numeric range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    /// Wall-clock time as printed (e.g. "21:06:14.1822").
    pub timestamp: String,
    pub process_name: String,
    pub process_id: String,
    pub thread_id: String,
    /// Event provider, e.g. "FileIO" or "Registry".
    pub category: String,
    /// Operation within the category, e.g. "Write".
    pub operation: String,
    /// Quoted subject of the operation (path, key, endpoint).
    pub target: String,
    /// `target` cut to at most 40 characters for display.
    pub target_short: String,
    /// Free-form text between the target and the result; may be empty.
    pub details: String,
    pub result: String,
    #[serde(default)]
    pub severity: Severity,
}
