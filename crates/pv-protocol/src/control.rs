//! Subscriber → server control messages.

use serde::{Deserialize, Deserializer, Serialize};

/// Command name understood by the `command` message.
pub const CMD_CLEAR_BUCKETS: &str = "clearBuckets";

/// Inbound message from a subscriber, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "filters")]
    Filters(FilterUpdate),
    #[serde(rename = "command")]
    Command { cmd: String },
    #[serde(rename = "statsRequest")]
    StatsRequest,
}

/// Partial filter replacement. Each list that is present replaces the
/// matching filter set wholesale; absent lists leave it untouched.
///
/// A field that is present but not an array counts as absent. Non-string
/// array elements are kept as their JSON text, so `[1]` is a non-empty list
/// that matches no real operation or category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterUpdate {
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<String>>,
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    })
}
