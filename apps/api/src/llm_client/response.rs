//! Best-effort decoding of oracle replies.
//!
//! The oracle is asked for JSON but may wrap it in a markdown fence or return
//! prose. Callers get an object map or an empty map, never an error.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::analysis::{Recommendation, SkillSet};

#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("reply is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("reply is JSON but not an object")]
    NotAnObject,
}

/// Strips one surrounding ```lang ... ``` fence when both ends are present.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };
    // Drop the optional language tag that directly follows the opening fence.
    let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    inner.trim()
}

/// Decodes `raw` into a JSON object, reporting why it could not.
pub fn try_parse(raw: &str) -> Result<Map<String, Value>, MalformedResponse> {
    match serde_json::from_str::<Value>(strip_code_fence(raw))? {
        Value::Object(map) => Ok(map),
        _ => Err(MalformedResponse::NotAnObject),
    }
}

/// Decodes `raw` into a JSON object, or an empty map if it is malformed.
pub fn parse(raw: &str) -> Map<String, Value> {
    try_parse(raw).unwrap_or_else(|e| {
        warn!("Discarding malformed oracle reply: {e}");
        Map::new()
    })
}

/// Reads `key` as a list of strings. Missing keys, non-arrays and non-string
/// items all degrade to nothing.
pub fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

pub fn skill_set(map: &Map<String, Value>, key: &str) -> SkillSet {
    string_list(map, key).into_iter().collect()
}

/// Reads `recommendations`, skipping items that lack any of the three fields.
pub fn recommendations(map: &Map<String, Value>) -> Vec<Recommendation> {
    map.get("recommendations")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
