//! Shared test utilities for the postureguard workspace.
//!
//! `xtask` and the CLI integration tests both compare reports against golden
//! files, so normalization lives in a regular library rather than a test module.

#![forbid(unsafe_code)]

use serde_json::Value;

pub const VERSION_PLACEHOLDER: &str = "__VERSION__";
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// `tool.version` is replaced only on a root report envelope (it has `schema`,
/// `tool`, `run`, `counts` and `findings`). Run timestamps and `duration_ms` are
/// replaced at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "run", "counts", "findings"]
            .iter()
            .all(|key| obj.contains_key(*key));
        if is_envelope
            && let Some(tool_obj) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool_obj.contains_key("name")
            && tool_obj.contains_key("version")
        {
            tool_obj.insert(
                "version".to_string(),
                Value::String(VERSION_PLACEHOLDER.to_string()),
            );
        }
    }
    normalize_timestamps_recursive(&mut value);
    value
}

fn normalize_timestamps_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "ended_at"] {
                if map.contains_key(key) {
                    map.insert(
                        key.to_string(),
                        Value::String(TIMESTAMP_PLACEHOLDER.to_string()),
                    );
                }
            }
            if map.contains_key("duration_ms") {
                map.insert("duration_ms".to_string(), Value::Number(0.into()));
            }
            for val in map.values_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_version_and_timings_are_normalized() {
        let input = json!({
            "schema": "postureguard.report.v1",
            "tool": { "name": "postureguard", "version": "0.1.0" },
            "run": {
                "started_at": "2026-01-01T00:00:00Z",
                "ended_at": "2026-01-01T00:00:01Z",
                "duration_ms": 1000
            },
            "counts": { "info": 0, "medium": 0, "high": 1 },
            "findings": [
                { "detail": { "domain": "identity", "principal_id": "svc", "version": "2" } }
            ]
        });

        let result = normalize_nondeterministic(input);
        assert_eq!(result["tool"]["version"], VERSION_PLACEHOLDER);
        assert_eq!(result["run"]["started_at"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(result["run"]["ended_at"], TIMESTAMP_PLACEHOLDER);
        assert_eq!(result["run"]["duration_ms"], 0);
        assert_eq!(result["findings"][0]["detail"]["version"], "2");
    }

    #[test]
    fn non_envelope_keeps_tool_version() {
        let input = json!({
            "tool": { "name": "other", "version": "2.0.0" },
            "run": { "started_at": "2026-01-01T00:00:00Z" }
        });

        let result = normalize_nondeterministic(input);
        assert_eq!(result["tool"]["version"], "2.0.0");
        assert_eq!(result["run"]["started_at"], TIMESTAMP_PLACEHOLDER);
    }
}
