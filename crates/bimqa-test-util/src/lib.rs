//! Shared test utilities for the bimqa workspace.
//!
//! `xtask` and the CLI integration tests both compare reports against golden
//! JSON, so the normalization lives in a regular crate rather than behind
//! `#[cfg(test)]`.

use serde_json::Value;

const TIMESTAMP: &str = "__TIMESTAMP__";
const VERSION: &str = "__VERSION__";

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// Only the root of a report envelope (an object with `schema`, `tool`,
/// `started_at`, `finished_at` and `sections`) is touched: its timestamps and
/// `tool.version`. Report sections may carry arbitrary names and
/// descriptions, so nested objects are left alone.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    let is_envelope = ["schema", "tool", "started_at", "finished_at", "sections"]
        .iter()
        .all(|key| obj.contains_key(*key));
    if !is_envelope {
        return value;
    }

    for key in ["started_at", "finished_at"] {
        obj.insert(key.to_string(), Value::String(TIMESTAMP.to_string()));
    }
    if let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
        && tool.contains_key("version")
    {
        tool.insert("version".to_string(), Value::String(VERSION.to_string()));
    }
    value
}
