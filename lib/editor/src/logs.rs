//! Log entry identity and deduplicated merging.
//!
//! The telemetry channel may redeliver an event after a reconnect, and
//! the catch-up fetch overlaps with the live stream. Entry identity is
//! decided here so the log pane never shows duplicates: an explicit `id`
//! wins when present, otherwise a composite of the descriptive fields.
//!
//! Both operations are pure, total and order-preserving. Key computation
//! degrades instead of failing: if the message cannot be serialized the
//! key falls back to the debug rendering of the whole entry, which still
//! distinguishes distinct entries.

use copper_canvas_core::{NodeId, RunId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// One log line, streamed or bulk-loaded.
///
/// Transports disagree about which fields they fill in, so everything
/// except `message` is optional and `message` defaults to JSON null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogEntry {
    /// Server-assigned entry id. May be a string or a number on the
    /// wire; kept verbatim and stringified for identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    /// Event kind (`log`, `node`, `status`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub message: JsonValue,
}

impl LogEntry {
    /// Convenience constructor for a plain message entry.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: JsonValue::String(text.into()),
            ..Self::default()
        }
    }
}

/// Computes the dedup identity key for an entry.
///
/// Prefers the explicit `id` when present and non-null; otherwise a
/// composite of `(type, run_id, node_id, timestamp, level, message)`.
#[must_use]
pub fn identity_key(entry: &LogEntry) -> String {
    if let Some(id) = &entry.id
        && !id.is_null()
    {
        return format!("id:{}", stringify(id));
    }

    let message = serde_json::to_string(&entry.message)
        .unwrap_or_else(|_| format!("{:?}", entry.message));
    format!(
        "t={}|r={}|n={}|ts={}|lv={}|m={message}",
        entry.kind.as_deref().unwrap_or(""),
        entry.run_id.as_ref().map_or("", RunId::as_str),
        entry.node_id.as_ref().map_or("", NodeId::as_str),
        entry.timestamp.as_deref().unwrap_or(""),
        entry.level.as_deref().unwrap_or(""),
    )
}

/// Renders an id value without JSON quoting so `"7"` and `7` collide.
fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Drops entries whose identity key was already seen, preserving
/// first-seen order.
#[must_use]
pub fn normalize(entries: Vec<LogEntry>) -> Vec<LogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(identity_key(entry)))
        .collect()
}

/// Appends `incoming` unless its identity key already exists.
///
/// Returns `None` for a duplicate, the no-op sentinel callers use to
/// skip a state update entirely.
#[must_use]
pub fn append(existing: &[LogEntry], incoming: LogEntry) -> Option<Vec<LogEntry>> {
    let key = identity_key(&incoming);
    if existing.iter().any(|entry| identity_key(entry) == key) {
        return None;
    }
    let mut merged = Vec::with_capacity(existing.len() + 1);
    merged.extend_from_slice(existing);
    merged.push(incoming);
    Some(merged)
}

/// Decodes a logs payload leniently.
///
/// Accepts a bare array or a `{logs: [...]}` envelope; anything else is
/// an empty list. Entries that fail to decode are skipped.
#[must_use]
pub fn decode_log_list(payload: &JsonValue) -> Vec<LogEntry> {
    let items = match payload {
        JsonValue::Array(items) => items.as_slice(),
        JsonValue::Object(map) => match map.get("logs") {
            Some(JsonValue::Array(items)) => items.as_slice(),
            _ => {
                tracing::debug!("logs payload had no array; coercing to empty");
                &[]
            }
        },
        _ => {
            tracing::debug!("logs payload was not an array; coercing to empty");
            &[]
        }
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable log entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_with_id(id: JsonValue, text: &str) -> LogEntry {
        LogEntry {
            id: Some(id),
            ..LogEntry::message(text)
        }
    }

    #[test]
    fn explicit_id_wins_over_fields() {
        let a = entry_with_id(json!("l1"), "first");
        let b = entry_with_id(json!("l1"), "different text, same id");
        assert_eq!(identity_key(&a), identity_key(&b));
    }

    #[test]
    fn numeric_and_string_ids_collide() {
        let a = entry_with_id(json!(7), "x");
        let b = entry_with_id(json!("7"), "y");
        assert_eq!(identity_key(&a), identity_key(&b));
    }

    #[test]
    fn null_id_falls_back_to_composite() {
        let a = entry_with_id(JsonValue::Null, "hello");
        let b = LogEntry::message("hello");
        assert_eq!(identity_key(&a), identity_key(&b));
        let c = LogEntry::message("other");
        assert_ne!(identity_key(&a), identity_key(&c));
    }

    #[test]
    fn normalize_preserves_first_seen_order() {
        let entries = vec![
            LogEntry::message("a"),
            LogEntry::message("b"),
            LogEntry::message("a"),
            LogEntry::message("c"),
        ];
        let normalized = normalize(entries);
        let texts: Vec<_> = normalized
            .iter()
            .map(|e| e.message.as_str().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn append_rejects_duplicates() {
        let existing = vec![entry_with_id(json!("l1"), "one")];
        assert!(append(&existing, entry_with_id(json!("l1"), "one again")).is_none());

        let merged = append(&existing, entry_with_id(json!("l2"), "two")).expect("appended");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn append_then_normalize_is_idempotent() {
        let entries = vec![LogEntry::message("a"), LogEntry::message("b")];
        let with_dup = {
            let mut v = entries.clone();
            v.push(LogEntry::message("a"));
            v
        };
        assert_eq!(normalize(with_dup), normalize(entries));
    }

    #[test]
    fn decode_log_list_accepts_both_shapes() {
        let bare = json!([{ "id": "l1", "message": "x" }]);
        let wrapped = json!({ "logs": [{ "id": "l1", "message": "x" }] });
        assert_eq!(decode_log_list(&bare).len(), 1);
        assert_eq!(decode_log_list(&wrapped).len(), 1);
        assert!(decode_log_list(&json!("garbage")).is_empty());
        assert!(decode_log_list(&json!({ "logs": 5 })).is_empty());
    }
}
