//! Run summaries for the history pane.

use copper_canvas_core::{RunId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One workflow run as listed by the runs endpoint.
///
/// Only the id is required; backends disagree about the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: RunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSummary {
    /// Convenience constructor for a bare run id.
    #[must_use]
    pub fn with_id(id: impl Into<RunId>) -> Self {
        Self {
            id: id.into(),
            workflow_id: None,
            status: None,
            created_at: None,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Wall-clock duration of the run in milliseconds, when both
    /// timestamps are present and parse as RFC 3339.
    #[must_use]
    pub fn duration_ms(&self) -> Option<i64> {
        let started = chrono::DateTime::parse_from_rfc3339(self.started_at.as_deref()?).ok()?;
        let finished = chrono::DateTime::parse_from_rfc3339(self.finished_at.as_deref()?).ok()?;
        Some((finished - started).num_milliseconds())
    }
}

/// Decodes a run-list payload leniently.
///
/// The runs endpoint returns either `{items: [...], total}` or a bare
/// array; anything else is coerced to an empty list. Entries that fail
/// to decode are skipped.
#[must_use]
pub fn decode_run_list(payload: &JsonValue) -> Vec<RunSummary> {
    let items = match payload {
        JsonValue::Array(items) => items.as_slice(),
        JsonValue::Object(map) => match map.get("items") {
            Some(JsonValue::Array(items)) => items.as_slice(),
            _ => {
                tracing::debug!("runs payload had no items array; coercing to empty");
                &[]
            }
        },
        _ => {
            tracing::debug!("runs payload was not an array; coercing to empty");
            &[]
        }
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(run) => Some(run),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable run entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_bare_array_and_envelope() {
        let bare = json!([{ "id": 500, "status": "running" }]);
        let wrapped = json!({ "items": [{ "id": "run_1" }], "total": 1 });

        let from_bare = decode_run_list(&bare);
        assert_eq!(from_bare.len(), 1);
        assert_eq!(from_bare[0].id.as_str(), "500");

        assert_eq!(decode_run_list(&wrapped).len(), 1);
    }

    #[test]
    fn garbage_coerces_to_empty() {
        assert!(decode_run_list(&json!(null)).is_empty());
        assert!(decode_run_list(&json!({ "total": 3 })).is_empty());
        assert!(decode_run_list(&json!("nope")).is_empty());
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let payload = json!([{ "id": "run_1" }, { "status": "no id here" }]);
        let runs = decode_run_list(&payload);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id.as_str(), "run_1");
    }

    #[test]
    fn duration_needs_both_parseable_timestamps() {
        let mut run = RunSummary::with_id("run_1");
        assert!(run.duration_ms().is_none());

        run.started_at = Some("2025-06-01T10:00:00Z".to_string());
        run.finished_at = Some("2025-06-01T10:00:02.500Z".to_string());
        assert_eq!(run.duration_ms(), Some(2500));

        run.finished_at = Some("about noon".to_string());
        assert!(run.duration_ms().is_none());
    }
}
