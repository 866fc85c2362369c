//! Telemetry event decoding.
//!
//! The stream multiplexes three named event kinds. Every kind also
//! carries a log-pane rendering of the same payload, because `node` and
//! `status` events append to the selected-run logs in addition to their
//! primary effect. Decoding degrades instead of failing: an unreadable
//! payload still yields a log entry wrapping the raw value.

use crate::sse::SseFrame;
use copper_canvas_core::{NodeId, RunId};
use copper_canvas_editor::LogEntry;
use copper_canvas_graph::RuntimeStatus;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A `node` event: runtime status addressed to one node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeUpdate {
    /// The addressed node.
    #[serde(alias = "id")]
    pub node_id: NodeId,
    /// The overlay payload.
    #[serde(flatten)]
    pub status: RuntimeStatus,
}

/// A `status` event: run-level completion signal.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub run_id: Option<RunId>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The discriminated union a channel yields.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// A log line.
    Log { entry: LogEntry },
    /// A node runtime update, plus its log-pane rendering.
    Node { update: NodeUpdate, entry: LogEntry },
    /// Run completion, plus its log-pane rendering. Terminal: the
    /// channel closes after this.
    Status { update: StatusUpdate, entry: LogEntry },
}

impl TelemetryEvent {
    /// Decodes a frame. Returns `None` for unknown event names.
    #[must_use]
    pub fn decode(frame: &SseFrame) -> Option<Self> {
        let payload: JsonValue = serde_json::from_str(&frame.data).unwrap_or_else(|err| {
            tracing::debug!(error = %err, event = %frame.event, "unparseable event data; wrapping raw text");
            JsonValue::String(frame.data.clone())
        });
        let entry = log_rendering(&payload);

        match frame.event.as_str() {
            "log" => Some(Self::Log { entry }),
            "node" => match serde_json::from_value::<NodeUpdate>(payload) {
                Ok(update) => Some(Self::Node { update, entry }),
                Err(err) => {
                    // Without an addressed node there is no overlay to
                    // apply; the payload still reaches the log pane.
                    tracing::debug!(error = %err, "node event without usable node_id");
                    Some(Self::Log { entry })
                }
            },
            "status" => {
                let update = serde_json::from_value(payload).unwrap_or_default();
                Some(Self::Status { update, entry })
            }
            other => {
                tracing::debug!(event = other, "ignoring unknown telemetry event kind");
                None
            }
        }
    }
}

/// Renders a payload as a log entry, degrading to wrapping the whole
/// value as the message when it is not entry-shaped.
fn log_rendering(payload: &JsonValue) -> LogEntry {
    serde_json::from_value(payload.clone()).unwrap_or_else(|_| LogEntry {
        message: payload.clone(),
        ..LogEntry::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_canvas_graph::RunPhase;
    use serde_json::json;

    fn frame(event: &str, data: JsonValue) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn decodes_log_events() {
        let decoded =
            TelemetryEvent::decode(&frame("log", json!({ "id": "l1", "message": "hi" })));
        match decoded {
            Some(TelemetryEvent::Log { entry }) => {
                assert_eq!(entry.message, "hi");
                assert_eq!(entry.id, Some(json!("l1")));
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn decodes_node_events_with_overlay() {
        let decoded = TelemetryEvent::decode(&frame(
            "node",
            json!({ "node_id": "n1", "status": "running", "progress": 0.4 }),
        ));
        match decoded {
            Some(TelemetryEvent::Node { update, entry }) => {
                assert_eq!(update.node_id.as_str(), "n1");
                assert_eq!(update.status.status, RunPhase::Running);
                assert_eq!(update.status.progress, Some(0.4));
                assert_eq!(entry.node_id.as_ref().map(|n| n.as_str()), Some("n1"));
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn node_event_without_id_degrades_to_log() {
        let decoded = TelemetryEvent::decode(&frame("node", json!({ "status": "running" })));
        assert!(matches!(decoded, Some(TelemetryEvent::Log { .. })));
    }

    #[test]
    fn decodes_status_events() {
        let decoded = TelemetryEvent::decode(&frame(
            "status",
            json!({ "run_id": 500, "status": "success" }),
        ));
        match decoded {
            Some(TelemetryEvent::Status { update, .. }) => {
                assert_eq!(update.run_id.as_ref().map(|r| r.as_str()), Some("500"));
                assert_eq!(update.status.as_deref(), Some("success"));
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_kinds_are_ignored() {
        assert!(TelemetryEvent::decode(&frame("heartbeat", json!({}))).is_none());
    }

    #[test]
    fn unparseable_data_wraps_raw_text() {
        let raw = SseFrame {
            event: "log".to_string(),
            data: "not json".to_string(),
            id: None,
        };
        match TelemetryEvent::decode(&raw) {
            Some(TelemetryEvent::Log { entry }) => assert_eq!(entry.message, "not json"),
            other => panic!("unexpected decode: {other:?}"),
        }
    }
}
