//! The editor action union.
//!
//! A closed, typed set of transitions. The reducer is total over this
//! enum; payload-shaped leniency (raw JSON for runs and logs) lives in
//! the variants that receive server data.

use crate::logs::LogEntry;
use crate::state::{PanelTab, SaveStatus, ValidationNotice};
use copper_canvas_core::{EdgeId, NodeId, WorkflowId};
use serde_json::Value as JsonValue;

/// Every transition the editor state store accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    SetWorkflowName(String),
    SetWorkflowId(Option<WorkflowId>),
    SetAutosave(bool),
    /// A graph mutation or form edit happened; must be dispatched
    /// synchronously with the mutation so unsaved-changes UI is never
    /// stale.
    MarkDirty,
    /// A save completed.
    MarkClean,
    SetSaveStatus(SaveStatus),
    SetSelectedNodeId(Option<NodeId>),
    SetSelectedEdgeId(Option<EdgeId>),
    /// Replaces the multi-select set wholesale.
    SetSelection(Vec<String>),
    /// Adds or removes one id from the multi-select set.
    ToggleSelection(String),
    ClearSelection,
    SetPanelOpen(bool),
    SetPanelWidth(f64),
    SetPanelTab(PanelTab),
    /// Replaces the run list; last write wins. Raw payload, coerced
    /// leniently.
    SetRuns(JsonValue),
    /// Replaces the selected-run logs after a normalize pass. Raw
    /// payload, coerced leniently.
    SetSelectedRunLogs(JsonValue),
    /// Appends one streamed log entry if it is not a duplicate.
    AppendSelectedRunLog(LogEntry),
    SetValidationNotice(Option<ValidationNotice>),
    /// Returns the whole record to its initial state.
    Reset,
}
