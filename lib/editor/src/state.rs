//! Editor-wide UI state.
//!
//! Everything every view reads except the graph itself: save status,
//! panel layout, selection, the run list and the streamed logs. One
//! instance exists per editor session; it is reset on `Reset` and torn
//! down with the session.

use crate::logs::LogEntry;
use crate::run::RunSummary;
use copper_canvas_core::{EdgeId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};

/// Save lifecycle of the open workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    /// Nothing to save.
    #[default]
    Idle,
    /// Unsaved changes exist.
    Dirty,
    /// A save request is in flight.
    Saving,
    /// The last save succeeded.
    Saved,
    /// The last save failed.
    Error,
}

/// Which tab the side panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelTab {
    #[default]
    Inspector,
    Logs,
}

/// Side panel layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub open: bool,
    pub width: f64,
    pub tab: PanelTab,
}

/// Bounds the reducer clamps panel widths into.
pub const PANEL_WIDTH_MIN: f64 = 240.0;
pub const PANEL_WIDTH_MAX: f64 = 960.0;

impl Default for PanelState {
    fn default() -> Self {
        Self {
            open: true,
            width: 320.0,
            tab: PanelTab::default(),
        }
    }
}

/// Current selection.
///
/// `ids` is the superset representation (multi-select); `node_id` /
/// `edge_id` are the single-selection views and are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Selected ids in selection order, without duplicates.
    pub ids: Vec<String>,
    /// The selected node, when exactly one node is selected.
    pub node_id: Option<NodeId>,
    /// The selected edge, when exactly one edge is selected.
    pub edge_id: Option<EdgeId>,
}

/// A structured validation failure surfaced by the save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationNotice {
    /// Human-readable message for the banner.
    pub message: String,
    /// The offending node, if the server named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
}

/// The editor state record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    /// Server id of the open workflow; absent until first save.
    pub workflow_id: Option<WorkflowId>,
    /// Workflow display name.
    pub workflow_name: String,
    /// Whether dirty state triggers an automatic save.
    pub autosave: bool,
    /// Save lifecycle.
    pub save_status: SaveStatus,
    /// Side panel layout.
    pub panel: PanelState,
    /// Current selection.
    pub selection: Selection,
    /// Known runs of this workflow, newest ordering as served.
    pub runs: Vec<RunSummary>,
    /// Logs of the run currently shown in the log pane.
    pub selected_run_logs: Vec<LogEntry>,
    /// Validation banner contents, if any.
    pub validation: Option<ValidationNotice>,
}

impl EditorState {
    /// Fresh state for a newly mounted editor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workflow_name: "Untitled Workflow".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_defaults() {
        let state = EditorState::new();
        assert_eq!(state.workflow_name, "Untitled Workflow");
        assert_eq!(state.save_status, SaveStatus::Idle);
        assert!(state.panel.open);
        assert!(state.selection.ids.is_empty());
        assert!(state.runs.is_empty());
    }
}
