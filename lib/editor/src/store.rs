//! The reducer state machine behind the editor store.
//!
//! Transitions never panic: malformed server payloads are coerced to
//! empty collections at this boundary, and a transition that would not
//! change anything reports `false` so subscribers can skip re-rendering
//! (the no-churn contract duplicate log appends rely on).

use crate::action::EditorAction;
use crate::logs::{self, LogEntry};
use crate::run;
use crate::state::{
    EditorState, SaveStatus, Selection, PANEL_WIDTH_MAX, PANEL_WIDTH_MIN,
};
use copper_canvas_core::{EdgeId, NodeId};

/// The editor state container.
///
/// Single source of truth for editor-wide UI state; all views read the
/// snapshot and dispatch actions through the one entry point, which
/// serializes every mutation.
#[derive(Debug, Clone, Default)]
pub struct EditorStore {
    state: EditorState,
    version: u64,
}

impl EditorStore {
    /// Creates a store with fresh editor state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: EditorState::new(),
            version: 0,
        }
    }

    /// Read-only state snapshot.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Monotonic change counter; unchanged dispatches do not bump it.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Applies an action. Returns true if the state changed.
    pub fn dispatch(&mut self, action: EditorAction) -> bool {
        let changed = apply(&mut self.state, action);
        if changed {
            self.version += 1;
        }
        changed
    }
}

/// Replaces `slot` with `value`, reporting whether anything changed.
fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn select_node(selection: &mut Selection, id: Option<NodeId>) -> bool {
    let next = match id {
        Some(id) => Selection {
            ids: vec![id.as_str().to_string()],
            node_id: Some(id),
            edge_id: None,
        },
        None => Selection::default(),
    };
    set_if_changed(selection, next)
}

fn select_edge(selection: &mut Selection, id: Option<EdgeId>) -> bool {
    let next = match id {
        Some(id) => Selection {
            ids: vec![id.as_str().to_string()],
            node_id: None,
            edge_id: Some(id),
        },
        None => Selection::default(),
    };
    set_if_changed(selection, next)
}

/// The pure transition function. Total over the action union; no
/// transition throws.
pub fn apply(state: &mut EditorState, action: EditorAction) -> bool {
    match action {
        EditorAction::SetWorkflowName(name) => set_if_changed(&mut state.workflow_name, name),
        EditorAction::SetWorkflowId(id) => set_if_changed(&mut state.workflow_id, id),
        EditorAction::SetAutosave(on) => set_if_changed(&mut state.autosave, on),
        EditorAction::MarkDirty => set_if_changed(&mut state.save_status, SaveStatus::Dirty),
        EditorAction::MarkClean => set_if_changed(&mut state.save_status, SaveStatus::Saved),
        EditorAction::SetSaveStatus(status) => set_if_changed(&mut state.save_status, status),
        EditorAction::SetSelectedNodeId(id) => select_node(&mut state.selection, id),
        EditorAction::SetSelectedEdgeId(id) => select_edge(&mut state.selection, id),
        EditorAction::SetSelection(ids) => {
            let mut deduped: Vec<String> = Vec::with_capacity(ids.len());
            for id in ids {
                if !deduped.contains(&id) {
                    deduped.push(id);
                }
            }
            let next = selection_from_ids(deduped);
            set_if_changed(&mut state.selection, next)
        }
        EditorAction::ToggleSelection(id) => {
            let mut ids = state.selection.ids.clone();
            match ids.iter().position(|existing| existing == &id) {
                Some(index) => {
                    ids.remove(index);
                }
                None => ids.push(id),
            }
            let next = selection_from_ids(ids);
            set_if_changed(&mut state.selection, next)
        }
        EditorAction::ClearSelection => set_if_changed(&mut state.selection, Selection::default()),
        EditorAction::SetPanelOpen(open) => set_if_changed(&mut state.panel.open, open),
        EditorAction::SetPanelWidth(width) => {
            let clamped = width.clamp(PANEL_WIDTH_MIN, PANEL_WIDTH_MAX);
            set_if_changed(&mut state.panel.width, clamped)
        }
        EditorAction::SetPanelTab(tab) => set_if_changed(&mut state.panel.tab, tab),
        EditorAction::SetRuns(payload) => {
            let runs = run::decode_run_list(&payload);
            set_if_changed(&mut state.runs, runs)
        }
        EditorAction::SetSelectedRunLogs(payload) => {
            let entries = logs::normalize(logs::decode_log_list(&payload));
            set_if_changed(&mut state.selected_run_logs, entries)
        }
        EditorAction::AppendSelectedRunLog(entry) => {
            match logs::append(&state.selected_run_logs, entry) {
                Some(merged) => {
                    state.selected_run_logs = merged;
                    true
                }
                None => false,
            }
        }
        EditorAction::SetValidationNotice(notice) => set_if_changed(&mut state.validation, notice),
        EditorAction::Reset => set_if_changed(state, EditorState::new()),
    }
}

/// Builds the single-selection views from a multi-select set.
///
/// `node_id` is recomputed only when exactly one id remains; this store
/// cannot tell nodes from edges by id alone, so the single survivor is
/// treated as a node (edge single-selection goes through
/// `SetSelectedEdgeId`).
fn selection_from_ids(ids: Vec<String>) -> Selection {
    let node_id = match ids.as_slice() {
        [only] => Some(NodeId::from(only.as_str())),
        _ => None,
    };
    Selection {
        ids,
        node_id,
        edge_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PanelTab;
    use serde_json::json;

    fn dispatch_all(store: &mut EditorStore, actions: Vec<EditorAction>) {
        for action in actions {
            store.dispatch(action);
        }
    }

    #[test]
    fn selecting_a_node_clears_edge_selection() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetSelectedEdgeId(Some(EdgeId::from("e1"))));
        assert!(store.state().selection.edge_id.is_some());

        store.dispatch(EditorAction::SetSelectedNodeId(Some(NodeId::from("n1"))));
        let selection = &store.state().selection;
        assert_eq!(selection.node_id, Some(NodeId::from("n1")));
        assert!(selection.edge_id.is_none());
        assert_eq!(selection.ids, vec!["n1"]);
    }

    #[test]
    fn selecting_an_edge_clears_node_selection() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetSelectedNodeId(Some(NodeId::from("n1"))));
        store.dispatch(EditorAction::SetSelectedEdgeId(Some(EdgeId::from("e1"))));

        let selection = &store.state().selection;
        assert_eq!(selection.edge_id, Some(EdgeId::from("e1")));
        assert!(selection.node_id.is_none());
    }

    #[test]
    fn toggle_recomputes_single_selection() {
        let mut store = EditorStore::new();
        dispatch_all(
            &mut store,
            vec![
                EditorAction::ToggleSelection("a".into()),
                EditorAction::ToggleSelection("b".into()),
            ],
        );
        assert_eq!(store.state().selection.ids, vec!["a", "b"]);
        assert!(store.state().selection.node_id.is_none());

        store.dispatch(EditorAction::ToggleSelection("a".into()));
        let selection = &store.state().selection;
        assert_eq!(selection.ids, vec!["b"]);
        assert_eq!(selection.node_id, Some(NodeId::from("b")));
    }

    #[test]
    fn single_selection_invariant_holds() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetSelection(vec!["x".into()]));
        let selection = &store.state().selection;
        assert_eq!(selection.ids.len(), 1);
        assert_eq!(selection.node_id.as_ref().map(NodeId::as_str), Some("x"));
    }

    #[test]
    fn set_selection_dedupes_preserving_order() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetSelection(vec![
            "a".into(),
            "b".into(),
            "a".into(),
        ]));
        assert_eq!(store.state().selection.ids, vec!["a", "b"]);
    }

    #[test]
    fn mark_dirty_and_clean_drive_save_status() {
        let mut store = EditorStore::new();
        assert_eq!(store.state().save_status, SaveStatus::Idle);
        store.dispatch(EditorAction::MarkDirty);
        assert_eq!(store.state().save_status, SaveStatus::Dirty);
        store.dispatch(EditorAction::MarkClean);
        assert_eq!(store.state().save_status, SaveStatus::Saved);
    }

    #[test]
    fn panel_width_is_clamped() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetPanelWidth(10.0));
        assert_eq!(store.state().panel.width, PANEL_WIDTH_MIN);
        store.dispatch(EditorAction::SetPanelWidth(5000.0));
        assert_eq!(store.state().panel.width, PANEL_WIDTH_MAX);
    }

    #[test]
    fn malformed_runs_payload_coerces_to_empty() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetRuns(json!([{ "id": 1 }])));
        assert_eq!(store.state().runs.len(), 1);

        store.dispatch(EditorAction::SetRuns(json!("not a list")));
        assert!(store.state().runs.is_empty());
    }

    #[test]
    fn set_runs_replaces_wholesale() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetRuns(json!([{ "id": 1 }, { "id": 2 }])));
        store.dispatch(EditorAction::SetRuns(json!([{ "id": 3 }])));
        assert_eq!(store.state().runs.len(), 1);
        assert_eq!(store.state().runs[0].id.as_str(), "3");
    }

    #[test]
    fn set_selected_run_logs_normalizes() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetSelectedRunLogs(json!([
            { "id": "l1", "message": "a" },
            { "id": "l1", "message": "a (redelivered)" },
            { "id": "l2", "message": "b" },
        ])));
        assert_eq!(store.state().selected_run_logs.len(), 2);
    }

    #[test]
    fn duplicate_append_reports_no_change() {
        let mut store = EditorStore::new();
        let entry = LogEntry {
            id: Some(json!("l1")),
            ..LogEntry::message("hello")
        };
        assert!(store.dispatch(EditorAction::AppendSelectedRunLog(entry.clone())));
        let version = store.version();

        assert!(!store.dispatch(EditorAction::AppendSelectedRunLog(entry)));
        assert_eq!(store.version(), version, "duplicate must not bump the version");
        assert_eq!(store.state().selected_run_logs.len(), 1);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut store = EditorStore::new();
        dispatch_all(
            &mut store,
            vec![
                EditorAction::SetWorkflowName("My Flow".into()),
                EditorAction::MarkDirty,
                EditorAction::SetPanelTab(PanelTab::Logs),
                EditorAction::Reset,
            ],
        );
        assert_eq!(store.state(), &EditorState::new());
    }

    #[test]
    fn redundant_set_is_elided() {
        let mut store = EditorStore::new();
        store.dispatch(EditorAction::SetAutosave(true));
        let version = store.version();
        assert!(!store.dispatch(EditorAction::SetAutosave(true)));
        assert_eq!(store.version(), version);
    }
}
