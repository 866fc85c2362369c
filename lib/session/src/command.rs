//! The command union for loop-driven hosts.
//!
//! Mirrors the session's operation methods so a host can drive the
//! editor entirely through one channel, keeping every mutation on the
//! single consumer loop.

use copper_canvas_core::{EdgeId, NodeId, RunId, WorkflowId};
use copper_canvas_editor::EditorAction;
use copper_canvas_graph::{ConfigMap, EdgeChange, NodeChange, NodeKind};
use copper_canvas_inspector::BranchSlot;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// One editor operation, as sent by a host.
#[derive(Debug, Clone)]
pub enum EditorCommand {
    AddNode {
        label: String,
        kind: NodeKind,
        config: ConfigMap,
    },
    Connect {
        source: NodeId,
        target: NodeId,
        source_handle: Option<String>,
    },
    ApplyNodeChanges(Vec<NodeChange>),
    ApplyEdgeChanges(Vec<EdgeChange>),
    DeleteSelected {
        ids: HashSet<String>,
    },
    SelectNode(Option<NodeId>),
    SelectEdge(Option<EdgeId>),
    SetNodeLabel {
        id: NodeId,
        label: String,
    },
    EditField {
        key: String,
        value: JsonValue,
    },
    EditRawConfig {
        text: String,
    },
    SetBranchTarget {
        slot: BranchSlot,
        target: Option<NodeId>,
    },
    RequestNodeSchema,
    Save,
    RunWorkflow,
    ViewRunLogs(RunId),
    RefreshRuns,
    LoadWorkflow(WorkflowId),
    /// A plain editor-state transition (panel layout, autosave, name).
    Dispatch(EditorAction),
}
