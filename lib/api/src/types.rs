//! Request/response types for the workflow API.

use copper_canvas_core::{NodeId, RunId, WorkflowId};
use serde::{Deserialize, Serialize};

/// A workflow as exchanged with the persistence endpoint.
///
/// The graph payload travels in the sanitized wire shape; selection is
/// carried inside it so it survives reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// Server id; absent until the first save assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkflowId>,
    pub name: String,
    #[serde(default)]
    pub graph: copper_canvas_graph::WireGraph,
}

/// Successful save response.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedWorkflow {
    pub id: WorkflowId,
}

/// Structured validation failure body from the save endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationBody {
    pub message: String,
    #[serde(default)]
    pub node_id: Option<NodeId>,
}

/// Run creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct RunStarted {
    pub run_id: RunId,
}
