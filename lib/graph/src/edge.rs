//! Edge types for the canvas graph.

use copper_canvas_core::{EdgeId, NodeId};

/// A directed connection between two nodes.
///
/// Both endpoints must reference nodes present in the graph; edges whose
/// endpoint is deleted are pruned atomically with the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Unique identifier within the graph.
    pub id: EdgeId,
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Named output handle on the source node (e.g. a branch port).
    pub source_handle: Option<String>,
    /// Canvas selection flag.
    pub selected: bool,
}

impl Edge {
    /// Creates an edge with a freshly generated id.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, source_handle: Option<String>) -> Self {
        Self {
            id: EdgeId::generate(),
            source,
            target,
            source_handle,
            selected: false,
        }
    }
}
