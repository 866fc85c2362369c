//! Error types for graph operations.

use copper_canvas_core::NodeId;
use std::fmt;

/// Errors from structural graph operations.
///
/// Most store operations no-op silently on absent ids (canvas gestures
/// can race deletions); connecting is the exception, since an edge with a
/// dangling endpoint would violate the graph invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An endpoint references a node absent from the graph.
    NodeNotFound { node_id: NodeId },
    /// Source and target are the same node.
    SelfLoop { node_id: NodeId },
    /// An identical connection already exists.
    DuplicateEdge { source: NodeId, target: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => {
                write!(f, "node not found: {node_id}")
            }
            Self::SelfLoop { node_id } => {
                write!(f, "cannot connect node {node_id} to itself")
            }
            Self::DuplicateEdge { source, target } => {
                write!(f, "edge already exists: {source} -> {target}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::NodeNotFound {
            node_id: NodeId::from("n1"),
        };
        assert!(err.to_string().contains("node not found"));
    }
}
