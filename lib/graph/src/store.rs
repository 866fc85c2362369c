//! The canonical node/edge store.
//!
//! Every other component mutates the graph only through these
//! operations. The store is single-writer: callers route mutations
//! through one owner (the editor session), so there are no interior
//! locks here.

use crate::change::{EdgeChange, NodeChange};
use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::{ConfigMap, Node, NodeKind, RuntimeStatus};
use copper_canvas_core::{EdgeId, NodeId};
use std::collections::HashSet;

/// A `{id, label}` pair for wiring pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOption {
    pub id: NodeId,
    pub label: String,
}

/// The canvas graph: nodes and edges keyed by stable string ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphStore {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-sanitized parts (the wire loader).
    #[must_use]
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// All nodes, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    /// Returns true if a node with the given id exists.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Generates a node id absent from the current graph.
    ///
    /// ULIDs collide with negligible probability, but loaded graphs can
    /// carry arbitrary server-minted ids, so the check is against the
    /// live id set and re-rolls until free.
    fn fresh_node_id(&self) -> NodeId {
        loop {
            let id = NodeId::generate();
            if !self.contains_node(&id) {
                return id;
            }
        }
    }

    /// Adds a node and returns its id.
    ///
    /// Selection follows separately: the session defers the
    /// select-new-node action until after the structural commit.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        kind: NodeKind,
        config: ConfigMap,
    ) -> NodeId {
        let id = self.fresh_node_id();
        let node = Node::with_id(id.clone(), label, kind, config);
        tracing::debug!(node_id = %id, label = %node.label, "node added");
        self.nodes.push(node);
        id
    }

    /// Shallow-merges `delta` into the node's config.
    ///
    /// Returns false (and does nothing) if the node does not exist.
    pub fn update_node_config(&mut self, id: &NodeId, delta: ConfigMap) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        for (key, value) in delta {
            node.config.insert(key, value);
        }
        true
    }

    /// Merges the result of `updater(current_config)` into the node's
    /// config. The updater sees the current config and returns a delta.
    pub fn update_node_config_with(
        &mut self,
        id: &NodeId,
        updater: impl FnOnce(&ConfigMap) -> ConfigMap,
    ) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let delta = updater(&node.config);
        for (key, value) in delta {
            node.config.insert(key, value);
        }
        true
    }

    /// Replaces the node's config wholesale (the raw-JSON editing path).
    pub fn replace_node_config(&mut self, id: &NodeId, config: ConfigMap) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.config = config;
                true
            }
            None => false,
        }
    }

    /// Renames a node, re-resolving its template tag.
    pub fn set_node_label(&mut self, id: &NodeId, label: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Applies a batch of canvas node deltas positionally.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        for change in changes {
            match change {
                NodeChange::Moved { id, position } => {
                    if let Some(node) = self.node_mut(id) {
                        node.position = *position;
                    }
                }
                NodeChange::Selected { id, selected } => {
                    if let Some(node) = self.node_mut(id) {
                        node.selected = *selected;
                    }
                }
                NodeChange::Removed { id } => {
                    self.nodes.retain(|n| &n.id != id);
                    self.edges.retain(|e| &e.source != id && &e.target != id);
                }
            }
        }
    }

    /// Applies a batch of canvas edge deltas positionally.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        for change in changes {
            match change {
                EdgeChange::Selected { id, selected } => {
                    if let Some(edge) = self.edges.iter_mut().find(|e| &e.id == id) {
                        edge.selected = *selected;
                    }
                }
                EdgeChange::Removed { id } => {
                    self.edges.retain(|e| &e.id != id);
                }
            }
        }
    }

    /// Connects two nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is absent, the endpoints are
    /// the same node, or an identical connection already exists. The
    /// latter two are benign from canvas gestures and safe to ignore.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        source_handle: Option<String>,
    ) -> Result<EdgeId, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop {
                node_id: source.clone(),
            });
        }
        if !self.contains_node(source) {
            return Err(GraphError::NodeNotFound {
                node_id: source.clone(),
            });
        }
        if !self.contains_node(target) {
            return Err(GraphError::NodeNotFound {
                node_id: target.clone(),
            });
        }
        if self.edges.iter().any(|e| {
            &e.source == source && &e.target == target && e.source_handle == source_handle
        }) {
            return Err(GraphError::DuplicateEdge {
                source: source.clone(),
                target: target.clone(),
            });
        }

        let edge = Edge::new(source.clone(), target.clone(), source_handle);
        let id = edge.id.clone();
        self.edges.push(edge);
        Ok(id)
    }

    /// Removes everything named by `ids` in one pass.
    ///
    /// An id may name a node or an edge: nodes in the set are removed,
    /// and an edge goes when its own id, its source, or its target is in
    /// the set, so deleting a node takes its edges with it atomically.
    ///
    /// Returns the number of removed nodes and edges.
    pub fn delete_selected(&mut self, ids: &HashSet<String>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.nodes.len() + self.edges.len();
        self.nodes.retain(|n| !ids.contains(n.id.as_str()));
        self.edges.retain(|e| {
            !ids.contains(e.id.as_str())
                && !ids.contains(e.source.as_str())
                && !ids.contains(e.target.as_str())
        });
        let removed = before - (self.nodes.len() + self.edges.len());
        if removed > 0 {
            tracing::debug!(removed, "deleted selection from graph");
        }
        removed
    }

    /// Lazily yields `{id, label}` for every node except `exclude`.
    ///
    /// Backs wiring pickers (branch targets); restartable by calling
    /// again.
    pub fn node_options<'a>(
        &'a self,
        exclude: Option<&'a NodeId>,
    ) -> impl Iterator<Item = NodeOption> + 'a {
        self.nodes
            .iter()
            .filter(move |n| exclude != Some(&n.id))
            .map(|n| NodeOption {
                id: n.id.clone(),
                label: n.label.clone(),
            })
    }

    /// Overlays runtime status on a node. No-ops on absent ids: the
    /// executor may report nodes deleted since the run started.
    pub fn set_runtime(&mut self, id: &NodeId, status: RuntimeStatus) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.runtime = Some(status);
                true
            }
            None => false,
        }
    }

    /// Clears all runtime overlays (a new run is starting).
    pub fn clear_runtime(&mut self) {
        for node in &mut self.nodes {
            node.runtime = None;
        }
    }

    /// Sets or clears a node's validation marker.
    pub fn set_validation_error(&mut self, id: &NodeId, message: Option<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.validation_error = message;
                true
            }
            None => false,
        }
    }

    /// Clears validation markers on every node.
    pub fn clear_validation_errors(&mut self) {
        for node in &mut self.nodes {
            node.validation_error = None;
        }
    }
}
