//! Wire-format sanitation for persisted graphs.
//!
//! The persistence API stores a graph as `{nodes, edges}` JSON produced
//! by whatever client last saved it. Loading sanitizes every entry:
//! ids become strings, configs become objects (anything else collapses
//! to `{}`), positions default to the origin, and edges referencing
//! absent nodes are dropped. Downstream equality checks assume string
//! ids and object configs, so nothing un-sanitized may reach the store.
//!
//! Saving emits the same shape. Runtime overlays are never written.

use crate::edge::Edge;
use crate::node::{ConfigMap, Node, NodeKind, Position};
use crate::store::GraphStore;
use copper_canvas_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// The persisted graph payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireGraph {
    #[serde(default)]
    pub nodes: Vec<JsonValue>,
    #[serde(default)]
    pub edges: Vec<JsonValue>,
    /// Selection carried across reloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<NodeId>,
}

/// Lenient node entry. Only the id is required; everything else has a
/// sanitized default.
#[derive(Debug, Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    position: Option<JsonValue>,
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    label: Option<String>,
}

/// Lenient edge entry. Endpoints are required; a missing id gets a
/// fresh one.
#[derive(Debug, Deserialize)]
struct RawEdge {
    #[serde(default)]
    id: Option<EdgeId>,
    source: NodeId,
    target: NodeId,
    #[serde(default, alias = "sourceHandle")]
    source_handle: Option<String>,
}

/// Coerces a JSON value to an object; anything else collapses to `{}`.
fn coerce_object(value: Option<&JsonValue>) -> ConfigMap {
    match value {
        Some(JsonValue::Object(map)) => map.clone(),
        _ => ConfigMap::new(),
    }
}

impl WireGraph {
    /// Sanitizes the payload into a graph store.
    ///
    /// Entries that cannot be made sense of (no id, no endpoints) are
    /// dropped with a debug log rather than failing the load.
    #[must_use]
    pub fn sanitize(&self) -> GraphStore {
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());

        for value in &self.nodes {
            let raw: RawNode = match serde_json::from_value(value.clone()) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::debug!(error = %err, "dropping unreadable node entry");
                    continue;
                }
            };
            if !seen.insert(raw.id.as_str().to_string()) {
                tracing::debug!(node_id = %raw.id, "dropping duplicate node id");
                continue;
            }

            let data = raw.data.as_ref().and_then(JsonValue::as_object);
            let label = data
                .and_then(|d| d.get("label"))
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .or(raw.label)
                .unwrap_or_else(|| "Node".to_string());
            let config = coerce_object(data.and_then(|d| d.get("config")));
            let validation_error = data
                .and_then(|d| d.get("validation_error"))
                .and_then(JsonValue::as_str)
                .map(str::to_string);
            let position = raw
                .position
                .and_then(|p| serde_json::from_value::<Position>(p).ok())
                .unwrap_or_default();

            let mut node = Node::with_id(
                raw.id,
                label,
                NodeKind::from_wire(raw.kind.as_deref()),
                config,
            )
            .at(position);
            node.validation_error = validation_error;
            nodes.push(node);
        }

        let present: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let mut edges = Vec::with_capacity(self.edges.len());
        for value in &self.edges {
            let raw: RawEdge = match serde_json::from_value(value.clone()) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::debug!(error = %err, "dropping unreadable edge entry");
                    continue;
                }
            };
            if !present.contains(raw.source.as_str()) || !present.contains(raw.target.as_str()) {
                tracing::debug!(source = %raw.source, target = %raw.target, "dropping dangling edge");
                continue;
            }
            edges.push(Edge {
                id: raw.id.unwrap_or_else(EdgeId::generate),
                source: raw.source,
                target: raw.target,
                source_handle: raw.source_handle,
                selected: false,
            });
        }

        GraphStore::from_parts(nodes, edges)
    }

    /// Builds the persisted payload from a store.
    #[must_use]
    pub fn from_store(store: &GraphStore, selected_node_id: Option<NodeId>) -> Self {
        let nodes = store
            .nodes()
            .iter()
            .map(|node| {
                let mut data = Map::new();
                data.insert("label".into(), node.label.clone().into());
                data.insert("config".into(), JsonValue::Object(node.config.clone()));
                if let Some(message) = &node.validation_error {
                    data.insert("validation_error".into(), message.clone().into());
                }
                serde_json::json!({
                    "id": node.id,
                    "type": node.kind.as_wire(),
                    "position": node.position,
                    "data": data,
                })
            })
            .collect();

        let edges = store
            .edges()
            .iter()
            .map(|edge| {
                let mut entry = Map::new();
                entry.insert("id".into(), edge.id.as_str().into());
                entry.insert("source".into(), edge.source.as_str().into());
                entry.insert("target".into(), edge.target.as_str().into());
                if let Some(handle) = &edge.source_handle {
                    entry.insert("sourceHandle".into(), handle.clone().into());
                }
                JsonValue::Object(entry)
            })
            .collect();

        Self {
            nodes,
            edges,
            selected_node_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_id_and_scalar_data_are_sanitized() {
        let wire: WireGraph = serde_json::from_value(json!({
            "nodes": [{ "id": 1, "data": "not-an-object" }],
            "edges": [],
        }))
        .expect("deserialize");

        let store = wire.sanitize();
        let node = &store.nodes()[0];
        assert_eq!(node.id.as_str(), "1");
        assert!(node.config.is_empty());
        assert_eq!(node.position, Position::default());
    }

    #[test]
    fn dangling_edges_are_dropped() {
        let wire: WireGraph = serde_json::from_value(json!({
            "nodes": [
                { "id": "a", "data": { "label": "A", "config": {} } },
                { "id": "b", "data": { "label": "B", "config": {} } },
            ],
            "edges": [
                { "id": "e1", "source": "a", "target": "b" },
                { "id": "e2", "source": "a", "target": "ghost" },
            ],
        }))
        .expect("deserialize");

        let store = wire.sanitize();
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.edges()[0].id.as_str(), "e1");
    }

    #[test]
    fn duplicate_node_ids_keep_first() {
        let wire: WireGraph = serde_json::from_value(json!({
            "nodes": [
                { "id": "a", "data": { "label": "first", "config": {} } },
                { "id": "a", "data": { "label": "second", "config": {} } },
            ],
        }))
        .expect("deserialize");

        let store = wire.sanitize();
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.nodes()[0].label, "first");
    }

    #[test]
    fn unreadable_entries_do_not_fail_the_load() {
        let wire: WireGraph = serde_json::from_value(json!({
            "nodes": [
                { "no_id": true },
                { "id": "a", "type": "input", "position": { "x": 3.0, "y": 4.0 },
                  "data": { "label": "A", "config": { "k": "v" } } },
            ],
            "edges": [ { "source": "a" } ],
        }))
        .expect("deserialize");

        let store = wire.sanitize();
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.edge_count(), 0);
        let node = &store.nodes()[0];
        assert_eq!(node.kind, NodeKind::Input);
        assert_eq!(node.position, Position::new(3.0, 4.0));
        assert_eq!(node.config["k"], "v");
    }

    #[test]
    fn source_handle_accepts_both_spellings() {
        let wire: WireGraph = serde_json::from_value(json!({
            "nodes": [
                { "id": "a", "data": {} },
                { "id": "b", "data": {} },
            ],
            "edges": [
                { "id": "e1", "source": "a", "target": "b", "sourceHandle": "true" },
            ],
        }))
        .expect("deserialize");

        let store = wire.sanitize();
        assert_eq!(store.edges()[0].source_handle.as_deref(), Some("true"));
    }

    #[test]
    fn save_shape_omits_runtime_and_carries_selection() {
        let mut store = GraphStore::new();
        let id = store.add_node("HTTP Request", NodeKind::Default, ConfigMap::new());
        store.set_runtime(&id, crate::node::RuntimeStatus::default());

        let wire = WireGraph::from_store(&store, Some(id.clone()));
        let node = wire.nodes[0].as_object().expect("object");
        assert!(node.contains_key("data"));
        assert!(!node["data"].as_object().unwrap().contains_key("runtime"));
        assert_eq!(wire.selected_node_id, Some(id));

        // Round-trips through sanitize.
        let reloaded = wire.sanitize();
        assert_eq!(reloaded.node_count(), 1);
        assert_eq!(reloaded.nodes()[0].label, "HTTP Request");
    }
}
