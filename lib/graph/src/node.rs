//! Node types for the canvas graph.
//!
//! A node is a step on the automation canvas. Each node has:
//! - A stable string id, unique within the graph for the node's lifetime
//! - A template tag resolved from its palette label
//! - A free-form config object, specific to its template
//! - An optional runtime overlay fed by the telemetry channel

use crate::template::NodeTemplate;
use copper_canvas_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A node's config object: always a JSON mapping, never a bare scalar.
pub type ConfigMap = Map<String, JsonValue>;

/// Canvas role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry node (no incoming edges on the canvas).
    Input,
    /// Regular node.
    #[default]
    Default,
}

impl NodeKind {
    /// Parses a wire `type` field; unknown values fall back to `Default`.
    #[must_use]
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("input") => Self::Input,
            _ => Self::Default,
        }
    }

    /// Returns the wire `type` string.
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Default => "default",
        }
    }
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Execution phase of a node within the currently observed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Success,
    Failed,
}

impl RunPhase {
    /// Returns true if this is a terminal phase.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Live run status overlaid on a node by the telemetry channel.
///
/// Never written to the persisted graph payload; cleared when a new run
/// starts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuntimeStatus {
    /// Current phase.
    #[serde(default)]
    pub status: RunPhase,
    /// Completion fraction in `[0, 1]`, when the executor reports one.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Node output, once available.
    #[serde(default)]
    pub result: Option<JsonValue>,
    /// Error payload, if the node failed.
    #[serde(default)]
    pub error: Option<JsonValue>,
    /// Human-readable progress message.
    #[serde(default)]
    pub message: Option<String>,
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier within the graph, stable for the node lifetime.
    pub id: NodeId,
    /// Canvas role.
    pub kind: NodeKind,
    /// Palette label (e.g. "HTTP Request").
    pub label: String,
    /// Template tag resolved from the label at creation/load time.
    pub template: NodeTemplate,
    /// Template-specific configuration.
    pub config: ConfigMap,
    /// Canvas position.
    pub position: Position,
    /// Telemetry overlay for the observed run.
    pub runtime: Option<RuntimeStatus>,
    /// Canvas selection flag.
    pub selected: bool,
    /// Validation message from the last failed save, if any.
    pub validation_error: Option<String>,
}

impl Node {
    /// Creates a node with a freshly generated id.
    ///
    /// Callers inserting into a graph should prefer
    /// [`GraphStore::add_node`](crate::store::GraphStore::add_node),
    /// which also guarantees id uniqueness.
    #[must_use]
    pub fn new(label: impl Into<String>, kind: NodeKind, config: ConfigMap) -> Self {
        Self::with_id(NodeId::generate(), label, kind, config)
    }

    /// Creates a node with a specific id.
    #[must_use]
    pub fn with_id(
        id: NodeId,
        label: impl Into<String>,
        kind: NodeKind,
        config: ConfigMap,
    ) -> Self {
        let label = label.into();
        let template = NodeTemplate::from_label(&label);
        Self {
            id,
            kind,
            label,
            template,
            config,
            position: Position::default(),
            runtime: None,
            selected: false,
            validation_error: None,
        }
    }

    /// Places the node at the given position.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Renames the node, re-resolving its template tag.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.template = NodeTemplate::from_label(&self.label);
    }
}
