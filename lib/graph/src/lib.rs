//! Node/edge graph store for the copper-canvas editor.
//!
//! This crate owns the canonical automation graph:
//!
//! - **Node/Edge Model**: string-id nodes with template tags, free-form
//!   config objects, and telemetry overlays
//! - **Store Operations**: add, connect, config merge, canvas change
//!   batches, atomic selection deletion
//! - **Wire Sanitation**: lenient loading of persisted payloads and the
//!   save-side shape

pub mod change;
pub mod edge;
pub mod error;
pub mod node;
pub mod store;
pub mod template;
pub mod wire;

pub use change::{EdgeChange, NodeChange};
pub use edge::Edge;
pub use error::GraphError;
pub use node::{ConfigMap, Node, NodeKind, Position, RunPhase, RuntimeStatus};
pub use store::{GraphStore, NodeOption};
pub use template::NodeTemplate;
pub use wire::WireGraph;
