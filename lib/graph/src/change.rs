//! Structural change batches from canvas interaction.
//!
//! The canvas reports drag, select and remove gestures as batches of
//! deltas. These are applied positionally, without business validation:
//! the inspector and the save endpoint own semantic validation.

use crate::node::Position;
use copper_canvas_core::{EdgeId, NodeId};

/// A single node delta produced by canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// The node was dragged to a new position.
    Moved { id: NodeId, position: Position },
    /// The node's canvas selection flag changed.
    Selected { id: NodeId, selected: bool },
    /// The node was removed on the canvas.
    Removed { id: NodeId },
}

/// A single edge delta produced by canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    /// The edge's canvas selection flag changed.
    Selected { id: EdgeId, selected: bool },
    /// The edge was removed on the canvas.
    Removed { id: EdgeId },
}
