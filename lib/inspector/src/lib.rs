//! Node inspector sync engine for copper-canvas.
//!
//! This crate binds the selected node's config to an editable form:
//!
//! - **Descriptors**: a closed template -> form registry (dedicated
//!   layouts, friendly components, auto-wire branches, raw-JSON
//!   fallback)
//! - **Debounce**: an explicit, cancellable quiescence timer scoped to
//!   the selection lifetime
//! - **Engine**: form state, commit deltas, raw-JSON and schema-driven
//!   paths

pub mod debounce;
pub mod descriptor;
pub mod engine;

pub use debounce::Debouncer;
pub use descriptor::{FieldKind, FieldSpec, FormDescriptor, descriptor_for};
pub use engine::{BranchSlot, ConfigCommit, InspectorEngine};
