//! Reducer-driven editor state store for copper-canvas.
//!
//! This crate provides:
//!
//! - **Editor State**: save status, panel layout, selection, run list
//!   and streamed logs; everything editor-wide except the graph
//! - **Action Union**: the closed set of transitions, applied by a pure
//!   reducer that never throws and elides no-op updates
//! - **Log Dedup**: identity-keyed normalize/append so redelivered
//!   telemetry never duplicates the log pane

pub mod action;
pub mod logs;
pub mod run;
pub mod state;
pub mod store;

pub use action::EditorAction;
pub use logs::LogEntry;
pub use run::RunSummary;
pub use state::{
    EditorState, PanelState, PanelTab, SaveStatus, Selection, ValidationNotice,
};
pub use store::EditorStore;
