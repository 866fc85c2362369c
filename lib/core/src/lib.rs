//! Core types for the copper-canvas workflow editor.
//!
//! This crate provides the foundational id types and session
//! configuration shared by the editor state crates.

pub mod config;
pub mod id;

pub use config::{ApiConfig, DebounceConfig, EditorConfig};
pub use id::{EdgeId, NodeId, RunId, WorkflowId};
