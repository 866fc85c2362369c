//! Workflow API client for copper-canvas.
//!
//! The external-collaborator boundary: workflow persistence, run
//! control, run logs and node schemas, specified as an async trait with
//! a reqwest implementation. Responses are decoded strictly where the
//! contract is firm (save, run ids) and passed through raw where the
//! editor store owns the leniency (run and log lists).

pub mod client;
pub mod error;
pub mod types;

pub use client::{EditorApi, HttpEditorApi};
pub use error::ApiError;
pub use types::{RunStarted, SavedWorkflow, ValidationBody, WorkflowDocument};
