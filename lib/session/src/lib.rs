//! Editor session composition root for copper-canvas.
//!
//! Wires the editor store, graph store, inspector engine and telemetry
//! hub into one constructor-injected session, and runs the single
//! consumer loop that serializes every mutation: user commands, the
//! telemetry stream and debounce deadlines are all inputs to one
//! `select!`.

pub mod command;
pub mod session;

pub use command::EditorCommand;
pub use session::EditorSession;
