//! Run telemetry channel for copper-canvas.
//!
//! This crate manages the live streaming connection that overlays
//! execution status onto the editor:
//!
//! - **SSE Framing**: incremental parsing of `text/event-stream` bytes
//! - **Event Decoding**: named frames into a `Log | Node | Status`
//!   union, degrading on malformed payloads instead of failing
//! - **Transports**: plain and token-carrying reqwest streams behind an
//!   async trait
//! - **Hub**: the at-most-one-active-channel slot with synchronous
//!   supersession and idempotent close

pub mod channel;
pub mod error;
pub mod event;
pub mod sse;
pub mod transport;

pub use channel::{ChannelEvent, ChannelState, TelemetryHub};
pub use error::TelemetryError;
pub use event::{NodeUpdate, StatusUpdate, TelemetryEvent};
pub use sse::{SseFrame, SseParser};
pub use transport::{EventStream, HttpStreamTransport, StreamTransport, TokenPolicy};
