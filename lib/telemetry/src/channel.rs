//! The telemetry channel hub.
//!
//! At most one channel is active per editor session. Opening a new one
//! supersedes the old one synchronously: the previous stream is
//! dropped before the new transport is even contacted, so no event from
//! a superseded stream can ever be processed (this also answers what
//! happens to an event redelivered after close: it dies with its
//! stream). Closing is unconditional and idempotent.

use crate::error::TelemetryError;
use crate::event::TelemetryEvent;
use crate::transport::{EventStream, StreamTransport};
use copper_canvas_core::RunId;
use futures::StreamExt;

/// Lifecycle of the hub's channel slot.
///
/// `Opening` is the transient inside [`TelemetryHub::open`] between
/// superseding the old stream and the new transport resolving; an error
/// there collapses straight back to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Open,
}

/// What the consumer loop sees from the active channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A decoded telemetry event, in delivery order.
    Event(TelemetryEvent),
    /// The stream failed; the channel is already closed.
    TransportError(TelemetryError),
    /// The server ended the stream; the channel is already closed.
    Ended,
}

struct ActiveChannel {
    run_id: RunId,
    stream: EventStream,
}

/// Owner of the single channel slot.
#[derive(Default)]
pub struct TelemetryHub {
    active: Option<ActiveChannel>,
}

impl TelemetryHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current slot state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        if self.active.is_some() {
            ChannelState::Open
        } else {
            ChannelState::Closed
        }
    }

    /// True while a channel is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// The run the active channel watches.
    #[must_use]
    pub fn run_id(&self) -> Option<&RunId> {
        self.active.as_ref().map(|c| &c.run_id)
    }

    /// Opens a channel for `run_id`, superseding any active one first.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot open the stream; the
    /// hub is left closed in that case.
    pub async fn open(
        &mut self,
        transport: &dyn StreamTransport,
        run_id: RunId,
    ) -> Result<(), TelemetryError> {
        self.close();
        tracing::info!(run_id = %run_id, "opening telemetry channel");
        let stream = transport.open(&run_id).await?;
        self.active = Some(ActiveChannel { run_id, stream });
        Ok(())
    }

    /// Closes the active channel. Safe to call when already closed.
    pub fn close(&mut self) {
        if let Some(channel) = self.active.take() {
            tracing::info!(run_id = %channel.run_id, "telemetry channel closed");
        }
    }

    /// Pulls the next event from the active stream.
    ///
    /// Returns `None` immediately when no channel is open. Frames with
    /// unknown event names are skipped. A transport error or stream end
    /// closes the channel before the call returns.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let channel = self.active.as_mut()?;
            match channel.stream.next().await {
                Some(Ok(frame)) => {
                    if let Some(event) = TelemetryEvent::decode(&frame) {
                        return Some(ChannelEvent::Event(event));
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "telemetry transport failed");
                    self.close();
                    return Some(ChannelEvent::TransportError(err));
                }
                None => {
                    self.close();
                    return Some(ChannelEvent::Ended);
                }
            }
        }
    }
}
