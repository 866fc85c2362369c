//! Error types for the telemetry channel.

use std::fmt;

/// Errors from opening or reading a telemetry stream.
///
/// Transport errors close the channel; recovery is a user-driven
/// re-open, never an automatic retry at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The stream could not be opened.
    ConnectFailed { message: String },
    /// The server answered with a non-success status.
    BadStatus { status: u16 },
    /// The open stream failed mid-flight.
    Transport { message: String },
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed { message } => {
                write!(f, "failed to open telemetry stream: {message}")
            }
            Self::BadStatus { status } => {
                write!(f, "telemetry stream rejected with status {status}")
            }
            Self::Transport { message } => {
                write!(f, "telemetry stream failed: {message}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_error_display() {
        let err = TelemetryError::BadStatus { status: 401 };
        assert!(err.to_string().contains("401"));
    }
}
