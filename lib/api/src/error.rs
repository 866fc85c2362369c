//! Error types for the workflow API client.

use copper_canvas_core::NodeId;
use std::fmt;

/// Errors from API operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed (network, timeout).
    Request { message: String },
    /// The server answered with a non-success status and no structured
    /// validation body.
    Status { status: u16, message: String },
    /// The save endpoint rejected the workflow with a structured
    /// validation failure, optionally naming the offending node.
    Validation {
        message: String,
        node_id: Option<NodeId>,
    },
    /// The response body could not be decoded.
    Decode { message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { message } => write!(f, "request failed: {message}"),
            Self::Status { status, message } => {
                write!(f, "server answered {status}: {message}")
            }
            Self::Validation { message, node_id } => match node_id {
                Some(node_id) => write!(f, "validation failed on node {node_id}: {message}"),
                None => write!(f, "validation failed: {message}"),
            },
            Self::Decode { message } => write!(f, "failed to decode response: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = ApiError::Validation {
            message: "LLM node missing prompt".to_string(),
            node_id: Some(NodeId::from("n1")),
        };
        let text = err.to_string();
        assert!(text.contains("n1"));
        assert!(text.contains("missing prompt"));
    }
}
