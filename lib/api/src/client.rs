//! The API contract and its reqwest implementation.
//!
//! The trait is the session's only view of the backend; tests swap in
//! an in-memory implementation. List-shaped responses are returned as
//! raw JSON on purpose: the editor store coerces malformed payloads at
//! its own boundary, which keeps the leniency contract in one place.

use crate::error::ApiError;
use crate::types::{RunStarted, SavedWorkflow, ValidationBody, WorkflowDocument};
use async_trait::async_trait;
use copper_canvas_core::{ApiConfig, RunId, WorkflowId};
use serde_json::Value as JsonValue;

/// The external collaborators the editor core talks to.
#[async_trait]
pub trait EditorApi: Send + Sync {
    /// Loads a workflow document.
    async fn load_workflow(&self, id: &WorkflowId) -> Result<WorkflowDocument, ApiError>;

    /// Saves a workflow document, returning the (possibly newly
    /// assigned) workflow id.
    async fn save_workflow(&self, document: &WorkflowDocument) -> Result<WorkflowId, ApiError>;

    /// Starts a run of a saved workflow.
    async fn start_run(&self, workflow_id: &WorkflowId) -> Result<RunId, ApiError>;

    /// Lists runs for a workflow. Raw payload: `{items, total}` or a
    /// bare array.
    async fn list_runs(&self, workflow_id: &WorkflowId) -> Result<JsonValue, ApiError>;

    /// Fetches already-persisted logs for a run. Raw payload:
    /// `{logs: [...]}` or a bare array.
    async fn run_logs(&self, run_id: &RunId) -> Result<JsonValue, ApiError>;

    /// Fetches the form schema for a node label.
    async fn node_schema(&self, label: &str) -> Result<JsonValue, ApiError>;
}

/// reqwest-backed implementation.
#[derive(Debug, Clone)]
pub struct HttpEditorApi {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpEditorApi {
    /// Creates a client for the configured API.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, path: &str) -> Result<JsonValue, ApiError> {
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "API request failed");
            return Err(status_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })
    }
}

fn request_error(err: reqwest::Error) -> ApiError {
    ApiError::Request {
        message: err.to_string(),
    }
}

fn status_error(status: u16, body: &str) -> ApiError {
    ApiError::Status {
        status,
        message: body.chars().take(200).collect(),
    }
}

/// Classifies a failed save: a decodable `{message, node_id}` body is a
/// structured validation failure, anything else a plain status error.
fn save_failure(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ValidationBody>(body) {
        Ok(validation) => ApiError::Validation {
            message: validation.message,
            node_id: validation.node_id,
        },
        Err(_) => status_error(status, body),
    }
}

/// Percent-encodes the characters that can appear in node labels.
fn encode_label(label: &str) -> String {
    label.replace('%', "%25").replace(' ', "%20").replace('/', "%2F")
}

#[async_trait]
impl EditorApi for HttpEditorApi {
    async fn load_workflow(&self, id: &WorkflowId) -> Result<WorkflowDocument, ApiError> {
        let payload = self.get_json(&format!("/workflows/{id}")).await?;
        serde_json::from_value(payload).map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })
    }

    async fn save_workflow(&self, document: &WorkflowDocument) -> Result<WorkflowId, ApiError> {
        let response = self
            .authorize(self.client.post(self.url("/workflows")))
            .json(document)
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "workflow save rejected");
            return Err(save_failure(status.as_u16(), &body));
        }

        let saved: SavedWorkflow = serde_json::from_str(&body).map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })?;
        tracing::info!(workflow_id = %saved.id, "workflow saved");
        Ok(saved.id)
    }

    async fn start_run(&self, workflow_id: &WorkflowId) -> Result<RunId, ApiError> {
        let response = self
            .authorize(self.client.post(self.url(&format!("/workflows/{workflow_id}/run"))))
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;
        if !status.is_success() {
            tracing::warn!(workflow_id = %workflow_id, status = status.as_u16(), "run request rejected");
            return Err(status_error(status.as_u16(), &body));
        }

        let started: RunStarted = serde_json::from_str(&body).map_err(|err| ApiError::Decode {
            message: err.to_string(),
        })?;
        tracing::info!(workflow_id = %workflow_id, run_id = %started.run_id, "run started");
        Ok(started.run_id)
    }

    async fn list_runs(&self, workflow_id: &WorkflowId) -> Result<JsonValue, ApiError> {
        self.get_json(&format!("/runs?workflow_id={workflow_id}"))
            .await
    }

    async fn run_logs(&self, run_id: &RunId) -> Result<JsonValue, ApiError> {
        self.get_json(&format!("/runs/{run_id}/logs")).await
    }

    async fn node_schema(&self, label: &str) -> Result<JsonValue, ApiError> {
        self.get_json(&format!("/node_schema/{}", encode_label(label)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_failure_decodes_validation_body() {
        let err = save_failure(422, "{\"message\":\"LLM node missing prompt\",\"node_id\":\"n7\"}");
        match err {
            ApiError::Validation { message, node_id } => {
                assert_eq!(message, "LLM node missing prompt");
                assert_eq!(node_id.as_ref().map(|n| n.as_str()), Some("n7"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn save_failure_falls_back_to_status() {
        let err = save_failure(500, "internal error");
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let api = HttpEditorApi::new(&ApiConfig {
            base_url: "http://api.test/".to_string(),
            access_token: None,
        });
        assert_eq!(api.url("/workflows"), "http://api.test/workflows");
    }

    #[test]
    fn labels_are_encoded_for_the_schema_path() {
        assert_eq!(encode_label("Send Email"), "Send%20Email");
        assert_eq!(encode_label("a/b%c"), "a%2Fb%25c");
    }
}
