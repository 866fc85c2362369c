//! Stream transports.
//!
//! The channel consumes an abstract frame stream so tests can script
//! delivery; production uses reqwest against `GET /runs/{id}/stream`.
//! Token placement selects the transport variant: no token, a bearer
//! header, or an `access_token` query parameter for hosts whose
//! streaming client cannot set headers.

use crate::error::TelemetryError;
use crate::sse::{SseFrame, SseParser};
use async_trait::async_trait;
use copper_canvas_core::{ApiConfig, RunId};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;

/// A boxed stream of SSE frames.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<SseFrame, TelemetryError>> + Send>>;

/// Opens one frame stream per run.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Opens the event stream for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be established.
    async fn open(&self, run_id: &RunId) -> Result<EventStream, TelemetryError>;
}

/// Where the access token travels, when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TokenPolicy {
    /// Unauthenticated deployment.
    #[default]
    None,
    /// `Authorization: Bearer` header.
    BearerHeader(String),
    /// `access_token` query parameter.
    QueryParam(String),
}

/// SSE transport over reqwest.
#[derive(Debug, Clone)]
pub struct HttpStreamTransport {
    client: reqwest::Client,
    base_url: String,
    token: TokenPolicy,
}

impl HttpStreamTransport {
    /// Creates a transport against the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: TokenPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Selects the transport variant for a config: header-carrying when
    /// a token is present, plain otherwise.
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        let token = match &config.access_token {
            Some(token) => TokenPolicy::BearerHeader(token.clone()),
            None => TokenPolicy::None,
        };
        Self::new(config.base_url.clone(), token)
    }

    fn stream_url(&self, run_id: &RunId) -> String {
        format!("{}/runs/{run_id}/stream", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl StreamTransport for HttpStreamTransport {
    async fn open(&self, run_id: &RunId) -> Result<EventStream, TelemetryError> {
        let mut request = self
            .client
            .get(self.stream_url(run_id))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        match &self.token {
            TokenPolicy::None => {}
            TokenPolicy::BearerHeader(token) => request = request.bearer_auth(token),
            TokenPolicy::QueryParam(token) => {
                request = request.query(&[("access_token", token.as_str())]);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|err| TelemetryError::ConnectFailed {
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::BadStatus {
                status: status.as_u16(),
            });
        }

        let frames = response
            .bytes_stream()
            .scan(SseParser::new(), |parser, chunk| {
                let out: Vec<Result<SseFrame, TelemetryError>> = match chunk {
                    Ok(bytes) => parser.push(&bytes).into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(TelemetryError::Transport {
                        message: err.to_string(),
                    })],
                };
                futures::future::ready(Some(futures::stream::iter(out)))
            })
            .flatten();

        Ok(Box::pin(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_handles_trailing_slash() {
        let transport = HttpStreamTransport::new("http://api.test/", TokenPolicy::None);
        assert_eq!(
            transport.stream_url(&RunId::from("run_1")),
            "http://api.test/runs/run_1/stream"
        );
    }

    #[test]
    fn from_config_picks_header_variant_when_token_present() {
        let config = ApiConfig {
            base_url: "http://api.test".to_string(),
            access_token: Some("tok".to_string()),
        };
        let transport = HttpStreamTransport::from_config(&config);
        assert_eq!(transport.token, TokenPolicy::BearerHeader("tok".to_string()));

        let anonymous = HttpStreamTransport::from_config(&ApiConfig {
            base_url: "http://api.test".to_string(),
            access_token: None,
        });
        assert_eq!(anonymous.token, TokenPolicy::None);
    }
}
