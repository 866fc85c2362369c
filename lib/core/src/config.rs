//! Editor configuration.
//!
//! Strongly-typed configuration for an editor session, loaded via the
//! `config` crate from environment variables (separator `__`, e.g.
//! `API__BASE_URL`). The embedding host may also build one directly.

use serde::Deserialize;

/// Configuration for an editor session.
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// API collaborator configuration.
    pub api: ApiConfig,

    /// Debounce windows for inspector form commits.
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Whether edits trigger an automatic save once the graph is dirty.
    #[serde(default)]
    pub autosave: bool,
}

/// Connection settings for the workflow API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the workflow API (e.g. `http://localhost:8000`).
    pub base_url: String,

    /// Bearer token for authenticated deployments. Absent on
    /// unauthenticated ones; token acquisition is out of scope here.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Quiescence windows before a form edit is committed to the graph.
#[derive(Debug, Clone, Deserialize)]
pub struct DebounceConfig {
    /// Window for dedicated and friendly field layouts, in milliseconds.
    #[serde(default = "default_field_commit_ms")]
    pub field_commit_ms: u64,

    /// Window for schema-driven fallback forms, in milliseconds.
    #[serde(default = "default_schema_form_ms")]
    pub schema_form_ms: u64,
}

fn default_field_commit_ms() -> u64 {
    300
}

fn default_schema_form_ms() -> u64 {
    250
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            field_commit_ms: default_field_commit_ms(),
            schema_form_ms: default_schema_form_ms(),
        }
    }
}

impl EditorConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Builds a config pointing at the given API base URL, with defaults
    /// everywhere else. Convenient for tests and embedded hosts.
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                access_token: None,
            },
            debounce: DebounceConfig::default(),
            autosave: false,
        }
    }
}
