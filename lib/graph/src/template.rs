//! Node templates.
//!
//! The palette creates nodes from a fixed set of labels. The template tag
//! is resolved from the label exactly once, at node creation or graph
//! load, and stored on the node; nothing downstream re-derives behavior
//! from free-text labels.

/// Closed set of node kinds known to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTemplate {
    HttpRequest,
    Llm,
    DbQuery,
    Transform,
    Wait,
    CronTrigger,
    HttpTrigger,
    SplitInBatches,
    Loop,
    Parallel,
    WebhookTrigger,
    /// Conditional branch ("If" / "Condition" labels).
    If,
    /// Multi-way branch.
    Switch,
    SendEmail,
    SlackMessage,
    /// Anything the palette does not know; edited as raw JSON or via a
    /// server-provided schema.
    Custom,
}

impl NodeTemplate {
    /// Resolves the template for a palette label.
    ///
    /// Matching is case-insensitive on the trimmed label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "http request" => Self::HttpRequest,
            "llm" => Self::Llm,
            "db query" | "database query" => Self::DbQuery,
            "transform" => Self::Transform,
            "wait" => Self::Wait,
            "cron trigger" => Self::CronTrigger,
            "http trigger" => Self::HttpTrigger,
            "splitinbatches" | "split in batches" => Self::SplitInBatches,
            "loop" => Self::Loop,
            "parallel" => Self::Parallel,
            "webhook trigger" => Self::WebhookTrigger,
            "if" | "condition" => Self::If,
            "switch" => Self::Switch,
            "send email" => Self::SendEmail,
            "slack message" => Self::SlackMessage,
            _ => Self::Custom,
        }
    }

    /// Returns true for templates that start a workflow.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            Self::CronTrigger | Self::HttpTrigger | Self::WebhookTrigger
        )
    }

    /// Returns true for templates whose config carries wired
    /// `true_target`/`false_target` node references.
    #[must_use]
    pub fn has_branch_targets(&self) -> bool {
        matches!(self, Self::If | Self::Switch)
    }
}
