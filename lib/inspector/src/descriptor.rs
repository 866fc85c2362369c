//! Form descriptors per node template.
//!
//! The inspector never branches on free-text labels: each template maps
//! to a descriptor resolved from the node's template tag. Dedicated
//! layouts carry a fixed field table; friendly ones name a pluggable
//! host component and still declare their fields so the headless engine
//! can serialize them; everything unknown is edited as raw JSON (or
//! upgraded to a server-schema form).

use copper_canvas_graph::NodeTemplate;

/// Widget family a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// A nested JSON value edited as text (headers, bodies, payloads).
    Json,
    /// A reference to another node, populated from the wiring picker.
    NodeRef,
}

/// One editable field: the config key it reads and writes, plus display
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
        }
    }

    const fn number(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Number,
        }
    }

    const fn json(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Json,
        }
    }

    const fn node_ref(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::NodeRef,
        }
    }
}

const HTTP_REQUEST_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("url", "URL"),
    FieldSpec::text("method", "Method"),
    FieldSpec::json("headers", "Headers"),
    FieldSpec::json("body", "Body"),
];

const LLM_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("model", "Model"),
    FieldSpec::text("prompt", "Prompt"),
    FieldSpec::number("temperature", "Temperature"),
];

const DB_QUERY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("connection", "Connection"),
    FieldSpec::text("query", "Query"),
];

const TRANSFORM_FIELDS: &[FieldSpec] = &[FieldSpec::text("expression", "Expression")];

const WAIT_FIELDS: &[FieldSpec] = &[FieldSpec::number("seconds", "Seconds")];

const CRON_TRIGGER_FIELDS: &[FieldSpec] = &[FieldSpec::text("cron", "Schedule (Cron)")];

const HTTP_TRIGGER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("path", "Path"),
    FieldSpec::text("method", "Method"),
];

const SPLIT_IN_BATCHES_FIELDS: &[FieldSpec] =
    &[FieldSpec::number("batch_size", "Batch Size")];

const LOOP_FIELDS: &[FieldSpec] = &[FieldSpec::number("count", "Iterations")];

const PARALLEL_FIELDS: &[FieldSpec] = &[];

const WEBHOOK_TRIGGER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("path", "Path"),
    FieldSpec::text("secret", "Secret"),
    FieldSpec::json("test_payload", "Test Payload"),
];

const BRANCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("condition", "Condition"),
    FieldSpec::node_ref("true_target", "True Branch"),
    FieldSpec::node_ref("false_target", "False Branch"),
];

const SEND_EMAIL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("to", "To"),
    FieldSpec::text("subject", "Subject"),
    FieldSpec::text("body", "Body"),
];

const SLACK_MESSAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("channel", "Channel"),
    FieldSpec::text("message", "Message"),
];

/// How the inspector edits a node's config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormDescriptor {
    /// A fixed field layout owned by the editor.
    Dedicated { fields: &'static [FieldSpec] },
    /// A pluggable host component, resolved by name, with the fields it
    /// serializes.
    Friendly {
        component: &'static str,
        fields: &'static [FieldSpec],
    },
    /// A branch layout whose node-reference fields are written
    /// immediately from the wiring picker.
    AutoWire { fields: &'static [FieldSpec] },
    /// Raw-JSON fallback; may be upgraded to a schema-driven form when
    /// the server provides one for the label.
    RawJson,
}

impl FormDescriptor {
    /// The fields this descriptor serializes, if it has a fixed set.
    #[must_use]
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Dedicated { fields }
            | Self::Friendly { fields, .. }
            | Self::AutoWire { fields } => fields,
            Self::RawJson => &[],
        }
    }
}

/// Resolves the descriptor for a template.
#[must_use]
pub fn descriptor_for(template: NodeTemplate) -> FormDescriptor {
    match template {
        NodeTemplate::HttpRequest => FormDescriptor::Dedicated {
            fields: HTTP_REQUEST_FIELDS,
        },
        NodeTemplate::Llm => FormDescriptor::Dedicated { fields: LLM_FIELDS },
        NodeTemplate::DbQuery => FormDescriptor::Dedicated {
            fields: DB_QUERY_FIELDS,
        },
        NodeTemplate::Transform => FormDescriptor::Dedicated {
            fields: TRANSFORM_FIELDS,
        },
        NodeTemplate::Wait => FormDescriptor::Dedicated {
            fields: WAIT_FIELDS,
        },
        NodeTemplate::CronTrigger => FormDescriptor::Dedicated {
            fields: CRON_TRIGGER_FIELDS,
        },
        NodeTemplate::HttpTrigger => FormDescriptor::Dedicated {
            fields: HTTP_TRIGGER_FIELDS,
        },
        NodeTemplate::SplitInBatches => FormDescriptor::Dedicated {
            fields: SPLIT_IN_BATCHES_FIELDS,
        },
        NodeTemplate::Loop => FormDescriptor::Dedicated {
            fields: LOOP_FIELDS,
        },
        NodeTemplate::Parallel => FormDescriptor::Dedicated {
            fields: PARALLEL_FIELDS,
        },
        NodeTemplate::WebhookTrigger => FormDescriptor::Dedicated {
            fields: WEBHOOK_TRIGGER_FIELDS,
        },
        NodeTemplate::If | NodeTemplate::Switch => FormDescriptor::AutoWire {
            fields: BRANCH_FIELDS,
        },
        NodeTemplate::SendEmail => FormDescriptor::Friendly {
            component: "send_email",
            fields: SEND_EMAIL_FIELDS,
        },
        NodeTemplate::SlackMessage => FormDescriptor::Friendly {
            component: "slack_message",
            fields: SLACK_MESSAGE_FIELDS,
        },
        NodeTemplate::Custom => FormDescriptor::RawJson,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_templates_have_fields() {
        let descriptor = descriptor_for(NodeTemplate::HttpRequest);
        assert!(matches!(descriptor, FormDescriptor::Dedicated { .. }));
        assert!(descriptor.fields().iter().any(|f| f.key == "url"));
    }

    #[test]
    fn friendly_templates_name_a_component() {
        match descriptor_for(NodeTemplate::SendEmail) {
            FormDescriptor::Friendly { component, .. } => assert_eq!(component, "send_email"),
            other => panic!("unexpected descriptor: {other:?}"),
        }
    }

    #[test]
    fn branch_templates_auto_wire() {
        let descriptor = descriptor_for(NodeTemplate::If);
        assert!(matches!(descriptor, FormDescriptor::AutoWire { .. }));
        assert!(descriptor.fields().iter().any(|f| f.key == "true_target"));
    }

    #[test]
    fn custom_falls_back_to_raw_json() {
        assert_eq!(descriptor_for(NodeTemplate::Custom), FormDescriptor::RawJson);
        assert!(descriptor_for(NodeTemplate::Custom).fields().is_empty());
    }
}
