//! The inspector sync engine.
//!
//! Bridges the selected node's config to an editable form without the
//! two drifting apart. Field edits are committed after a quiescence
//! window; the timer is scoped to the selection lifetime, so switching
//! nodes first flushes the pending delta to the node that was being
//! edited and then re-arms against the new one, so a late commit can
//! never land on the wrong node.

use crate::debounce::Debouncer;
use crate::descriptor::{FormDescriptor, descriptor_for};
use copper_canvas_core::NodeId;
use copper_canvas_graph::{ConfigMap, Node};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

/// A config delta addressed to a node, ready for the graph store.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigCommit {
    pub node_id: NodeId,
    pub delta: ConfigMap,
}

/// Branch slots written by the wiring picker on If/Switch nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSlot {
    True,
    False,
}

impl BranchSlot {
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::True => "true_target",
            Self::False => "false_target",
        }
    }
}

/// Per-selection form state plus the commit timer.
#[derive(Debug)]
pub struct InspectorEngine {
    field_window: Duration,
    schema_window: Duration,
    selected: Option<NodeId>,
    descriptor: FormDescriptor,
    /// Field keys derived from a server schema, when the raw-JSON
    /// fallback was upgraded.
    schema_keys: Option<Vec<String>>,
    form: ConfigMap,
    dirty: BTreeSet<String>,
    debouncer: Debouncer,
}

impl InspectorEngine {
    /// Creates an engine with the given quiescence windows (dedicated
    /// fields and schema-driven fields respectively).
    #[must_use]
    pub fn new(field_window: Duration, schema_window: Duration) -> Self {
        Self {
            field_window,
            schema_window,
            selected: None,
            descriptor: FormDescriptor::RawJson,
            schema_keys: None,
            form: ConfigMap::new(),
            dirty: BTreeSet::new(),
            debouncer: Debouncer::new(field_window),
        }
    }

    /// The node the form is bound to.
    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// The active form descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    /// Current form value for a key.
    #[must_use]
    pub fn field_value(&self, key: &str) -> Option<&JsonValue> {
        self.form.get(key)
    }

    /// True while an edit is waiting for its window.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The pending commit deadline, for the session's timer wheel.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Rebinds the form to a new selection.
    ///
    /// Any pending delta is returned for the *previously* selected node
    /// and the timer is cleared, then the form resets from the new
    /// node's current config.
    pub fn select(&mut self, node: Option<&Node>) -> Option<ConfigCommit> {
        let flushed = self.take_pending();

        match node {
            Some(node) => {
                self.selected = Some(node.id.clone());
                self.descriptor = descriptor_for(node.template);
                self.schema_keys = None;
                self.form = load_fields(self.descriptor.fields().iter().map(|f| f.key), &node.config);
                self.debouncer = Debouncer::new(self.field_window);
            }
            None => {
                self.selected = None;
                self.descriptor = FormDescriptor::RawJson;
                self.schema_keys = None;
                self.form = ConfigMap::new();
                self.debouncer = Debouncer::new(self.field_window);
            }
        }

        flushed
    }

    /// Records a field edit and (re-)arms the commit timer.
    ///
    /// Keys outside the active descriptor (or schema) are ignored.
    pub fn edit_field(&mut self, key: &str, value: JsonValue, now: Instant) {
        if self.selected.is_none() || !self.is_editable(key) {
            tracing::debug!(key, "ignoring edit for non-form field");
            return;
        }
        self.form.insert(key.to_string(), value);
        self.dirty.insert(key.to_string());
        self.debouncer.set_window(self.current_window());
        self.debouncer.note_edit(now);
    }

    /// The raw-JSON editing path.
    ///
    /// Bypasses debouncing: a successfully parsed object is returned
    /// immediately as a full-config replacement; a parse failure (or a
    /// non-object) is silently ignored so the user can type through
    /// intermediate invalid states.
    pub fn edit_raw(&mut self, text: &str) -> Option<ConfigCommit> {
        let node_id = self.selected.clone()?;
        match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::Object(map)) => {
                let keys: Vec<String> = self.active_keys().map(str::to_string).collect();
                self.form = load_fields(keys.iter().map(String::as_str), &map);
                Some(ConfigCommit {
                    node_id,
                    delta: map,
                })
            }
            Ok(_) | Err(_) => None,
        }
    }

    /// Writes a branch target immediately (picker interaction, not a
    /// keystroke). Only meaningful on auto-wire descriptors.
    pub fn set_branch_target(
        &mut self,
        slot: BranchSlot,
        target: Option<&NodeId>,
    ) -> Option<ConfigCommit> {
        let node_id = self.selected.clone()?;
        if !matches!(self.descriptor, FormDescriptor::AutoWire { .. }) {
            return None;
        }
        let value = match target {
            Some(id) => JsonValue::String(id.as_str().to_string()),
            None => JsonValue::Null,
        };
        self.form.insert(slot.key().to_string(), value.clone());
        let mut delta = ConfigMap::new();
        delta.insert(slot.key().to_string(), value);
        Some(ConfigCommit { node_id, delta })
    }

    /// Upgrades the raw-JSON fallback to a schema-driven form.
    ///
    /// Field keys come from the schema's `properties`; subsequent edits
    /// use the schema window. No-ops unless `node` is the current
    /// selection and the descriptor is the raw fallback.
    pub fn apply_schema(&mut self, node: &Node, schema: &JsonValue) -> bool {
        if self.selected.as_ref() != Some(&node.id)
            || !matches!(self.descriptor, FormDescriptor::RawJson)
        {
            return false;
        }
        let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) else {
            tracing::debug!(node_id = %node.id, "schema had no properties; keeping raw fallback");
            return false;
        };
        let keys: Vec<String> = properties.keys().cloned().collect();
        self.form = load_fields(keys.iter().map(String::as_str), &node.config);
        self.schema_keys = Some(keys);
        self.debouncer.set_window(self.schema_window);
        true
    }

    /// Commits the pending delta if its window has elapsed.
    pub fn flush_due(&mut self, now: Instant) -> Option<ConfigCommit> {
        if !self.debouncer.fire_due(now) {
            return None;
        }
        self.commit_dirty()
    }

    /// Commits the pending delta unconditionally (teardown path).
    pub fn flush_pending(&mut self) -> Option<ConfigCommit> {
        self.take_pending()
    }

    fn take_pending(&mut self) -> Option<ConfigCommit> {
        self.debouncer.cancel();
        self.commit_dirty()
    }

    fn commit_dirty(&mut self) -> Option<ConfigCommit> {
        if self.dirty.is_empty() {
            return None;
        }
        let node_id = self.selected.clone()?;
        let mut delta = ConfigMap::new();
        for key in std::mem::take(&mut self.dirty) {
            if let Some(value) = self.form.get(&key) {
                delta.insert(key, value.clone());
            }
        }
        if delta.is_empty() {
            return None;
        }
        Some(ConfigCommit { node_id, delta })
    }

    fn is_editable(&self, key: &str) -> bool {
        if let Some(keys) = &self.schema_keys {
            return keys.iter().any(|k| k == key);
        }
        self.descriptor.fields().iter().any(|f| f.key == key)
    }

    fn active_keys(&self) -> impl Iterator<Item = &str> {
        let descriptor_keys = self.descriptor.fields().iter().map(|f| f.key);
        let schema_keys = self
            .schema_keys
            .iter()
            .flat_map(|keys| keys.iter().map(String::as_str));
        descriptor_keys.chain(schema_keys)
    }

    fn current_window(&self) -> Duration {
        if self.schema_keys.is_some() {
            self.schema_window
        } else {
            self.field_window
        }
    }
}

/// Picks the named keys out of a config.
fn load_fields<'a>(keys: impl Iterator<Item = &'a str>, config: &ConfigMap) -> ConfigMap {
    let mut form = ConfigMap::new();
    for key in keys {
        if let Some(value) = config.get(key) {
            form.insert(key.to_string(), value.clone());
        }
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_canvas_graph::NodeKind;
    use serde_json::json;

    const FIELD: Duration = Duration::from_millis(300);
    const SCHEMA: Duration = Duration::from_millis(250);

    fn engine() -> InspectorEngine {
        InspectorEngine::new(FIELD, SCHEMA)
    }

    fn node(label: &str) -> Node {
        Node::new(label, NodeKind::Default, ConfigMap::new())
    }

    #[test]
    fn commit_fires_after_quiescence() {
        let mut engine = engine();
        let llm = node("LLM");
        engine.select(Some(&llm));

        let start = Instant::now();
        engine.edit_field("prompt", json!("hel"), start);
        engine.edit_field("prompt", json!("hello"), start + Duration::from_millis(100));

        assert!(engine.flush_due(start + Duration::from_millis(300)).is_none());
        let commit = engine
            .flush_due(start + Duration::from_millis(400))
            .expect("commit after window");
        assert_eq!(commit.node_id, llm.id);
        assert_eq!(commit.delta["prompt"], "hello");
        // Fires once.
        assert!(engine.flush_due(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn reselection_flushes_to_previous_node_only() {
        let mut engine = engine();
        let llm = node("LLM");
        let http = node("HTTP Request");
        engine.select(Some(&llm));

        let start = Instant::now();
        engine.edit_field("prompt", json!("hello"), start);

        // Select B well inside A's window: A's delta flushes to A.
        let flushed = engine
            .select(Some(&http))
            .expect("pending delta flushed on reselection");
        assert_eq!(flushed.node_id, llm.id);
        assert_eq!(flushed.delta["prompt"], "hello");

        // The old timer is dead; nothing ever commits against B.
        assert!(engine.flush_due(start + Duration::from_secs(1)).is_none());
        assert!(engine.field_value("prompt").is_none());
    }

    #[test]
    fn form_resets_from_selected_config() {
        let mut engine = engine();
        let mut config = ConfigMap::new();
        config.insert("url".into(), json!("http://example.test"));
        let http = Node::new("HTTP Request", NodeKind::Default, config);

        engine.select(Some(&http));
        assert_eq!(engine.field_value("url"), Some(&json!("http://example.test")));
    }

    #[test]
    fn edits_to_unknown_keys_are_ignored() {
        let mut engine = engine();
        let wait = node("Wait");
        engine.select(Some(&wait));
        engine.edit_field("prompt", json!("nope"), Instant::now());
        assert!(!engine.has_pending());
    }

    #[test]
    fn raw_json_applies_immediately_and_ignores_bad_input() {
        let mut engine = engine();
        let custom = node("My Special Step");
        engine.select(Some(&custom));

        assert!(engine.edit_raw("{\"a\": 1,").is_none());
        assert!(engine.edit_raw("[1, 2]").is_none());

        let commit = engine.edit_raw("{\"a\": 1}").expect("valid object applies");
        assert_eq!(commit.node_id, custom.id);
        assert_eq!(commit.delta["a"], 1);
        assert!(!engine.has_pending(), "raw path bypasses the debouncer");
    }

    #[test]
    fn branch_targets_write_immediately() {
        let mut engine = engine();
        let branch = node("If");
        let target = node("HTTP Request");
        engine.select(Some(&branch));

        let commit = engine
            .set_branch_target(BranchSlot::True, Some(&target.id))
            .expect("auto-wire commit");
        assert_eq!(commit.delta["true_target"], json!(target.id.as_str()));

        let cleared = engine
            .set_branch_target(BranchSlot::True, None)
            .expect("auto-wire clear");
        assert_eq!(cleared.delta["true_target"], JsonValue::Null);
    }

    #[test]
    fn branch_targets_require_auto_wire_descriptor() {
        let mut engine = engine();
        let wait = node("Wait");
        engine.select(Some(&wait));
        assert!(engine.set_branch_target(BranchSlot::True, None).is_none());
    }

    #[test]
    fn schema_upgrade_uses_the_shorter_window() {
        let mut engine = engine();
        let mut config = ConfigMap::new();
        config.insert("threshold".into(), json!(5));
        let custom = Node::new("My Special Step", NodeKind::Default, config);
        engine.select(Some(&custom));

        let schema = json!({ "properties": { "threshold": { "type": "number" } } });
        assert!(engine.apply_schema(&custom, &schema));
        assert_eq!(engine.field_value("threshold"), Some(&json!(5)));

        let start = Instant::now();
        engine.edit_field("threshold", json!(9), start);
        let commit = engine
            .flush_due(start + Duration::from_millis(250))
            .expect("schema window is 250ms");
        assert_eq!(commit.delta["threshold"], 9);
    }

    #[test]
    fn schema_upgrade_requires_matching_selection() {
        let mut engine = engine();
        let custom = node("My Special Step");
        let other = node("Other Step");
        engine.select(Some(&custom));
        assert!(!engine.apply_schema(&other, &json!({ "properties": {} })));
    }

    #[test]
    fn teardown_flushes_pending_delta() {
        let mut engine = engine();
        let llm = node("LLM");
        engine.select(Some(&llm));
        engine.edit_field("prompt", json!("hello"), Instant::now());

        let commit = engine.flush_pending().expect("teardown flush");
        assert_eq!(commit.node_id, llm.id);
        assert!(engine.flush_pending().is_none());
    }
}
