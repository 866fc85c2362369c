//! The editor session.
//!
//! Owns the editor store, the graph store, the inspector engine and the
//! telemetry hub, and implements every operation that touches more than
//! one of them as a single logical unit. The session is constructor-
//! injected with its collaborators and passed by reference to hosts;
//! there is no ambient singleton.
//!
//! Concurrency model: one consumer loop (`run`) serializes every
//! mutation; commands, telemetry events and debounce deadlines are just
//! interleaved inputs to that loop.

use crate::command::EditorCommand;
use copper_canvas_api::{ApiError, EditorApi, WorkflowDocument};
use copper_canvas_core::{EdgeId, EditorConfig, NodeId, RunId, WorkflowId};
use copper_canvas_editor::{
    EditorAction, EditorState, EditorStore, PanelTab, SaveStatus, ValidationNotice,
};
use copper_canvas_graph::{
    ConfigMap, EdgeChange, GraphError, GraphStore, NodeChange, NodeKind, WireGraph,
};
use copper_canvas_inspector::{BranchSlot, FormDescriptor, InspectorEngine};
use copper_canvas_telemetry::{ChannelEvent, StreamTransport, TelemetryEvent, TelemetryHub};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// The editor's root composition: both stores, the inspector, the
/// telemetry hub and the API handle.
pub struct EditorSession {
    api: Arc<dyn EditorApi>,
    transport: Arc<dyn StreamTransport>,
    editor: EditorStore,
    graph: GraphStore,
    inspector: InspectorEngine,
    hub: TelemetryHub,
    /// Selection to apply after the current command commits; mirrors
    /// the host UI's render-commit ordering for freshly added nodes.
    deferred_select: Option<NodeId>,
}

impl EditorSession {
    /// Creates a session from injected collaborators.
    #[must_use]
    pub fn new(
        config: &EditorConfig,
        api: Arc<dyn EditorApi>,
        transport: Arc<dyn StreamTransport>,
    ) -> Self {
        let mut editor = EditorStore::new();
        editor.dispatch(EditorAction::SetAutosave(config.autosave));
        Self {
            api,
            transport,
            editor,
            graph: GraphStore::new(),
            inspector: InspectorEngine::new(
                Duration::from_millis(config.debounce.field_commit_ms),
                Duration::from_millis(config.debounce.schema_form_ms),
            ),
            hub: TelemetryHub::new(),
            deferred_select: None,
        }
    }

    /// Editor state snapshot.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        self.editor.state()
    }

    /// The canvas graph.
    #[must_use]
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// The inspector engine (form values, descriptor, pending state).
    #[must_use]
    pub fn inspector(&self) -> &InspectorEngine {
        &self.inspector
    }

    /// True while a telemetry channel is open.
    #[must_use]
    pub fn channel_open(&self) -> bool {
        self.hub.is_open()
    }

    /// Applies a plain editor-state action.
    pub fn dispatch(&mut self, action: EditorAction) -> bool {
        self.editor.dispatch(action)
    }

    // ------------------------------------------------------------------
    // Graph operations
    // ------------------------------------------------------------------

    /// Adds a node and defers selecting it until the commit settles.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        kind: NodeKind,
        config: ConfigMap,
    ) -> NodeId {
        let id = self.graph.add_node(label, kind, config);
        self.editor.dispatch(EditorAction::MarkDirty);
        self.deferred_select = Some(id.clone());
        id
    }

    /// Applies deferred follow-ups (the post-commit selection).
    pub fn settle(&mut self) {
        if let Some(id) = self.deferred_select.take() {
            self.select_node(Some(id));
        }
    }

    /// Connects two nodes.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError`]; self-loops and duplicates are benign
    /// canvas gestures and leave the graph clean.
    pub fn connect_nodes(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        source_handle: Option<String>,
    ) -> Result<EdgeId, GraphError> {
        let edge = self.graph.connect(source, target, source_handle)?;
        self.editor.dispatch(EditorAction::MarkDirty);
        Ok(edge)
    }

    /// Applies a canvas node-change batch; structural changes dirty the
    /// document, bare selection flags do not.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        let structural = changes
            .iter()
            .any(|change| !matches!(change, NodeChange::Selected { .. }));
        self.graph.apply_node_changes(changes);
        if structural {
            self.editor.dispatch(EditorAction::MarkDirty);
        }
    }

    /// Applies a canvas edge-change batch.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        let structural = changes
            .iter()
            .any(|change| !matches!(change, EdgeChange::Selected { .. }));
        self.graph.apply_edge_changes(changes);
        if structural {
            self.editor.dispatch(EditorAction::MarkDirty);
        }
    }

    /// Deletes everything named by `ids`, clears the selection, and
    /// dirties the document when something was actually removed, as one
    /// logical unit.
    pub fn delete_selected(&mut self, ids: &HashSet<String>) -> usize {
        let removed = self.graph.delete_selected(ids);
        // The inspector may be bound to a node that just went away;
        // rebinding drops any pending delta with it.
        let flushed = self.inspector.select(None);
        if let Some(commit) = flushed {
            self.graph.update_node_config(&commit.node_id, commit.delta);
        }
        self.editor.dispatch(EditorAction::ClearSelection);
        if removed > 0 {
            self.editor.dispatch(EditorAction::MarkDirty);
        }
        removed
    }

    /// Renames a node (template re-resolves) and rebinds the inspector
    /// if it was editing that node.
    pub fn set_node_label(&mut self, id: &NodeId, label: impl Into<String>) {
        if !self.graph.set_node_label(id, label) {
            return;
        }
        self.editor.dispatch(EditorAction::MarkDirty);
        if self.inspector.selected() == Some(id) {
            self.select_node(Some(id.clone()));
        }
    }

    // ------------------------------------------------------------------
    // Selection and inspector
    // ------------------------------------------------------------------

    /// Selects a node (or clears the selection with `None`).
    ///
    /// Any pending form delta is flushed to the previously selected
    /// node before the form rebinds, so a late debounce commit can
    /// never land on the new node.
    pub fn select_node(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.graph.contains_node(id));
        let flushed = {
            let node = id.as_ref().and_then(|id| self.graph.node(id));
            self.inspector.select(node)
        };
        if let Some(commit) = flushed {
            self.graph.update_node_config(&commit.node_id, commit.delta);
        }
        self.editor.dispatch(EditorAction::SetSelectedNodeId(id));
    }

    /// Selects an edge, unbinding the inspector form.
    pub fn select_edge(&mut self, id: Option<EdgeId>) {
        if let Some(commit) = self.inspector.select(None) {
            self.graph.update_node_config(&commit.node_id, commit.delta);
        }
        self.editor.dispatch(EditorAction::SetSelectedEdgeId(id));
    }

    /// Records a form field edit. Dirty is marked synchronously with
    /// the keystroke; the config write lands after the quiescence
    /// window.
    pub fn edit_field(&mut self, key: &str, value: JsonValue) {
        if self.inspector.selected().is_none() {
            return;
        }
        self.editor.dispatch(EditorAction::MarkDirty);
        self.inspector.edit_field(key, value, Instant::now());
    }

    /// The raw-JSON editing path: applied immediately on parse success,
    /// silently ignored otherwise.
    pub fn edit_raw_config(&mut self, text: &str) {
        if let Some(commit) = self.inspector.edit_raw(text) {
            self.graph.replace_node_config(&commit.node_id, commit.delta);
            self.editor.dispatch(EditorAction::MarkDirty);
        }
    }

    /// Wires a branch target immediately from the picker.
    pub fn set_branch_target(&mut self, slot: BranchSlot, target: Option<NodeId>) {
        if let Some(commit) = self.inspector.set_branch_target(slot, target.as_ref()) {
            self.graph.update_node_config(&commit.node_id, commit.delta);
            self.editor.dispatch(EditorAction::MarkDirty);
        }
    }

    /// Commits the pending form delta if its window has elapsed.
    pub fn flush_inspector(&mut self, now: Instant) {
        if let Some(commit) = self.inspector.flush_due(now) {
            self.graph.update_node_config(&commit.node_id, commit.delta);
        }
    }

    /// Fetches the schema for the selected custom node and upgrades the
    /// raw-JSON fallback to a schema-driven form. Best-effort.
    pub async fn request_node_schema(&mut self) {
        if !matches!(self.inspector.descriptor(), FormDescriptor::RawJson) {
            return;
        }
        let Some(node) = self
            .inspector
            .selected()
            .and_then(|id| self.graph.node(id))
            .cloned()
        else {
            return;
        };
        match self.api.node_schema(&node.label).await {
            Ok(schema) => {
                self.inspector.apply_schema(&node, &schema);
            }
            Err(err) => {
                tracing::debug!(error = %err, label = %node.label, "schema fetch failed; raw fallback stays");
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence and runs
    // ------------------------------------------------------------------

    /// Saves the workflow.
    ///
    /// A structured validation failure selects the offending node,
    /// flags it, and raises the banner; the graph stays editable.
    ///
    /// # Errors
    ///
    /// Propagates the API error after recording it in editor state.
    pub async fn save(&mut self) -> Result<WorkflowId, ApiError> {
        if let Some(commit) = self.inspector.flush_pending() {
            self.graph.update_node_config(&commit.node_id, commit.delta);
        }
        self.editor
            .dispatch(EditorAction::SetSaveStatus(SaveStatus::Saving));
        self.graph.clear_validation_errors();
        self.editor.dispatch(EditorAction::SetValidationNotice(None));

        let document = self.document();
        match self.api.save_workflow(&document).await {
            Ok(id) => {
                self.editor
                    .dispatch(EditorAction::SetWorkflowId(Some(id.clone())));
                self.editor.dispatch(EditorAction::MarkClean);
                Ok(id)
            }
            Err(ApiError::Validation { message, node_id }) => {
                self.editor
                    .dispatch(EditorAction::SetSaveStatus(SaveStatus::Error));
                if let Some(node_id) = &node_id {
                    self.graph
                        .set_validation_error(node_id, Some(message.clone()));
                    self.select_node(Some(node_id.clone()));
                }
                self.editor
                    .dispatch(EditorAction::SetValidationNotice(Some(ValidationNotice {
                        message: message.clone(),
                        node_id: node_id.clone(),
                    })));
                Err(ApiError::Validation { message, node_id })
            }
            Err(err) => {
                tracing::warn!(error = %err, "workflow save failed");
                self.editor
                    .dispatch(EditorAction::SetSaveStatus(SaveStatus::Error));
                Err(err)
            }
        }
    }

    fn document(&self) -> WorkflowDocument {
        let state = self.editor.state();
        WorkflowDocument {
            id: state.workflow_id.clone(),
            name: state.workflow_name.clone(),
            graph: WireGraph::from_store(&self.graph, state.selection.node_id.clone()),
        }
    }

    /// Loads a workflow, replacing the graph, and restores the
    /// persisted selection when it still resolves.
    ///
    /// # Errors
    ///
    /// Propagates API failures; the previous state is left untouched in
    /// that case.
    pub async fn load_workflow(&mut self, id: &WorkflowId) -> Result<(), ApiError> {
        let document = self.api.load_workflow(id).await?;
        self.graph = document.graph.sanitize();
        let selected = document.graph.selected_node_id.clone();
        self.editor.dispatch(EditorAction::SetWorkflowId(
            document.id.clone().or_else(|| Some(id.clone())),
        ));
        self.editor
            .dispatch(EditorAction::SetWorkflowName(document.name));
        self.editor
            .dispatch(EditorAction::SetSaveStatus(SaveStatus::Idle));
        self.select_node(selected);
        tracing::info!(workflow_id = %id, nodes = self.graph.node_count(), "workflow loaded");
        Ok(())
    }

    /// Runs the workflow: silent save when unsaved, then run, then the
    /// catch-up log fetch, then the channel.
    ///
    /// # Errors
    ///
    /// Propagates save/run API failures. Log-fetch and channel-open
    /// failures degrade to a stale pane instead.
    pub async fn run_workflow(&mut self) -> Result<RunId, ApiError> {
        let workflow_id = match self.editor.state().workflow_id.clone() {
            Some(id) => id,
            None => self.save().await?,
        };
        let run_id = self.api.start_run(&workflow_id).await?;

        self.open_run_view(&run_id).await;
        self.graph.clear_runtime();
        if let Err(err) = self
            .hub
            .open(self.transport.as_ref(), run_id.clone())
            .await
        {
            tracing::warn!(error = %err, run_id = %run_id, "telemetry channel failed to open");
        }
        Ok(run_id)
    }

    /// Opens the log view for an existing run (the "View Logs" action;
    /// also how a user retries after a transport error).
    pub async fn view_run_logs(&mut self, run_id: RunId) {
        self.open_run_view(&run_id).await;
        if let Err(err) = self
            .hub
            .open(self.transport.as_ref(), run_id.clone())
            .await
        {
            tracing::warn!(error = %err, run_id = %run_id, "telemetry channel failed to open");
        }
    }

    /// Clears the log pane, surfaces it, and fetches persisted logs so
    /// the pane is populated before the stream catches up.
    async fn open_run_view(&mut self, run_id: &RunId) {
        self.editor
            .dispatch(EditorAction::SetSelectedRunLogs(JsonValue::Array(vec![])));
        self.editor.dispatch(EditorAction::SetPanelOpen(true));
        self.editor
            .dispatch(EditorAction::SetPanelTab(PanelTab::Logs));
        match self.api.run_logs(run_id).await {
            Ok(payload) => {
                self.editor
                    .dispatch(EditorAction::SetSelectedRunLogs(payload));
            }
            Err(err) => {
                tracing::warn!(error = %err, run_id = %run_id, "initial log fetch failed");
            }
        }
    }

    /// Replaces the run list from the server. Best-effort: a failure
    /// leaves the previous list.
    pub async fn refresh_runs(&mut self) {
        let Some(workflow_id) = self.editor.state().workflow_id.clone() else {
            return;
        };
        match self.api.list_runs(&workflow_id).await {
            Ok(payload) => {
                self.editor.dispatch(EditorAction::SetRuns(payload));
            }
            Err(err) => {
                tracing::warn!(error = %err, "run list refresh failed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Telemetry
    // ------------------------------------------------------------------

    /// Applies one channel event to the stores.
    pub async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Event(TelemetryEvent::Log { entry }) => {
                self.editor
                    .dispatch(EditorAction::AppendSelectedRunLog(entry));
            }
            ChannelEvent::Event(TelemetryEvent::Node { update, entry }) => {
                self.graph.set_runtime(&update.node_id, update.status);
                self.editor
                    .dispatch(EditorAction::AppendSelectedRunLog(entry));
            }
            ChannelEvent::Event(TelemetryEvent::Status { update, entry }) => {
                tracing::info!(run_id = ?update.run_id, status = ?update.status, "run finished");
                self.editor
                    .dispatch(EditorAction::AppendSelectedRunLog(entry));
                // The server signals completion; the client does not
                // infer it.
                self.hub.close();
                self.refresh_runs().await;
            }
            ChannelEvent::TransportError(_) | ChannelEvent::Ended => {
                // The hub already closed the channel; retry is a
                // user-driven re-open.
            }
        }
    }

    /// Pulls and applies the next channel event. Returns true while the
    /// channel remains open.
    pub async fn pump_telemetry(&mut self) -> bool {
        match self.hub.next_event().await {
            Some(event) => {
                self.handle_channel_event(event).await;
                self.hub.is_open()
            }
            None => false,
        }
    }

    /// Tears the session down: pending form edits land, the channel
    /// closes. Called by the run loop on shutdown; idempotent.
    pub fn teardown(&mut self) {
        if let Some(commit) = self.inspector.flush_pending() {
            self.graph.update_node_config(&commit.node_id, commit.delta);
        }
        self.hub.close();
        tracing::info!("editor session torn down");
    }

    // ------------------------------------------------------------------
    // The consumer loop
    // ------------------------------------------------------------------

    /// Runs the single-consumer loop until the command channel closes,
    /// then tears down and returns the session for inspection.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EditorCommand>) -> Self {
        loop {
            let deadline = self.inspector.deadline();
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command).await;
                    self.settle();
                    self.maybe_autosave().await;
                }
                event = self.hub.next_event(), if self.hub.is_open() => {
                    if let Some(event) = event {
                        self.handle_channel_event(event).await;
                    }
                }
                () = sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.flush_inspector(Instant::now());
                }
            }
        }
        self.teardown();
        self
    }

    async fn maybe_autosave(&mut self) {
        let wants_save = self.editor.state().autosave
            && self.editor.state().save_status == SaveStatus::Dirty;
        if wants_save {
            if let Err(err) = self.save().await {
                tracing::warn!(error = %err, "autosave failed");
            }
        }
    }

    async fn handle_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::AddNode {
                label,
                kind,
                config,
            } => {
                self.add_node(label, kind, config);
            }
            EditorCommand::Connect {
                source,
                target,
                source_handle,
            } => {
                if let Err(err) = self.connect_nodes(&source, &target, source_handle) {
                    tracing::debug!(error = %err, "connect ignored");
                }
            }
            EditorCommand::ApplyNodeChanges(changes) => self.apply_node_changes(&changes),
            EditorCommand::ApplyEdgeChanges(changes) => self.apply_edge_changes(&changes),
            EditorCommand::DeleteSelected { ids } => {
                self.delete_selected(&ids);
            }
            EditorCommand::SelectNode(id) => self.select_node(id),
            EditorCommand::SelectEdge(id) => self.select_edge(id),
            EditorCommand::SetNodeLabel { id, label } => self.set_node_label(&id, label),
            EditorCommand::EditField { key, value } => self.edit_field(&key, value),
            EditorCommand::EditRawConfig { text } => self.edit_raw_config(&text),
            EditorCommand::SetBranchTarget { slot, target } => {
                self.set_branch_target(slot, target);
            }
            EditorCommand::RequestNodeSchema => self.request_node_schema().await,
            EditorCommand::Save => {
                if let Err(err) = self.save().await {
                    tracing::debug!(error = %err, "save failed");
                }
            }
            EditorCommand::RunWorkflow => {
                if let Err(err) = self.run_workflow().await {
                    tracing::warn!(error = %err, "run failed");
                }
            }
            EditorCommand::ViewRunLogs(run_id) => self.view_run_logs(run_id).await,
            EditorCommand::RefreshRuns => self.refresh_runs().await,
            EditorCommand::LoadWorkflow(id) => {
                if let Err(err) = self.load_workflow(&id).await {
                    tracing::warn!(error = %err, "workflow load failed");
                }
            }
            EditorCommand::Dispatch(action) => {
                self.editor.dispatch(action);
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
