//! Import workflow controller.
//!
//! [`ImportWorkflow`] drives the pure reducer from `ingest_core::workflow`
//! with the collaborators: it runs loader scripts, classifies their output,
//! performs bulk imports and submits the manual form. Every state change is
//! published on a `watch` channel so a presentation layer can render the
//! current mode, live progress, and which controls are disabled.
//!
//! Operations take `&mut self`, so one controller never runs two operations
//! at once.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use ingest_core::classifier::{classify, LoaderOutput};
use ingest_core::content::{ContentItem, ContentPatch, ContentRecord, TransformerScriptRef};
use ingest_core::outcome::ImportOutcome;
use ingest_core::params::{resolve, ParamField};
use ingest_core::script::{loader_scripts, LoaderScript};
use ingest_core::types::ScriptId;
use ingest_core::workflow::{reduce, WorkflowEvent, WorkflowMode, WorkflowState};

use crate::bulk::run_bulk_import;
use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::runner::ScriptRunner;
use crate::services::{ContentStore, ScriptService};

/// Message shown when "Run Loader" is pressed without a script.
pub const NO_SCRIPT_SELECTED: &str = "Select a loader script first";

/// Coordinates one content import workflow.
pub struct ImportWorkflow {
    state: WorkflowState,
    updates: watch::Sender<WorkflowState>,
    scripts: Vec<LoaderScript>,
    script_service: Arc<dyn ScriptService>,
    runner: ScriptRunner,
    store: Arc<dyn ContentStore>,
    config: WorkflowConfig,
}

impl ImportWorkflow {
    pub fn new(
        script_service: Arc<dyn ScriptService>,
        store: Arc<dyn ContentStore>,
        config: WorkflowConfig,
    ) -> Self {
        let state = WorkflowState::default();
        let (updates, _) = watch::channel(state.clone());
        Self {
            state,
            updates,
            scripts: Vec::new(),
            runner: ScriptRunner::new(script_service.clone(), config.script_timeout),
            script_service,
            store,
            config,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.updates.subscribe()
    }

    fn dispatch(&mut self, event: WorkflowEvent) {
        apply(&mut self.state, &self.updates, event);
    }

    // -- Opening and closing ------------------------------------------------

    /// Open with an empty form.
    pub fn open(&mut self) {
        self.dispatch(WorkflowEvent::Open);
    }

    /// Open with the form pre-filled from `item`; submitting updates it.
    pub fn open_for_edit(&mut self, item: ContentItem) {
        self.dispatch(WorkflowEvent::OpenForEdit(item));
    }

    /// Cancel or close from any state. Always lands in a fresh Manual state.
    pub fn close(&mut self) {
        self.dispatch(WorkflowEvent::Close);
    }

    // -- Script registry ----------------------------------------------------

    /// Replace the known script list (e.g. from the presentation layer's cache).
    pub fn set_scripts(&mut self, scripts: Vec<LoaderScript>) {
        self.scripts = scripts;
    }

    /// Fetch the registry through the script service.
    pub async fn refresh_scripts(&mut self) -> WorkflowResult<()> {
        let scripts = self
            .script_service
            .list_scripts()
            .await
            .map_err(WorkflowError::Registry)?;
        tracing::debug!(count = scripts.len(), "Loaded script registry");
        self.scripts = scripts;
        Ok(())
    }

    /// Scripts that can be picked in the loader tab.
    pub fn loader_scripts(&self) -> Vec<LoaderScript> {
        loader_scripts(&self.scripts)
    }

    fn selected_script(&self) -> Option<&LoaderScript> {
        let id = self.state.selected_script_id?;
        self.scripts.iter().find(|s| s.id == id)
    }

    // -- Loader tab ---------------------------------------------------------

    pub fn select_loader_tab(&mut self) {
        self.dispatch(WorkflowEvent::SelectLoaderTab);
    }

    pub fn select_manual_tab(&mut self) {
        self.dispatch(WorkflowEvent::SelectManualTab);
    }

    pub fn select_script(&mut self, script_id: ScriptId) {
        self.dispatch(WorkflowEvent::SelectScript(script_id));
    }

    /// Form fields for the selected script's parameter schema.
    ///
    /// Empty when no script is selected or its schema is unusable; the caller
    /// then edits the raw JSON buffer.
    pub fn parameter_fields(&self) -> Vec<ParamField> {
        let schema = self
            .selected_script()
            .and_then(|s| s.parameters_schema.as_deref());
        resolve(schema, &self.state.script_params).fields
    }

    /// Parameters as they would be sent right now (best effort).
    pub fn current_params(&self) -> Map<String, Value> {
        resolve(None, &self.state.script_params).params
    }

    pub fn set_param_field(&mut self, name: &str, value: &str) {
        self.dispatch(WorkflowEvent::SetParamField {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn set_params_text(&mut self, text: impl Into<String>) {
        self.dispatch(WorkflowEvent::SetScriptParams(text.into()));
    }

    /// Run the selected loader script and route its output.
    ///
    /// A single item is merged into the form and the workflow returns to
    /// Manual; a batch moves to BulkReview. Every failure is recorded in
    /// `loader_error` and the workflow stays in Loader. Nothing is returned
    /// to the caller.
    pub async fn run_loader(&mut self) {
        if self.state.mode != WorkflowMode::Loader || self.state.is_busy() {
            tracing::debug!(mode = self.state.mode.as_str(), "Ignoring loader run request");
            return;
        }
        let Some(script_id) = self.state.selected_script_id else {
            self.dispatch(WorkflowEvent::LoaderFailed(NO_SCRIPT_SELECTED.to_string()));
            return;
        };

        self.dispatch(WorkflowEvent::LoaderStarted);

        let params_text = self.state.script_params.clone();
        let classified = match self.runner.run(script_id, &params_text).await {
            Ok(payload) => classify(&payload).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match classified {
            Ok(output) => {
                match &output {
                    LoaderOutput::SingleItem(_) => {
                        tracing::info!(script_id, "Loader returned a single item");
                    }
                    LoaderOutput::ItemBatch(items) => {
                        tracing::info!(script_id, count = items.len(), "Loader returned a batch");
                    }
                }
                self.dispatch(WorkflowEvent::LoaderSucceeded(output));
            }
            Err(message) => {
                tracing::warn!(script_id, error = %message, "Loader run failed");
                self.dispatch(WorkflowEvent::LoaderFailed(message));
            }
        }
    }

    // -- Bulk review --------------------------------------------------------

    pub fn back_to_loader(&mut self) {
        self.dispatch(WorkflowEvent::BackToLoader);
    }

    /// Import every reviewed candidate and move to the report.
    ///
    /// Returns the outcome, or `None` if the import could not start (wrong
    /// mode, nothing to import, or an operation already pending).
    pub async fn confirm_import(&mut self) -> Option<ImportOutcome> {
        if !self.state.can_import() {
            tracing::debug!(mode = self.state.mode.as_str(), "Ignoring import request");
            return None;
        }

        self.dispatch(WorkflowEvent::ImportStarted);

        let items = self.state.found_items.clone();
        let store = self.store.clone();
        let state = &mut self.state;
        let updates = &self.updates;

        let outcome = run_bulk_import(&items, store.as_ref(), self.config.persist_timeout, |p| {
            apply(state, updates, WorkflowEvent::ImportProgressed(p));
        })
        .await;

        self.dispatch(WorkflowEvent::ImportFinished(outcome.clone()));
        Some(outcome)
    }

    // -- Manual form --------------------------------------------------------

    /// Replace the form contents.
    pub fn edit_form(&mut self, form: ContentRecord) {
        self.dispatch(WorkflowEvent::EditForm(form));
    }

    pub fn attach_transformer(&mut self, script: TransformerScriptRef) -> WorkflowResult<()> {
        let mut form = self.editable_form("attach a transformer")?;
        form.attach_transformer(script)?;
        self.edit_form(form);
        Ok(())
    }

    pub fn detach_transformer(&mut self, script_id: ScriptId) -> WorkflowResult<()> {
        let mut form = self.editable_form("detach a transformer")?;
        form.detach_transformer(script_id)?;
        self.edit_form(form);
        Ok(())
    }

    pub fn set_transformer_args(
        &mut self,
        script_id: ScriptId,
        args: Map<String, Value>,
    ) -> WorkflowResult<()> {
        let mut form = self.editable_form("edit transformer arguments")?;
        form.set_transformer_args(script_id, args)?;
        self.edit_form(form);
        Ok(())
    }

    fn editable_form(&self, action: &'static str) -> WorkflowResult<ContentRecord> {
        if self.state.mode != WorkflowMode::Manual {
            return Err(WorkflowError::invalid_state(action, self.state.mode));
        }
        if self.state.submitting {
            return Err(WorkflowError::Busy);
        }
        Ok(self.state.form.clone())
    }

    /// Validate and save the manual form, creating or updating as appropriate.
    ///
    /// On success the workflow closes. On failure the error is logged, kept
    /// in `submit_error` for display, and returned.
    pub async fn submit_manual(&mut self) -> WorkflowResult<ContentItem> {
        if self.state.mode != WorkflowMode::Manual {
            return Err(WorkflowError::invalid_state("submit", self.state.mode));
        }
        if self.state.is_busy() {
            return Err(WorkflowError::Busy);
        }

        self.dispatch(WorkflowEvent::SubmitStarted);

        if let Err(e) = self.state.form.check() {
            self.dispatch(WorkflowEvent::SubmitFailed(e.to_string()));
            return Err(e.into());
        }

        let form = self.state.form.clone();
        let saved = match self.state.editing_id {
            Some(id) => self.store.update_content(id, &ContentPatch::from(&form)).await,
            None => self.store.create_content(&form).await,
        };

        match saved {
            Ok(item) => {
                tracing::info!(content_id = item.id, title = %item.title, "Saved content item");
                self.dispatch(WorkflowEvent::Close);
                Ok(item)
            }
            Err(e) => {
                tracing::error!(error = %e, title = %form.title, "Failed to save content item");
                self.dispatch(WorkflowEvent::SubmitFailed(e.detail()));
                Err(WorkflowError::Submit(e))
            }
        }
    }
}

/// Reduce `event` into `state` and publish the result.
fn apply(state: &mut WorkflowState, updates: &watch::Sender<WorkflowState>, event: WorkflowEvent) {
    let next = reduce(std::mem::take(state), event);
    *state = next;
    updates.send_replace(state.clone());
}
