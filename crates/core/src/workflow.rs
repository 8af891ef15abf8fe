//! Import workflow state and its reducer.
//!
//! The workflow is a finite-state value. Every change goes through
//! [`reduce`], which returns the next state for an event. Events that do not
//! apply to the current mode, or that would start a second operation while
//! one is pending, leave the state unchanged.
//!
//! ```text
//! Manual ──SelectLoaderTab──▶ Loader ──LoaderSucceeded(batch)──▶ BulkReview
//!   ▲                          │  ▲                                  │
//!   └──LoaderSucceeded(single)─┘  └───────────BackToLoader───────────┤
//!                                                                    │
//!   Manual ◀──────────Close────────── ImportReport ◀──ImportFinished─┘
//! ```

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateRecord;
use crate::classifier::LoaderOutput;
use crate::content::{ContentItem, ContentRecord};
use crate::outcome::{ImportOutcome, ImportProgress};
use crate::params::{set_field, EMPTY_PARAMS};
use crate::types::{DbId, ScriptId};

/// Which screen of the workflow is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    #[default]
    Manual,
    Loader,
    BulkReview,
    ImportReport,
}

impl WorkflowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Loader => "loader",
            Self::BulkReview => "bulk_review",
            Self::ImportReport => "import_report",
        }
    }
}

/// Complete workflow state, owned by one controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub mode: WorkflowMode,
    pub form: ContentRecord,
    /// Set when the form edits an existing item.
    pub editing_id: Option<DbId>,
    pub selected_script_id: Option<ScriptId>,
    pub script_params: String,
    pub found_items: Vec<CandidateRecord>,
    pub import_progress: Option<ImportProgress>,
    pub import_results: Option<ImportOutcome>,
    pub loader_error: Option<String>,
    pub submit_error: Option<String>,
    pub loader_running: bool,
    pub importing: bool,
    pub submitting: bool,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            mode: WorkflowMode::Manual,
            form: ContentRecord::default(),
            editing_id: None,
            selected_script_id: None,
            script_params: EMPTY_PARAMS.to_string(),
            found_items: Vec::new(),
            import_progress: None,
            import_results: None,
            loader_error: None,
            submit_error: None,
            loader_running: false,
            importing: false,
            submitting: false,
        }
    }
}

impl WorkflowState {
    /// Any remote operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.loader_running || self.importing || self.submitting
    }

    /// Whether "Run Loader" is enabled.
    pub fn can_run_loader(&self) -> bool {
        self.mode == WorkflowMode::Loader && self.selected_script_id.is_some() && !self.is_busy()
    }

    /// Whether "Import All" is enabled.
    pub fn can_import(&self) -> bool {
        self.mode == WorkflowMode::BulkReview && !self.found_items.is_empty() && !self.is_busy()
    }

    /// Whether the manual form may be submitted.
    pub fn can_submit(&self) -> bool {
        self.mode == WorkflowMode::Manual && !self.is_busy()
    }
}

/// Everything that can happen to a workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// Open with an empty form.
    Open,
    /// Open with the form pre-filled from an existing item.
    OpenForEdit(ContentItem),
    /// Cancel or close from any state.
    Close,
    SelectLoaderTab,
    SelectManualTab,
    SelectScript(ScriptId),
    SetScriptParams(String),
    SetParamField { name: String, value: String },
    EditForm(ContentRecord),
    LoaderStarted,
    LoaderSucceeded(LoaderOutput),
    LoaderFailed(String),
    BackToLoader,
    ImportStarted,
    ImportProgressed(ImportProgress),
    ImportFinished(ImportOutcome),
    SubmitStarted,
    SubmitFailed(String),
}

/// Compute the next state.
pub fn reduce(mut state: WorkflowState, event: WorkflowEvent) -> WorkflowState {
    use WorkflowEvent as E;
    use WorkflowMode as M;

    match event {
        E::Open | E::Close => WorkflowState::default(),

        E::OpenForEdit(item) => WorkflowState {
            form: item.to_record(),
            editing_id: Some(item.id),
            ..WorkflowState::default()
        },

        E::SelectLoaderTab if state.mode == M::Manual && !state.is_busy() => {
            state.mode = M::Loader;
            state
        }

        E::SelectManualTab if state.mode == M::Loader && !state.is_busy() => {
            state.mode = M::Manual;
            state
        }

        E::SelectScript(script_id) if state.mode == M::Loader && !state.loader_running => {
            state.selected_script_id = Some(script_id);
            state.script_params = EMPTY_PARAMS.to_string();
            state.loader_error = None;
            state
        }

        E::SetScriptParams(text) if state.mode == M::Loader && !state.loader_running => {
            state.script_params = text;
            state
        }

        E::SetParamField { name, value } if state.mode == M::Loader && !state.loader_running => {
            state.script_params = set_field(&state.script_params, &name, &value);
            state
        }

        E::EditForm(form) if state.mode == M::Manual && !state.submitting => {
            state.form = form;
            state.submit_error = None;
            state
        }

        E::LoaderStarted if state.can_run_loader() => {
            state.loader_running = true;
            state.loader_error = None;
            state
        }

        E::LoaderSucceeded(output) if state.mode == M::Loader && state.loader_running => {
            state.loader_running = false;
            match output {
                LoaderOutput::SingleItem(draft) => {
                    draft.merge_into(&mut state.form);
                    state.mode = M::Manual;
                }
                LoaderOutput::ItemBatch(items) => {
                    state.found_items = items;
                    state.import_progress = None;
                    state.import_results = None;
                    state.mode = M::BulkReview;
                }
            }
            state
        }

        E::LoaderFailed(message) if state.mode == M::Loader => {
            state.loader_running = false;
            state.loader_error = Some(message);
            state
        }

        E::BackToLoader if state.mode == M::BulkReview && !state.importing => {
            state.mode = M::Loader;
            state
        }

        E::ImportStarted if state.can_import() => {
            state.importing = true;
            state.import_results = None;
            state.import_progress = Some(ImportProgress::new(0, state.found_items.len()));
            state
        }

        E::ImportProgressed(progress) if state.importing => {
            state.import_progress = Some(progress);
            state
        }

        E::ImportFinished(outcome) if state.importing => {
            state.importing = false;
            state.found_items.clear();
            state.import_results = Some(outcome);
            state.mode = M::ImportReport;
            state
        }

        E::SubmitStarted if state.can_submit() => {
            state.submitting = true;
            state.submit_error = None;
            state
        }

        E::SubmitFailed(message) if state.submitting => {
            state.submitting = false;
            state.submit_error = Some(message);
            state
        }

        _ => state,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
