use ingest_core::error::CoreError;
use ingest_core::workflow::WorkflowMode;

use crate::services::ServiceError;

/// Errors a workflow operation reports to its caller.
///
/// Loader-phase failures are not here: they are recorded in
/// `WorkflowState::loader_error` and never leave the controller.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A domain rule rejected the operation (validation, duplicates).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The operation is not available in the current mode.
    #[error("Cannot {action} while in {mode} mode")]
    InvalidState {
        action: &'static str,
        mode: &'static str,
    },

    /// Another operation is still pending.
    #[error("Another operation is already in progress")]
    Busy,

    /// The content store rejected a manual submission.
    #[error("Failed to save content: {}", .0.detail())]
    Submit(#[source] ServiceError),

    /// The script registry could not be listed.
    #[error("Failed to list scripts: {}", .0.detail())]
    Registry(#[source] ServiceError),
}

impl WorkflowError {
    pub(crate) fn invalid_state(action: &'static str, mode: WorkflowMode) -> Self {
        Self::InvalidState {
            action,
            mode: mode.as_str(),
        }
    }
}

/// Convenience type alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
