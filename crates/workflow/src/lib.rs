//! Async orchestration for the content import workflow.
//!
//! - [`services`]: collaborator traits (script execution, content storage).
//! - [`runner`]: runs a loader script and normalizes its reply.
//! - [`bulk`]: sequential import of loader candidates with progress.
//! - [`controller`]: [`ImportWorkflow`], which drives the state machine.
//!
//! The pure rules (parameter resolution, classification, the reducer) live
//! in `ingest-core`.

pub mod bulk;
pub mod config;
pub mod controller;
pub mod error;
pub mod runner;
pub mod services;

pub use config::{ConfigError, WorkflowConfig};
pub use controller::ImportWorkflow;
pub use error::{WorkflowError, WorkflowResult};
pub use services::{ContentStore, ScriptService, ServiceError};
