//! Pure domain logic for the script-driven content importer.
//!
//! Everything in this crate is synchronous and side-effect free: the data
//! model, the parameter resolver, the loader-output classifier, candidate
//! coercion, import outcomes, and the workflow reducer. Async orchestration
//! lives in `ingest-workflow`.

pub mod candidate;
pub mod classifier;
pub mod content;
pub mod error;
pub mod outcome;
pub mod params;
pub mod script;
pub mod types;
pub mod workflow;
