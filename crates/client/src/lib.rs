//! HTTP collaborators for the import workflow and the `ingest` binary's
//! configuration.

pub mod config;
pub mod error;
pub mod http;

pub use config::{ClientConfig, RunConfig};
pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, HttpContentStore, HttpScriptService};
