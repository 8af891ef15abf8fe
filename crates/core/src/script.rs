//! Script registry types as seen by the importer.
//!
//! The registry itself is external; these types only describe what the
//! importer reads from it and what a script execution returns.

use serde::{Deserialize, Serialize};

use crate::types::ScriptId;

/// Loader scripts produce content candidates.
pub const SCRIPT_TYPE_CONTENT_LOADER: &str = "content_loader";

/// Transformer scripts are attached to content items and run at playback.
pub const SCRIPT_TYPE_TRANSFORMER: &str = "transformer";

pub const SCRIPT_TYPE_OVERLAY: &str = "overlay";
pub const SCRIPT_TYPE_GLOBAL: &str = "global";
pub const SCRIPT_TYPE_ADAPTER: &str = "adapter";
pub const SCRIPT_TYPE_CONTENT: &str = "content";
pub const SCRIPT_TYPE_UTILITY: &str = "utility";

/// The registry's script categories.
///
/// Names the registry introduces later are kept verbatim in [`ScriptType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScriptType {
    ContentLoader,
    Transformer,
    Overlay,
    Global,
    Adapter,
    Content,
    Utility,
    Other(String),
}

impl ScriptType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ContentLoader => SCRIPT_TYPE_CONTENT_LOADER,
            Self::Transformer => SCRIPT_TYPE_TRANSFORMER,
            Self::Overlay => SCRIPT_TYPE_OVERLAY,
            Self::Global => SCRIPT_TYPE_GLOBAL,
            Self::Adapter => SCRIPT_TYPE_ADAPTER,
            Self::Content => SCRIPT_TYPE_CONTENT,
            Self::Utility => SCRIPT_TYPE_UTILITY,
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ScriptType {
    fn from(value: String) -> Self {
        match value.as_str() {
            SCRIPT_TYPE_CONTENT_LOADER => Self::ContentLoader,
            SCRIPT_TYPE_TRANSFORMER => Self::Transformer,
            SCRIPT_TYPE_OVERLAY => Self::Overlay,
            SCRIPT_TYPE_GLOBAL => Self::Global,
            SCRIPT_TYPE_ADAPTER => Self::Adapter,
            SCRIPT_TYPE_CONTENT => Self::Content,
            SCRIPT_TYPE_UTILITY => Self::Utility,
            _ => Self::Other(value),
        }
    }
}

impl From<ScriptType> for String {
    fn from(value: ScriptType) -> Self {
        match value {
            ScriptType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script registered with the external registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderScript {
    pub id: ScriptId,
    pub name: String,
    pub script_type: ScriptType,
    /// JSON-schema-like description of the script's parameters, as text.
    #[serde(default)]
    pub parameters_schema: Option<String>,
}

impl LoaderScript {
    pub fn is_content_loader(&self) -> bool {
        self.script_type == ScriptType::ContentLoader
    }
}

/// Keep only the scripts that can feed the importer, in registry order.
pub fn loader_scripts(scripts: &[LoaderScript]) -> Vec<LoaderScript> {
    scripts
        .iter()
        .filter(|s| s.is_content_loader())
        .cloned()
        .collect()
}

/// Reply of the script-execution service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// JSON-encoded script output (a single object or an array).
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
