//! Function-calling and upload settings.

use serde::{Deserialize, Serialize};

/// Local side effects the model may request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Expose execute-command, read-files and write-files to the model.
    pub execution: bool,
    /// Ask the operator before running each command.
    pub approval: bool,
    /// Upper bound on model turns per prompt (valid range: 1-100).
    pub max_turns: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            execution: false,
            approval: false,
            max_turns: 25,
        }
    }
}

/// File attachment upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Concurrent uploads per turn (valid range: 1-64).
    pub max_concurrency: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}
