//! Generation parameters sent with every request.

use serde::{Deserialize, Serialize};

/// Model generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum response tokens (valid range: 1-1000000).
    pub max_tokens: u32,
    /// Sampling temperature (valid range: 0.0-2.0).
    pub temperature: f64,
    /// Nucleus sampling (valid range: 0.0-1.0).
    pub top_p: f64,
    /// System prompt. Empty means the built-in terminal prompt.
    pub system_prompt: String,
    /// Free text about the user or use-case appended to the system prompt.
    pub use_case: String,
    /// Ground responses with Google Search when no schema or execution is in play.
    pub grounding: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 10000,
            temperature: 0.0,
            top_p: 0.2,
            system_prompt: String::new(),
            use_case: String::new(),
            grounding: true,
        }
    }
}

impl GenerationConfig {
    /// Grounding cannot be combined with a response schema or function calling.
    pub fn grounding_enabled(&self, has_schema: bool, execution: bool) -> bool {
        self.grounding && !has_schema && !execution
    }
}
