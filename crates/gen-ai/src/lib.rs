//! Gemini conversation engine for gen.
//!
//! Provides:
//! - the [`ChatClient`] seam and its HTTPS implementation, [`GeminiClient`]
//! - concurrent attachment uploads ([`ResourceUploader`])
//! - local function execution on behalf of the model ([`FunctionDispatcher`])
//! - the multi-turn loop tying them to the session log ([`Orchestrator`])
//! - token usage tracking

pub mod gemini;
pub mod orchestrator;
pub mod token_tracker;
pub mod tools;
pub mod upload;

use std::path::PathBuf;

use async_trait::async_trait;
use gen_common::{ConfigError, GenError, Input, SessionStoreError, Transaction};

pub use gemini::{GeminiClient, GeminiConfig};
pub use orchestrator::{NoopObserver, Orchestrator, Outcome, Prompt, TurnObserver, TurnSettings};
pub use token_tracker::TokenTracker;
pub use tools::{Approver, Dispatched, FunctionDispatcher, StdinApprover};
pub use upload::{ResourceUploader, Uploader};

/// A remote generative-language service.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the prior history plus one new input and return the model's reply.
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResponse, AiError>;
}

/// Everything needed to produce one model turn.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub history: &'a [Transaction],
    pub input: &'a Input,
    pub tools: ToolSet,
    pub params: &'a GenerationParams,
}

/// Tools offered to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolSet {
    /// Google Search grounding.
    pub grounding: bool,
    /// execute-command, read-files and write-files.
    pub functions: bool,
}

/// Sampling and prompt parameters shared by every turn of an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub response_schema: Option<serde_json::Value>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_tokens: 10000,
            temperature: 0.0,
            top_p: 0.2,
            response_schema: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
    pub usage: TokenUsage,
}

/// A raw function call as returned by the model, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("unable to reach gemini api. {0}")]
    Transport(String),

    #[error("error with gemini api. {0}")]
    Provider(String),

    #[error("unable to upload file '{}'. {reason}", file.display())]
    UploadBatch { file: PathBuf, reason: String },

    #[error("local io error while {context} '{}': {source}", path.display())]
    LocalIo {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no final response after {limit} model turns")]
    LoopLimitExceeded { limit: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

impl AiError {
    pub(crate) fn local_io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::LocalIo {
            context,
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Transport(e.to_string())
    }
}

impl From<AiError> for GenError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Config(e) => GenError::Config(e),
            AiError::Session(e) => GenError::Session(e),
            other => GenError::Ai(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_total_saturates() {
        let usage = TokenUsage {
            input_tokens: u64::MAX,
            output_tokens: 1,
        };
        assert_eq!(usage.total_tokens(), u64::MAX);
    }

    #[test]
    fn ai_error_maps_into_gen_error() {
        let err: GenError = AiError::Session(SessionStoreError::InvalidId { id: 9, count: 1 }).into();
        assert!(matches!(err, GenError::Session(_)));

        let err: GenError = AiError::LoopLimitExceeded { limit: 3 }.into();
        assert!(matches!(err, GenError::Ai(_)));
        assert!(err.to_string().contains("after 3 model turns"));

        let err: GenError = AiError::UploadBatch {
            file: PathBuf::from("b.txt"),
            reason: "status 500".into(),
        }
        .into();
        assert!(err.to_string().contains("unable to upload file 'b.txt'. status 500"));
    }
}
