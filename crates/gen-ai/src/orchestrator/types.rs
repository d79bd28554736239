//! Orchestrator inputs, outputs and progress notifications.

use std::path::PathBuf;

use gen_common::{FunctionRequest, FunctionResult};

use crate::{GenerationParams, ToolSet};

/// Per-invocation settings shared by every turn.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub tools: ToolSet,
    pub params: GenerationParams,
    /// Upper bound on model turns for one prompt.
    pub max_turns: u32,
    /// Stop with the command's exit code when an executed command fails.
    pub script_mode: bool,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            tools: ToolSet::default(),
            params: GenerationParams::default(),
            max_turns: 25,
            script_mode: false,
        }
    }
}

/// The user's prompt and local files to attach to it.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub text: String,
    pub attachments: Vec<PathBuf>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<PathBuf>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model's final text.
    Answer(String),
    /// Script mode: a command failed and the process should exit with its code.
    Exit(i32),
}

/// Receives progress while a prompt is being answered.
pub trait TurnObserver: Send + Sync {
    /// Text the model sent alongside a function call. It is not persisted.
    fn on_commentary(&self, _text: &str) {}

    /// A function request is about to be dispatched.
    fn on_function(&self, _request: &FunctionRequest) {}

    /// A function request finished.
    fn on_result(&self, _result: &FunctionResult) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TurnObserver for NoopObserver {}
