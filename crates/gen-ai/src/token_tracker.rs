//! Token usage and activity tracking across the turns of one invocation.

use std::collections::HashMap;

use gen_common::FunctionKind;

use crate::TokenUsage;

/// Tracks cumulative token usage, model calls and dispatched functions.
#[derive(Debug)]
pub struct TokenTracker {
    /// Total usage across all turns.
    total: TokenUsage,
    /// Number of model calls made.
    call_count: u64,
    /// Dispatched functions by kind.
    by_function: HashMap<FunctionKind, u64>,
    /// Files uploaded and referenced from inputs.
    files_stored: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self {
            total: TokenUsage::default(),
            call_count: 0,
            by_function: HashMap::new(),
            files_stored: 0,
        }
    }

    /// Record token usage from a model call.
    pub fn record(&mut self, usage: &TokenUsage) {
        self.total.input_tokens += usage.input_tokens;
        self.total.output_tokens += usage.output_tokens;
        self.call_count += 1;
    }

    pub fn record_function(&mut self, kind: FunctionKind) {
        *self.by_function.entry(kind).or_default() += 1;
    }

    pub fn record_files(&mut self, count: usize) {
        self.files_stored += count as u64;
    }

    /// Get total tokens (input + output).
    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    /// Get number of model calls.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Functions dispatched, all kinds.
    pub fn function_calls(&self) -> u64 {
        self.by_function.values().sum()
    }

    pub fn files_stored(&self) -> u64 {
        self.files_stored
    }

}

impl Default for TokenTracker {
    fn default() -> Self {
        Self::new()
    }
}
