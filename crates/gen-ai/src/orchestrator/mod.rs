//! The multi-turn exchange loop.
//!
//! One user prompt may take several model turns: each function call the
//! model makes is dispatched locally and its result sent back, until the
//! model answers in text. Every turn is persisted before the next begins.

mod turn;
mod types;


pub use turn::Orchestrator;
pub use types::{NoopObserver, Outcome, Prompt, TurnObserver, TurnSettings};
