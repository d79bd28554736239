//! Google Gemini API client.
//!
//! Implements [`ChatClient`](crate::ChatClient) over HTTPS for both the
//! Generative Language API (API key) and Vertex AI (bearer token).

mod api;
mod client;
mod config;
pub mod contents;

#[cfg(test)]
mod tests;

pub use client::GeminiClient;
pub use config::GeminiConfig;
