//! Configuration schema types for gen.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the CLI has always used.

mod api;
mod generation;
mod system;
mod tools;

pub use api::*;
pub use generation::*;
pub use system::*;
pub use tools::*;

use serde::{Deserialize, Serialize};

/// Root configuration for gen.
///
/// Loaded from `config.toml` in the app directory, then overridden by
/// command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct GenConfig {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub tools: ToolsConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}
