//! Configuration for gen.
//!
//! Loads `config.toml` from the app directory, validates ranges and option
//! combinations, and derives the values requests are built from: endpoints,
//! the system prompt and the optional response schema.

pub mod endpoints;
pub mod prompt;
pub mod response_schema;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use endpoints::{resolve, Endpoints, Platform};
pub use schema::*;
pub use toml_loader::{config_path, default_app_dir, load_from_path, load_or_create};
pub use validation::{validate, validate_combination, InvocationMode};
