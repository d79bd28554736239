//! Configuration validation.
//!
//! [`validate`] checks numeric ranges and collects every error into a single
//! `ConfigError`. [`validate_combination`] rejects option combinations that
//! cannot work together for one invocation.

mod helpers;


use crate::schema::GenConfig;
use gen_common::ConfigError;

use helpers::{validate_range, validate_range_f64};

/// Per-invocation facts that are not part of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvocationMode<'a> {
    pub has_schema: bool,
    pub script_mode: bool,
    pub access_token: &'a str,
}

/// Run all range validations on a config, collecting all errors.
pub fn validate(config: &GenConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.api.model.trim().is_empty() {
        errors.push("api.model must not be empty".to_string());
    }
    validate_range(
        &mut errors,
        "api.request_timeout_secs",
        config.api.request_timeout_secs,
        10,
        3600,
    );
    validate_range(
        &mut errors,
        "generation.max_tokens",
        config.generation.max_tokens,
        1,
        1_000_000,
    );
    validate_range_f64(
        &mut errors,
        "generation.temperature",
        config.generation.temperature,
        0.0,
        2.0,
    );
    validate_range_f64(&mut errors, "generation.top_p", config.generation.top_p, 0.0, 1.0);
    validate_range(&mut errors, "tools.max_turns", config.tools.max_turns, 1, 100);
    validate_range(
        &mut errors,
        "upload.max_concurrency",
        config.upload.max_concurrency,
        1,
        64,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Reject option combinations that are individually valid but conflict.
pub fn validate_combination(
    config: &GenConfig,
    mode: &InvocationMode<'_>,
) -> Result<(), ConfigError> {
    if mode.has_schema && config.tools.execution {
        return Err(ConfigError::InvalidCombination(
            "a response schema cannot be specified when command execution is enabled".into(),
        ));
    }

    if mode.script_mode && config.tools.approval {
        return Err(ConfigError::InvalidCombination(
            "command approval cannot be enabled in script mode".into(),
        ));
    }

    let vertex = [
        config.api.gcp_project.as_str(),
        config.api.gcs_bucket.as_str(),
        mode.access_token,
    ];
    if vertex.iter().any(|v| !v.is_empty()) && vertex.iter().any(|v| v.is_empty()) {
        return Err(ConfigError::InvalidCombination(
            "to use the gemini api via vertex-ai a gcp-project, gcs-bucket and vertex-access-token must be provided"
                .into(),
        ));
    }

    Ok(())
}
