//! Core TOML config loading.

use crate::schema::GenConfig;
use gen_common::ConfigError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use super::paths::create_default_config;

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields.
/// Validation is left to the caller, after command-line overrides.
pub fn load_from_path(path: &Path) -> Result<GenConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("failed to read {}: {e}", path.display())),
    })?;

    let config: GenConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from `path`, creating a commented default file when none exists.
pub fn load_or_create(path: &Path) -> Result<GenConfig, ConfigError> {
    match load_from_path(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(path)?;
            Ok(GenConfig::default())
        }
        Err(e) => Err(e),
    }
}
