//! Remote API endpoint and model settings.

use serde::{Deserialize, Serialize};

/// Default model used for prompts.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Model selected by `--pro`.
pub const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";

/// Gemini API settings.
///
/// Empty URLs select the canonical endpoint of the active platform. A
/// non-empty `gcp_project` selects Vertex AI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub model: String,
    pub pro_model: String,
    /// Custom generate URL. Supports `{model}`, `{api-key}`, `{gcp-project}`.
    pub url: String,
    /// Custom upload URL. Supports `{api-key}`, `{gcs-bucket}`, `{file-name}`.
    pub upload_url: String,
    pub gcp_project: String,
    pub gcs_bucket: String,
    /// Whole-request timeout applied by the HTTP client (valid range: 10-3600).
    pub request_timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            pro_model: DEFAULT_PRO_MODEL.to_string(),
            url: String::new(),
            upload_url: String::new(),
            gcp_project: String::new(),
            gcs_bucket: String::new(),
            request_timeout_secs: 300,
        }
    }
}
