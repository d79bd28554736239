//! Remote endpoint resolution.
//!
//! The Generative Language API authenticates with an API key embedded in the
//! URL; Vertex AI uses a bearer token and stores attachments in a Cloud
//! Storage bucket. Templates carry `{placeholder}` segments that are filled
//! in here or, for per-request values, by the client.

use crate::schema::ApiConfig;

/// Placeholder for the API key, substituted at request time.
pub const API_KEY_PLACEHOLDER: &str = "{api-key}";
/// Placeholder for the uploaded object name, substituted at request time.
pub const FILE_NAME_PLACEHOLDER: &str = "{file-name}";

const GLA_GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent?key={api-key}";
const GLA_UPLOAD_URL: &str =
    "https://generativelanguage.googleapis.com/upload/v1beta/files?key={api-key}";
const VERTEX_GENERATE_URL: &str = "https://aiplatform.googleapis.com/v1/projects/{gcp-project}/locations/global/publishers/google/models/{model}:generateContent";
const VERTEX_UPLOAD_URL: &str =
    "https://storage.googleapis.com/upload/storage/v1/b/{gcs-bucket}/o?uploadType=media&name={file-name}";

/// Which Gemini API surface the invocation talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    GenerativeLanguage,
    Vertex,
}

impl Platform {
    pub fn for_config(api: &ApiConfig) -> Self {
        if api.gcp_project.is_empty() {
            Platform::GenerativeLanguage
        } else {
            Platform::Vertex
        }
    }
}

/// Fully resolved URLs for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub platform: Platform,
    pub generate_url: String,
    pub upload_url: String,
}

/// Resolve the generate and upload URLs for `model`.
///
/// Custom URLs from the config take precedence over the platform defaults.
/// `{api-key}` and `{file-name}` are left in place.
pub fn resolve(api: &ApiConfig, model: &str) -> Endpoints {
    let platform = Platform::for_config(api);
    let (generate, upload) = match platform {
        Platform::GenerativeLanguage => (GLA_GENERATE_URL, GLA_UPLOAD_URL),
        Platform::Vertex => (VERTEX_GENERATE_URL, VERTEX_UPLOAD_URL),
    };

    let pick = |custom: &str, default: &str| {
        if custom.is_empty() {
            default.to_string()
        } else {
            custom.to_string()
        }
    };

    let fill = |template: String| {
        template
            .replace("{model}", model)
            .replace("{gcp-project}", &api.gcp_project)
            .replace("{gcs-bucket}", &api.gcs_bucket)
    };

    Endpoints {
        platform,
        generate_url: fill(pick(&api.url, generate)),
        upload_url: fill(pick(&api.upload_url, upload)),
    }
}
