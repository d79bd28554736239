//! Gemini API client configuration.

use std::time::Duration;

use gen_config::{Endpoints, Platform};

/// Gemini API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key on the Generative Language platform, access token on Vertex.
    pub credential: String,
    pub model: String,
    pub endpoints: Endpoints,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("credential", &"[REDACTED]")
            .field("model", &self.model)
            .field("endpoints", &self.endpoints)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(endpoints: Endpoints, credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            model: gen_config::DEFAULT_MODEL.to_string(),
            endpoints,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn platform(&self) -> Platform {
        self.endpoints.platform
    }
}
