//! ChatClient trait implementation for GeminiClient.

use async_trait::async_trait;
use gen_config::Platform;
use tracing::debug;

use super::client::GeminiClient;
use crate::{AiError, ChatClient, GenerateRequest, GenerateResponse};

#[async_trait]
impl ChatClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerateResponse, AiError> {
        let body = self.build_request_body(&request);
        let url = self.generate_url();

        debug!(
            parent: &self.span,
            model = %self.config.model,
            history = request.history.len(),
            files = request.input.files.len(),
            "gemini generate request"
        );

        let mut builder = self.http.post(&url).json(&body);
        if self.config.platform() == Platform::Vertex {
            builder = builder.bearer_auth(&self.config.credential);
        }

        let response = builder.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Provider(format!(
                "non-200 status code returned from gemini api. {status}: {text}"
            )));
        }

        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            AiError::Provider(format!("unable to parse response body. {e}. response: [{text}]"))
        })?;

        let response = self.parse_response(json)?;
        debug!(
            parent: &self.span,
            tokens = response.usage.total_tokens(),
            function_calls = response.function_calls.len(),
            "gemini generate response"
        );
        Ok(response)
    }
}
