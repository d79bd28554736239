//! Gemini API client struct, request building, and response parsing.

use std::sync::Arc;

use gen_common::LogHandle;
use gen_config::endpoints::API_KEY_PLACEHOLDER;
use gen_config::Platform;
use serde_json::{json, Value};
use tracing::Span;

use super::config::GeminiConfig;
use super::contents::{build_history, input_content};
use crate::tools::definitions::{function_declarations_tool, google_search_tool};
use crate::upload::{GcsUploader, GlaUploader, Uploader};
use crate::{AiError, FunctionCall, GenerateRequest, GenerateResponse, TokenUsage};

const FINISH_REASON_STOP: &str = "STOP";
const FINISH_REASON_MAX_TOKENS: &str = "MAX_TOKENS";

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
    pub(crate) span: Span,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, log: &LogHandle) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::Transport(format!("unable to build http client. {e}")))?;

        Ok(Self {
            config,
            http,
            span: log.component("gemini"),
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// The provider-specific upload operation sharing this client's
    /// connection pool and credential.
    pub fn uploader(&self, log: &LogHandle) -> Arc<dyn Uploader> {
        let url = self.config.endpoints.upload_url.clone();
        let credential = self.config.credential.clone();
        match self.config.platform() {
            Platform::GenerativeLanguage => {
                Arc::new(GlaUploader::new(self.http.clone(), url, credential, log))
            }
            Platform::Vertex => Arc::new(GcsUploader::new(self.http.clone(), url, credential, log)),
        }
    }

    pub(crate) fn generate_url(&self) -> String {
        match self.config.platform() {
            Platform::GenerativeLanguage => self.config.endpoints.generate_url.replace(
                API_KEY_PLACEHOLDER,
                &urlencoding::encode(&self.config.credential),
            ),
            Platform::Vertex => self.config.endpoints.generate_url.clone(),
        }
    }

    /// Build the JSON request body for the Gemini API.
    pub(crate) fn build_request_body(&self, request: &GenerateRequest<'_>) -> Value {
        let mut contents = build_history(request.history);
        contents.push(input_content(request.input));

        let params = request.params;
        let mut generation_config = json!({
            "temperature": params.temperature,
            "topP": params.top_p,
            "maxOutputTokens": params.max_tokens,
            "responseMimeType": "text/plain",
        });
        if let Some(schema) = &params.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        if !params.system_prompt.is_empty() {
            body["systemInstruction"] = json!({ "parts": [{ "text": params.system_prompt }] });
        }

        let mut tools = Vec::new();
        if request.tools.grounding {
            tools.push(google_search_tool());
        }
        if request.tools.functions {
            tools.push(function_declarations_tool());
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools);
        }

        body
    }

    /// Parse a Gemini response.
    ///
    /// Only a `STOP` finish reason is accepted.
    pub(crate) fn parse_response(&self, json: Value) -> Result<GenerateResponse, AiError> {
        let first = json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| {
                AiError::Provider(format!("no valid response candidates returned. response: [{json}]"))
            })?;

        match first["finishReason"].as_str().unwrap_or_default() {
            FINISH_REASON_STOP => {}
            FINISH_REASON_MAX_TOKENS => {
                return Err(AiError::Provider(
                    "the response was terminated before it completed as the maximum number of tokens was reached"
                        .into(),
                ));
            }
            other => {
                return Err(AiError::Provider(format!(
                    "the response was terminated before it completed. the stated reason was '{other}'"
                )));
            }
        }

        let mut text = String::new();
        let mut function_calls = Vec::new();

        for part in first["content"]["parts"].as_array().into_iter().flatten() {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
            if let Some(fc) = part.get("functionCall") {
                function_calls.push(FunctionCall {
                    name: fc["name"].as_str().unwrap_or_default().to_string(),
                    args: fc.get("args").cloned().unwrap_or_else(|| json!({})),
                });
            }
        }

        let meta = &json["usageMetadata"];
        let input_tokens = meta["promptTokenCount"].as_u64().unwrap_or(0);
        let output_tokens = match meta["totalTokenCount"].as_u64() {
            Some(total) => total.saturating_sub(input_tokens),
            None => meta["candidatesTokenCount"].as_u64().unwrap_or(0),
        };

        Ok(GenerateResponse {
            text,
            function_calls,
            usage: TokenUsage {
                input_tokens,
                output_tokens,
            },
        })
    }
}
