//! Generative Language API resumable upload.

use std::path::Path;

use async_trait::async_trait;
use gen_common::{FileReference, LogHandle};
use gen_config::endpoints::API_KEY_PLACEHOLDER;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, Span};

use super::{label, mime_type, Uploader};
use crate::AiError;

/// Uploads through the two-step resumable protocol: a `start` request that
/// returns an upload URL, then the bytes with `upload, finalize`.
pub struct GlaUploader {
    http: reqwest::Client,
    url: String,
    api_key: String,
    span: Span,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    uri: String,
    mime_type: String,
}

impl std::fmt::Debug for GlaUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlaUploader")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GlaUploader {
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        api_key: impl Into<String>,
        log: &LogHandle,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
            span: log.component("gla-upload"),
        }
    }
}

#[async_trait]
impl Uploader for GlaUploader {
    async fn upload(&self, file: &Path) -> Result<FileReference, AiError> {
        let size = tokio::fs::metadata(file)
            .await
            .map_err(|e| AiError::local_io("inspecting", file, e))?
            .len();
        let content_type = mime_type(file);
        let name = label(file);
        let url = self
            .url
            .replace(API_KEY_PLACEHOLDER, &urlencoding::encode(&self.api_key));

        debug!(parent: &self.span, file = %file.display(), size, content_type, "starting upload");

        let start = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", content_type)
            .json(&serde_json::json!({ "file": { "display_name": name } }))
            .send()
            .await?;

        let status = start.status();
        if !status.is_success() {
            let body = start.text().await.unwrap_or_default();
            return Err(AiError::Provider(format!(
                "start-upload request failed with status {status}. {body}"
            )));
        }

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                AiError::Provider(
                    "upload url not found in start-upload response header 'x-goog-upload-url'"
                        .into(),
                )
            })?;

        let handle = tokio::fs::File::open(file)
            .await
            .map_err(|e| AiError::local_io("opening", file, e))?;

        let response = self
            .http
            .post(&upload_url)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Provider(format!(
                "upload request failed with status {status}. {body}"
            )));
        }

        let uploaded: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            AiError::Provider(format!("unable to parse upload response. {e}. body: {body}"))
        })?;

        debug!(parent: &self.span, file = %file.display(), uri = %uploaded.file.uri, "upload complete");

        Ok(FileReference {
            uri: uploaded.file.uri,
            mime_type: uploaded.file.mime_type,
            label: name,
        })
    }
}
