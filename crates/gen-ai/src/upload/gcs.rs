//! Cloud Storage media upload, used with Vertex AI.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use gen_common::{FileReference, LogHandle};
use gen_config::endpoints::FILE_NAME_PLACEHOLDER;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, Span};

use super::{label, mime_type, Uploader};
use crate::AiError;

/// Uploads each file as a uniquely named object in a bucket and refers to
/// it by `gs://` URI.
pub struct GcsUploader {
    http: reqwest::Client,
    url: String,
    access_token: String,
    span: Span,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResponse {
    bucket: String,
    name: String,
    content_type: String,
}

impl std::fmt::Debug for GcsUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsUploader")
            .field("url", &self.url)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl GcsUploader {
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        access_token: impl Into<String>,
        log: &LogHandle,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            access_token: access_token.into(),
            span: log.component("gcs-upload"),
        }
    }
}

/// Unique object name for an attachment.
pub(crate) fn object_name(label: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("gen-attachment-{label}-{nanos}-{}", uuid::Uuid::new_v4().simple())
}

#[async_trait]
impl Uploader for GcsUploader {
    async fn upload(&self, file: &Path) -> Result<FileReference, AiError> {
        let size = tokio::fs::metadata(file)
            .await
            .map_err(|e| AiError::local_io("inspecting", file, e))?
            .len();
        let content_type = mime_type(file);
        let name = label(file);
        let url = self
            .url
            .replace(FILE_NAME_PLACEHOLDER, &urlencoding::encode(&object_name(&name)));

        let handle = tokio::fs::File::open(file)
            .await
            .map_err(|e| AiError::local_io("opening", file, e))?;

        debug!(parent: &self.span, file = %file.display(), size, content_type, "uploading object");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .bearer_auth(&self.access_token)
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

        let object: ObjectResponse = serde_json::from_str(&body).map_err(|e| {
            AiError::Provider(format!("unable to parse upload response. {e}. body: {body}"))
        })?;

        Ok(FileReference {
            uri: format!("gs://{}/{}", object.bucket, object.name),
            mime_type: object.content_type,
            label: name,
        })
    }
}
