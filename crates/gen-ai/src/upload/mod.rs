//! Concurrent upload of local files to the remote service.
//!
//! [`ResourceUploader::upload_all`] runs one task per file in a `JoinSet`,
//! bounded by a semaphore. The first failure cancels a shared token: tasks
//! still waiting for a permit skip their upload and in-flight uploads are
//! abandoned. Every task is joined before returning.

mod gcs;
mod gla;
mod mime;


use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use gen_common::{FileReference, LogHandle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Span};

use crate::AiError;

pub use gcs::GcsUploader;
pub use gla::GlaUploader;
pub use mime::mime_type;

/// Default bound on concurrent uploads.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// A provider-specific single-file upload.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &Path) -> Result<FileReference, AiError>;
}

pub struct ResourceUploader {
    uploader: Arc<dyn Uploader>,
    max_concurrency: usize,
    span: Span,
}

/// What a single upload task reports back.
enum TaskOutcome {
    Uploaded(usize, FileReference),
    Failed(AiError),
    Skipped,
}

impl ResourceUploader {
    pub fn new(uploader: Arc<dyn Uploader>, log: &LogHandle) -> Self {
        Self {
            uploader,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            span: log.component("uploader"),
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Upload every file, returning references in input order.
    ///
    /// Fails with the first `UploadBatch` error observed; no partial list is
    /// returned.
    pub async fn upload_all(&self, files: &[PathBuf]) -> Result<Vec<FileReference>, AiError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let cancel = CancellationToken::new();
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, file) in files.iter().enumerate() {
            let uploader = Arc::clone(&self.uploader);
            let cancel = cancel.clone();
            let permits = Arc::clone(&permits);
            let file = file.clone();
            let span = self.span.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return TaskOutcome::Skipped,
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return TaskOutcome::Skipped,
                    },
                };
                if cancel.is_cancelled() {
                    debug!(parent: &span, file = %file.display(), "upload skipped");
                    return TaskOutcome::Skipped;
                }

                debug!(parent: &span, file = %file.display(), "upload started");
                let upload = AssertUnwindSafe(uploader.upload(&file)).catch_unwind();

                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(parent: &span, file = %file.display(), "upload abandoned");
                        TaskOutcome::Skipped
                    }
                    result = upload => match result {
                        Ok(Ok(reference)) => {
                            debug!(parent: &span, file = %file.display(), uri = %reference.uri, "upload finished");
                            TaskOutcome::Uploaded(index, reference)
                        }
                        Ok(Err(e)) => TaskOutcome::Failed(batch_error(&file, e)),
                        Err(_) => TaskOutcome::Failed(AiError::UploadBatch {
                            file: file.clone(),
                            reason: "upload task panicked".into(),
                        }),
                    },
                }
            });
        }

        let mut references: Vec<Option<FileReference>> = vec![None; files.len()];
        let mut first_error: Option<AiError> = None;

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                TaskOutcome::Failed(AiError::UploadBatch {
                    file: PathBuf::new(),
                    reason: format!("upload task failed: {e}"),
                })
            });

            match outcome {
                TaskOutcome::Uploaded(index, reference) => references[index] = Some(reference),
                TaskOutcome::Failed(e) => {
                    if first_error.is_none() {
                        warn!(parent: &self.span, error = %e, "upload failed, cancelling batch");
                        cancel.cancel();
                        first_error = Some(e);
                    }
                }
                TaskOutcome::Skipped => {}
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        references
            .into_iter()
            .zip(files)
            .map(|(reference, file)| {
                reference.ok_or_else(|| AiError::UploadBatch {
                    file: file.clone(),
                    reason: "upload did not complete".into(),
                })
            })
            .collect()
    }
}

fn batch_error(file: &Path, e: AiError) -> AiError {
    match e {
        AiError::UploadBatch { .. } => e,
        other => AiError::UploadBatch {
            file: file.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// File name used as the display label of an upload.
pub(crate) fn label(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}
