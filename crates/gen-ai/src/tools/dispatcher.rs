//! Local execution of model function requests.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use gen_common::{
    ExecuteRequest, ExecuteResult, FunctionRequest, FunctionResult, LogHandle, ReadRequest,
    ReadResult, WriteRequest, WriteResult,
};
use tokio::process::Command;
use tracing::{debug, info, warn, Span};

use super::approver::Approver;
use crate::AiError;

/// The result of one dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub result: FunctionResult,
    /// Local files to attach to the next input.
    pub attachments: Vec<PathBuf>,
}

/// Runs execute, read and write requests against the local machine.
///
/// Relative paths and commands are resolved against `work_dir`.
pub struct FunctionDispatcher {
    approver: Option<Arc<dyn Approver>>,
    work_dir: PathBuf,
    span: Span,
}

impl FunctionDispatcher {
    pub fn new(log: &LogHandle) -> Self {
        Self {
            approver: None,
            work_dir: PathBuf::from("."),
            span: log.component("dispatcher"),
        }
    }

    /// Require approval before each command runs.
    pub fn with_approver(mut self, approver: Arc<dyn Approver>) -> Self {
        self.approver = Some(approver);
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub async fn dispatch(&self, request: &FunctionRequest) -> Result<Dispatched, AiError> {
        match request {
            FunctionRequest::Execute(r) => Ok(Dispatched {
                result: FunctionResult::Execute(self.execute(r).await?),
                attachments: Vec::new(),
            }),
            FunctionRequest::Read(r) => Ok(self.read(r)),
            FunctionRequest::Write(r) => Ok(Dispatched {
                result: FunctionResult::Write(self.write(r).await?),
                attachments: Vec::new(),
            }),
        }
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResult, AiError> {
        if request.text.trim().is_empty() {
            return Err(AiError::InvalidRequest("command text is empty".into()));
        }

        if let Some(approver) = &self.approver {
            if !approver.approve(&request.text).await? {
                info!(parent: &self.span, command = %request.text, "command execution declined");
                return Ok(ExecuteResult::declined());
            }
        }

        debug!(parent: &self.span, command = %request.text, "executing command");

        let output = Command::new("bash")
            .arg("-c")
            .arg(&request.text)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .output()
            .await;

        let result = match output {
            Ok(output) => ExecuteResult {
                executed: true,
                code: output.status.code().unwrap_or(ExecuteResult::UNKNOWN),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => {
                warn!(parent: &self.span, error = %e, "unable to start command");
                ExecuteResult {
                    executed: true,
                    code: ExecuteResult::UNKNOWN,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        };

        debug!(
            parent: &self.span,
            command = %request.text,
            code = result.code,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "executed command"
        );
        Ok(result)
    }

    fn read(&self, request: &ReadRequest) -> Dispatched {
        for file in &request.file_paths {
            debug!(parent: &self.span, file = %file, "file requested");
        }

        Dispatched {
            result: FunctionResult::Read(ReadResult { attached: true }),
            attachments: request
                .file_paths
                .iter()
                .map(|p| self.work_dir.join(p))
                .collect(),
        }
    }

    /// Write every file or none.
    ///
    /// Files are applied in order. On the first failure, files already
    /// written get their previous content back (or are removed if they were
    /// new) and directories created here are removed if empty.
    async fn write(&self, request: &WriteRequest) -> Result<WriteResult, AiError> {
        let mut journal = WriteJournal::default();

        for file in &request.files {
            let path = self.work_dir.join(&file.name);
            debug!(parent: &self.span, file = %file.name, bytes = file.data.len(), "writing file");

            if let Err(e) = journal.apply(&path, file.data.as_bytes()).await {
                warn!(parent: &self.span, file = %file.name, error = %e, "write failed, rolling back");
                journal.rollback(&self.span).await;
                return Err(e);
            }
        }

        info!(parent: &self.span, files = request.files.len(), "files written");
        Ok(WriteResult { written: true })
    }
}

/// Undo information for a write dispatch.
#[derive(Default)]
struct WriteJournal {
    /// Files touched, with their previous content if they existed.
    files: Vec<(PathBuf, Option<Vec<u8>>)>,
    /// Directories created, shallowest first.
    dirs: Vec<PathBuf>,
}

impl WriteJournal {
    async fn apply(&mut self, path: &Path, data: &[u8]) -> Result<(), AiError> {
        if let Some(parent) = path.parent() {
            self.dirs.extend(missing_dirs(parent).await);
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AiError::local_io("creating directory for", path, e))?;
        }

        let previous = match tokio::fs::read(path).await {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(AiError::local_io("reading existing", path, e)),
        };
        self.files.push((path.to_path_buf(), previous));

        tokio::fs::write(path, data)
            .await
            .map_err(|e| AiError::local_io("writing", path, e))
    }

    async fn rollback(self, span: &Span) {
        for (path, previous) in self.files.into_iter().rev() {
            let restored = match previous {
                Some(content) => tokio::fs::write(&path, content).await,
                None => match tokio::fs::remove_file(&path).await {
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            if let Err(e) = restored {
                warn!(parent: span, file = %path.display(), error = %e, "unable to roll back file");
            }
        }

        for dir in self.dirs.into_iter().rev() {
            if let Err(e) = tokio::fs::remove_dir(&dir).await {
                debug!(parent: span, dir = %dir.display(), error = %e, "directory left in place");
            }
        }
    }
}

/// Ancestors of `dir` (inclusive) that do not exist yet, shallowest first.
async fn missing_dirs(dir: &Path) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    let mut current = Some(dir);

    while let Some(d) = current {
        if d.as_os_str().is_empty() || tokio::fs::try_exists(d).await.unwrap_or(true) {
            break;
        }
        missing.push(d.to_path_buf());
        current = d.parent();
    }

    missing.reverse();
    missing
}
