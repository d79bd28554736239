use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use gen_common::{validate_history, LogHandle, SessionStoreError, Transaction};
use tracing::{debug, info, Span};

use crate::record::{summarise, SessionRecord};

const SESSIONS_DIR: &str = "sessions";
const SESSION_EXTENSION: &str = ".json";
const ACTIVE_SUFFIX: &str = ".active";
const TEMP_SUFFIX: &str = ".tmp";

/// File-backed store of conversation sessions.
///
/// No locking is performed; one invocation per app directory is assumed.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
    span: Span,
}

struct SessionFile {
    name: String,
    path: PathBuf,
    active: bool,
}

impl SessionStore {
    pub fn new(app_dir: &Path, log: &LogHandle) -> Self {
        Self {
            dir: app_dir.join(SESSIONS_DIR),
            span: log.component("session-store"),
        }
    }

    /// Directory holding the session files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the active session. No active session reads as empty.
    pub fn read(&self) -> Result<Vec<Transaction>, SessionStoreError> {
        let Some(active) = self.active_file()? else {
            return Ok(Vec::new());
        };

        let transactions = read_transactions(&active.path)?;
        validate_history(&transactions)?;

        debug!(parent: &self.span, file = %active.name, count = transactions.len(), "session read");
        Ok(transactions)
    }

    /// Replace the content of the active session, creating one if needed.
    ///
    /// The file is written beside its destination and renamed into place.
    pub fn write(&self, transactions: &[Transaction]) -> Result<(), SessionStoreError> {
        validate_history(transactions)?;

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SessionStoreError::io("creating", &self.dir, e))?;

        let path = match self.active_file()? {
            Some(active) => active.path,
            None => self.dir.join(new_session_name()),
        };

        let json = serde_json::to_string_pretty(transactions).map_err(|e| {
            SessionStoreError::Corrupt {
                path: path.clone(),
                source: e,
            }
        })?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(TEMP_SUFFIX);
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| SessionStoreError::io("writing", &tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(SessionStoreError::io("renaming", &path, e));
        }

        debug!(parent: &self.span, file = %path.display(), count = transactions.len(), "session written");
        Ok(())
    }

    /// Deactivate the active session so the next write starts a new one.
    pub fn stash(&self) -> Result<(), SessionStoreError> {
        let Some(active) = self.active_file()? else {
            return Ok(());
        };

        let stashed = self.dir.join(stashed_name(&active.name));
        std::fs::rename(&active.path, &stashed)
            .map_err(|e| SessionStoreError::io("stashing", &active.path, e))?;

        info!(parent: &self.span, file = %active.name, "session stashed");
        Ok(())
    }

    /// Make session `id` the active one.
    pub fn restore(&self, id: usize) -> Result<(), SessionStoreError> {
        let files = self.session_files()?;
        let file = select(&files, id)?;

        if file.active {
            return Ok(());
        }

        self.stash()?;

        let restored = self.dir.join(format!("{}{ACTIVE_SUFFIX}", file.name));
        std::fs::rename(&file.path, &restored)
            .map_err(|e| SessionStoreError::io("restoring", &file.path, e))?;

        info!(parent: &self.span, id, file = %file.name, "session restored");
        Ok(())
    }

    /// Delete session `id`, active or not.
    pub fn delete(&self, id: usize) -> Result<(), SessionStoreError> {
        let files = self.session_files()?;
        let file = select(&files, id)?;

        std::fs::remove_file(&file.path)
            .map_err(|e| SessionStoreError::io("deleting", &file.path, e))?;

        info!(parent: &self.span, id, file = %file.name, "session deleted");
        Ok(())
    }

    /// Delete every session, including the active one.
    pub fn delete_all(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SessionStoreError::io("deleting", &self.dir, e)),
        }

        info!(parent: &self.span, "all sessions deleted");
        Ok(())
    }

    /// Describe every session in creation order.
    pub fn list(&self) -> Result<Vec<SessionRecord>, SessionStoreError> {
        self.session_files()?
            .into_iter()
            .enumerate()
            .map(|(i, file)| {
                let transactions = read_transactions(&file.path)?;
                let modified = std::fs::metadata(&file.path)
                    .and_then(|m| m.modified())
                    .map_err(|e| SessionStoreError::io("inspecting", &file.path, e))?;

                Ok(SessionRecord {
                    id: i + 1,
                    summary: summarise(&transactions),
                    modified: DateTime::<Local>::from(modified),
                    active: file.active,
                    name: file.name,
                })
            })
            .collect()
    }

    fn active_file(&self) -> Result<Option<SessionFile>, SessionStoreError> {
        Ok(self.session_files()?.into_iter().find(|f| f.active))
    }

    /// Session files sorted by the creation timestamp in their names.
    fn session_files(&self) -> Result<Vec<SessionFile>, SessionStoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SessionStoreError::io("listing", &self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SessionStoreError::io("listing", &self.dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| SessionStoreError::io("inspecting", entry.path(), e))?
                .is_file();
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_file || name.ends_with(TEMP_SUFFIX) {
                continue;
            }

            let active = name.ends_with(ACTIVE_SUFFIX);
            if !stashed_name(&name).ends_with(SESSION_EXTENSION) {
                continue;
            }

            files.push(SessionFile {
                path: entry.path(),
                name,
                active,
            });
        }

        files.sort_by(|a, b| stashed_name(&a.name).cmp(stashed_name(&b.name)));
        Ok(files)
    }
}

fn stashed_name(name: &str) -> &str {
    name.strip_suffix(ACTIVE_SUFFIX).unwrap_or(name)
}

fn select(files: &[SessionFile], id: usize) -> Result<&SessionFile, SessionStoreError> {
    id.checked_sub(1)
        .and_then(|i| files.get(i))
        .ok_or(SessionStoreError::InvalidId {
            id,
            count: files.len(),
        })
}

fn new_session_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos:020}{SESSION_EXTENSION}{ACTIVE_SUFFIX}")
}

fn read_transactions(path: &Path) -> Result<Vec<Transaction>, SessionStoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SessionStoreError::io("reading", path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|e| SessionStoreError::Corrupt {
        path: path.to_path_buf(),
        source: e,
    })
}
