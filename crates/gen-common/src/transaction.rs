//! Conversation transaction model.
//!
//! A [`Transaction`] records one complete round trip with the remote
//! service: what was sent ([`Input`]) and what came back ([`Output`]).
//! Sessions are ordered sequences of transactions and are replayed to the
//! service on every turn.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SessionStoreError;

/// One persisted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tokens: u64,
    pub input: Input,
    pub output: Output,
}

/// Who produced the input of a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    #[default]
    User,
    FunctionResult,
}

/// The content sent to the remote service for a turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub kind: InputKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_result: Option<FunctionResult>,
}

impl Input {
    pub fn user(text: impl Into<String>, files: Vec<FileReference>) -> Self {
        Self {
            kind: InputKind::User,
            text: text.into(),
            files,
            function_result: None,
        }
    }

    pub fn function_result(result: FunctionResult, files: Vec<FileReference>) -> Self {
        Self {
            kind: InputKind::FunctionResult,
            text: String::new(),
            files,
            function_result: Some(result),
        }
    }
}

/// The content returned by the remote service for a turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_request: Option<FunctionRequest>,
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_request: None,
        }
    }

    pub fn function(request: FunctionRequest) -> Self {
        Self {
            text: String::new(),
            function_request: Some(request),
        }
    }

    pub fn is_function(&self) -> bool {
        self.function_request.is_some()
    }
}

/// Opaque handle to a file uploaded to the remote service.
///
/// `label` is a display name only; it is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub uri: String,
    pub mime_type: String,
    pub label: String,
}

/// Discriminant shared by function requests and their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Execute,
    Read,
    Write,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Execute => f.write_str("execute"),
            FunctionKind::Read => f.write_str("read"),
            FunctionKind::Write => f.write_str("write"),
        }
    }
}

/// A local side effect requested by the remote model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FunctionRequest {
    Execute(ExecuteRequest),
    Read(ReadRequest),
    Write(WriteRequest),
}

impl FunctionRequest {
    pub fn kind(&self) -> FunctionKind {
        match self {
            FunctionRequest::Execute(_) => FunctionKind::Execute,
            FunctionRequest::Read(_) => FunctionKind::Read,
            FunctionRequest::Write(_) => FunctionKind::Write,
        }
    }
}

/// The outcome of a dispatched [`FunctionRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FunctionResult {
    Execute(ExecuteResult),
    Read(ReadResult),
    Write(WriteResult),
}

impl FunctionResult {
    pub fn kind(&self) -> FunctionKind {
        match self {
            FunctionResult::Execute(_) => FunctionKind::Execute,
            FunctionResult::Read(_) => FunctionKind::Read,
            FunctionResult::Write(_) => FunctionKind::Write,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub file_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub files: Vec<FileWrite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWrite {
    pub name: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub executed: bool,
    pub code: i32,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl ExecuteResult {
    /// Exit code reported when the operator declines a command.
    pub const DECLINED: i32 = 125;
    /// Exit code reported when no specific exit code could be determined.
    pub const UNKNOWN: i32 = 127;

    pub fn declined() -> Self {
        Self {
            executed: true,
            code: Self::DECLINED,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub attached: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    pub written: bool,
}

/// Check the pairing invariants of a transaction log.
///
/// Every function-result input must follow an output that requested the
/// same kind of function, and the input kind must agree with the presence
/// of a result.
pub fn validate_history(transactions: &[Transaction]) -> Result<(), SessionStoreError> {
    for (i, transaction) in transactions.iter().enumerate() {
        let input = &transaction.input;

        match (input.kind, &input.function_result) {
            (InputKind::User, None) => {}
            (InputKind::FunctionResult, Some(result)) => {
                let previous = i
                    .checked_sub(1)
                    .and_then(|p| transactions[p].output.function_request.as_ref());

                match previous {
                    Some(request) if request.kind() == result.kind() => {}
                    Some(request) => {
                        return Err(SessionStoreError::InvalidHistory(format!(
                            "transaction {} carries a {} result but the preceding output requested {}",
                            i + 1,
                            result.kind(),
                            request.kind()
                        )));
                    }
                    None => {
                        return Err(SessionStoreError::InvalidHistory(format!(
                            "transaction {} carries a {} result with no preceding function request",
                            i + 1,
                            result.kind()
                        )));
                    }
                }
            }
            (kind, _) => {
                return Err(SessionStoreError::InvalidHistory(format!(
                    "transaction {} has input kind {kind:?} inconsistent with its function result",
                    i + 1
                )));
            }
        }
    }

    Ok(())
}
