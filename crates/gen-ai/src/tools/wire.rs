//! Mapping between typed function requests/results and their JSON shapes.

use gen_common::{
    ExecuteRequest, FunctionKind, FunctionRequest, FunctionResult, ReadRequest, WriteRequest,
};
use serde_json::{json, Value};

use super::definitions::{function_name, kind_for_name};
use crate::{AiError, FunctionCall};

/// Classify a model function call into a typed request.
pub fn decode_call(call: &FunctionCall) -> Result<FunctionRequest, AiError> {
    let kind = kind_for_name(&call.name).ok_or_else(|| {
        AiError::Provider(format!(
            "unexpected function call '{}' returned. expected one of '{}', '{}' or '{}'",
            call.name,
            function_name(FunctionKind::Execute),
            function_name(FunctionKind::Read),
            function_name(FunctionKind::Write),
        ))
    })?;

    let decode_error = |e: serde_json::Error| {
        AiError::Provider(format!(
            "unable to decode function call arguments for '{}'. {e}",
            call.name
        ))
    };

    let args = call.args.clone();
    let request = match kind {
        FunctionKind::Execute => FunctionRequest::Execute(
            serde_json::from_value::<ExecuteRequest>(args).map_err(decode_error)?,
        ),
        FunctionKind::Read => {
            FunctionRequest::Read(serde_json::from_value::<ReadRequest>(args).map_err(decode_error)?)
        }
        FunctionKind::Write => FunctionRequest::Write(
            serde_json::from_value::<WriteRequest>(args).map_err(decode_error)?,
        ),
    };

    Ok(request)
}

/// Arguments of a request as the model originally sent them.
pub fn request_args(request: &FunctionRequest) -> Value {
    match request {
        FunctionRequest::Execute(r) => json!({ "text": r.text }),
        FunctionRequest::Read(r) => json!({ "filePaths": r.file_paths }),
        FunctionRequest::Write(r) => json!({ "files": r.files }),
    }
}

/// The `response` object of a function response part.
pub fn result_payload(result: &FunctionResult) -> Value {
    match result {
        FunctionResult::Execute(r) => json!({
            "returnCode": r.code,
            "stdOut": r.stdout,
            "stdErr": r.stderr,
        }),
        FunctionResult::Read(r) => json!({ "attached": r.attached }),
        FunctionResult::Write(r) => json!({ "written": r.written }),
    }
}
