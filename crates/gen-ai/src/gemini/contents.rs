//! Conversion of the transaction log into Gemini `contents`.

use gen_common::{FileReference, FunctionRequest, FunctionResult, Input, Output, Transaction};
use serde_json::{json, Value};

use crate::tools::definitions::function_name;
use crate::tools::wire::{request_args, result_payload};

pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";

/// Two contents per transaction: the user side, then the model side.
pub fn build_history(transactions: &[Transaction]) -> Vec<Value> {
    let mut contents = Vec::with_capacity(transactions.len() * 2 + 1);
    for transaction in transactions {
        contents.push(input_content(&transaction.input));
        contents.push(output_content(&transaction.output));
    }
    contents
}

/// The user-role content for an input.
pub fn input_content(input: &Input) -> Value {
    let mut parts = Vec::new();

    match &input.function_result {
        Some(result) => parts.push(function_response_part(result)),
        None if !input.text.is_empty() => parts.push(json!({ "text": input.text })),
        None => {}
    }
    parts.extend(input.files.iter().map(file_part));

    json!({ "role": ROLE_USER, "parts": parts })
}

/// The model-role content for an output.
pub fn output_content(output: &Output) -> Value {
    let mut parts = Vec::new();

    if !output.text.is_empty() {
        parts.push(json!({ "text": output.text }));
    }
    if let Some(request) = &output.function_request {
        parts.push(function_call_part(request));
    }

    json!({ "role": ROLE_MODEL, "parts": parts })
}

fn file_part(file: &FileReference) -> Value {
    json!({ "fileData": { "mimeType": file.mime_type, "fileUri": file.uri } })
}

fn function_call_part(request: &FunctionRequest) -> Value {
    json!({
        "functionCall": {
            "name": function_name(request.kind()),
            "args": request_args(request),
        }
    })
}

fn function_response_part(result: &FunctionResult) -> Value {
    json!({
        "functionResponse": {
            "name": function_name(result.kind()),
            "response": result_payload(result),
        }
    })
}
