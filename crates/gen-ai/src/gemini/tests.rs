use super::contents::build_history;
use super::*;
use crate::{ChatClient, GenerateRequest, GenerationParams, ToolSet};
use gen_common::{
    ExecuteRequest, ExecuteResult, FileReference, FunctionRequest, FunctionResult, Input,
    LogHandle, Output, Transaction,
};
use gen_config::{ApiConfig, Endpoints};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn history() -> Vec<Transaction> {
    vec![
        Transaction {
            tokens: 10,
            input: Input::user(
                "what is in this repo",
                vec![FileReference {
                    uri: "files/readme".into(),
                    mime_type: "text/plain".into(),
                    label: "README.md".into(),
                }],
            ),
            output: Output::function(FunctionRequest::Execute(ExecuteRequest {
                text: "ls".into(),
            })),
        },
        Transaction {
            tokens: 20,
            input: Input::function_result(
                FunctionResult::Execute(ExecuteResult {
                    executed: true,
                    code: 0,
                    stdout: "src\n".into(),
                    stderr: String::new(),
                }),
                vec![],
            ),
            output: Output::text("A src directory."),
        },
    ]
}

fn client_for(endpoints: Endpoints, credential: &str) -> GeminiClient {
    GeminiClient::new(
        GeminiConfig::new(endpoints, credential),
        &LogHandle::disabled(),
    )
    .unwrap()
}

fn gla_client(server_uri: &str) -> GeminiClient {
    let api = ApiConfig {
        url: format!("{server_uri}/v1beta/models/{{model}}:generateContent?key={{api-key}}"),
        ..ApiConfig::default()
    };
    client_for(gen_config::resolve(&api, "gemini-2.5-flash"), "secret")
}

fn stop_response(parts: Value) -> Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": parts }, "finishReason": "STOP" }],
        "usageMetadata": { "promptTokenCount": 40, "candidatesTokenCount": 5, "totalTokenCount": 52 }
    })
}

#[test]
fn history_rebuilds_two_contents_per_transaction() {
    let contents = build_history(&history());

    assert_eq!(contents.len(), 4);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[0]["parts"][0]["text"], "what is in this repo");
    assert_eq!(contents[0]["parts"][1]["fileData"]["fileUri"], "files/readme");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "execute-command");
    assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["text"], "ls");
    assert_eq!(contents[2]["role"], "user");
    assert_eq!(
        contents[2]["parts"][0]["functionResponse"]["name"],
        contents[1]["parts"][0]["functionCall"]["name"]
    );
    assert_eq!(
        contents[2]["parts"][0]["functionResponse"]["response"]["stdOut"],
        "src\n"
    );
    assert_eq!(contents[3]["parts"][0]["text"], "A src directory.");
}

#[test]
fn request_body_carries_tools_schema_and_prompt() {
    let client = client_for(
        gen_config::resolve(&ApiConfig::default(), "gemini-2.5-flash"),
        "k",
    );
    let params = GenerationParams {
        system_prompt: "be brief".into(),
        response_schema: Some(json!({ "type": "OBJECT" })),
        ..GenerationParams::default()
    };
    let input = Input::user("hi", vec![]);
    let history = history();
    let body = client.build_request_body(&GenerateRequest {
        history: &history,
        input: &input,
        tools: ToolSet {
            grounding: true,
            functions: true,
        },
        params: &params,
    });

    assert_eq!(body["contents"].as_array().unwrap().len(), 5);
    assert_eq!(body["contents"][4]["parts"][0]["text"], "hi");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 10000);
    assert_eq!(body["generationConfig"]["topP"], 0.2);
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    assert!(body["tools"][0].get("googleSearch").is_some());
    assert!(body["tools"][1].get("functionDeclarations").is_some());
}

#[test]
fn request_body_without_tools_omits_them() {
    let client = client_for(
        gen_config::resolve(&ApiConfig::default(), "gemini-2.5-flash"),
        "k",
    );
    let input = Input::user("hi", vec![]);
    let body = client.build_request_body(&GenerateRequest {
        history: &[],
        input: &input,
        tools: ToolSet::default(),
        params: &GenerationParams::default(),
    });

    assert!(body.get("tools").is_none());
    assert!(body.get("systemInstruction").is_none());
    assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
}

#[test]
fn parse_collects_text_calls_and_usage() {
    let client = gla_client("http://unused");
    let response = client
        .parse_response(stop_response(json!([
            { "text": "Listing files..." },
            { "functionCall": { "name": "execute-command", "args": { "text": "ls" } } }
        ])))
        .unwrap();

    assert_eq!(response.text, "Listing files...");
    assert_eq!(response.function_calls.len(), 1);
    assert_eq!(response.function_calls[0].name, "execute-command");
    assert_eq!(response.usage.input_tokens, 40);
    assert_eq!(response.usage.total_tokens(), 52);
}

#[test]
fn parse_rejects_incomplete_responses() {
    let client = gla_client("http://unused");

    let err = client
        .parse_response(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }))
        .unwrap_err();
    assert!(err.to_string().contains("maximum number of tokens"));

    let err = client
        .parse_response(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
        .unwrap_err();
    assert!(err.to_string().contains("'SAFETY'"));

    let err = client.parse_response(json!({ "candidates": [] })).unwrap_err();
    assert!(err.to_string().contains("no valid response candidates"));
}

#[tokio::test]
async fn generate_against_generative_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "list files" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stop_response(json!([
            { "text": "Cargo.toml\nsrc" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = gla_client(&server.uri());
    let input = Input::user("list files", vec![]);
    let response = client
        .generate(GenerateRequest {
            history: &[],
            input: &input,
            tools: ToolSet::default(),
            params: &GenerationParams::default(),
        })
        .await
        .unwrap();

    assert_eq!(response.text, "Cargo.toml\nsrc");
    assert!(response.function_calls.is_empty());
}

#[tokio::test]
async fn generate_against_vertex_uses_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/proj/models/gemini-2.5-pro:generateContent"))
        .and(header("authorization", "Bearer vertex-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(stop_response(json!([{ "text": "ok" }]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiConfig {
        url: format!(
            "{}/v1/projects/{{gcp-project}}/models/{{model}}:generateContent",
            server.uri()
        ),
        gcp_project: "proj".into(),
        gcs_bucket: "bucket".into(),
        ..ApiConfig::default()
    };
    let client = client_for(gen_config::resolve(&api, "gemini-2.5-pro"), "vertex-token");
    let input = Input::user("hello", vec![]);

    let response = client
        .generate(GenerateRequest {
            history: &[],
            input: &input,
            tools: ToolSet::default(),
            params: &GenerationParams::default(),
        })
        .await
        .unwrap();
    assert_eq!(response.text, "ok");
}

#[tokio::test]
async fn non_success_status_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\":\"bad request\"}"))
        .mount(&server)
        .await;

    let client = gla_client(&server.uri());
    let input = Input::user("hi", vec![]);
    let err = client
        .generate(GenerateRequest {
            history: &[],
            input: &input,
            tools: ToolSet::default(),
            params: &GenerationParams::default(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, crate::AiError::Provider(_)));
    assert!(err.to_string().contains("bad request"));
}
