//! The turn loop.

use std::path::PathBuf;
use std::sync::Arc;

use gen_common::{FileReference, FunctionResult, Input, LogHandle, Output, Transaction};
use gen_store::SessionStore;
use tracing::{debug, info, Span};

use super::types::{NoopObserver, Outcome, Prompt, TurnObserver, TurnSettings};
use crate::token_tracker::TokenTracker;
use crate::tools::wire::decode_call;
use crate::tools::FunctionDispatcher;
use crate::upload::ResourceUploader;
use crate::{AiError, ChatClient, GenerateRequest, GenerateResponse};

/// Drives one prompt to a final answer.
pub struct Orchestrator {
    client: Arc<dyn ChatClient>,
    store: SessionStore,
    uploader: ResourceUploader,
    dispatcher: FunctionDispatcher,
    observer: Arc<dyn TurnObserver>,
    tracker: TokenTracker,
    span: Span,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn ChatClient>,
        store: SessionStore,
        uploader: ResourceUploader,
        dispatcher: FunctionDispatcher,
        log: &LogHandle,
    ) -> Self {
        Self {
            client,
            store,
            uploader,
            dispatcher,
            observer: Arc::new(NoopObserver),
            tracker: TokenTracker::new(),
            span: log.component("orchestrator"),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Usage accumulated by every prompt run through this orchestrator.
    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }

    /// Answer `prompt`, dispatching any function calls along the way.
    pub async fn run(&mut self, settings: &TurnSettings, prompt: Prompt) -> Result<Outcome, AiError> {
        let mut history = self.store.read()?;
        let files = self.upload(&prompt.attachments).await?;
        let mut input = Input::user(prompt.text, files);
        let mut turn: u32 = 0;

        loop {
            turn += 1;
            debug!(parent: &self.span, turn, history = history.len(), "model turn");

            let response = self
                .client
                .generate(GenerateRequest {
                    history: &history,
                    input: &input,
                    tools: settings.tools,
                    params: &settings.params,
                })
                .await?;
            self.tracker.record(&response.usage);

            let tokens = response.usage.total_tokens();
            let output = self.classify(response)?;
            let request = output.function_request.clone();
            let text = output.text.clone();

            history.push(Transaction {
                tokens,
                input,
                output,
            });
            self.store.write(&history)?;

            let Some(request) = request else {
                info!(parent: &self.span, turns = turn, tokens = self.tracker.total_tokens(), "prompt answered");
                return Ok(Outcome::Answer(text));
            };

            if turn >= settings.max_turns {
                return Err(AiError::LoopLimitExceeded {
                    limit: settings.max_turns,
                });
            }

            self.observer.on_function(&request);
            let dispatched = self.dispatcher.dispatch(&request).await?;
            self.tracker.record_function(request.kind());
            self.observer.on_result(&dispatched.result);

            if settings.script_mode {
                if let FunctionResult::Execute(result) = &dispatched.result {
                    if result.code != 0 {
                        info!(parent: &self.span, code = result.code, "command failed in script mode, exiting");
                        return Ok(Outcome::Exit(result.code));
                    }
                }
            }

            let files = self.upload(&dispatched.attachments).await?;
            input = Input::function_result(dispatched.result, files);
        }
    }

    /// Turn a raw response into the output persisted for this turn.
    fn classify(&self, response: GenerateResponse) -> Result<Output, AiError> {
        let GenerateResponse {
            text,
            mut function_calls,
            ..
        } = response;

        if function_calls.len() > 1 {
            let names: Vec<&str> = function_calls.iter().map(|c| c.name.as_str()).collect();
            return Err(AiError::Provider(format!(
                "unexpected function call response returned. zero or one function call expected. got {}",
                names.join(", ")
            )));
        }

        match function_calls.pop() {
            Some(call) => {
                let request = decode_call(&call)?;
                if !text.trim().is_empty() {
                    self.observer.on_commentary(&text);
                }
                debug!(parent: &self.span, function = %call.name, "function call received");
                Ok(Output::function(request))
            }
            None if text.is_empty() => Err(AiError::Provider(
                "unexpected text response returned. expected text content. got empty string".into(),
            )),
            None => Ok(Output::text(text)),
        }
    }

    async fn upload(&mut self, files: &[PathBuf]) -> Result<Vec<FileReference>, AiError> {
        let references = self.uploader.upload_all(files).await?;
        self.tracker.record_files(references.len());
        Ok(references)
    }
}
