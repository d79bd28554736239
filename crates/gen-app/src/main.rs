mod cli;
mod console;
mod sessions;
mod stats;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use gen_ai::{
    FunctionDispatcher, GeminiClient, GeminiConfig, GenerationParams, Orchestrator, Outcome,
    Prompt, ResourceUploader, StdinApprover, ToolSet, TurnSettings,
};
use gen_common::{ConfigError, GenError, LogHandle, LogLevel};
use gen_config::{prompt, response_schema, GenConfig, InvocationMode, Platform};
use gen_store::SessionStore;
use tracing::{error, info};

use cli::Args;
use console::ConsoleObserver;
use sessions::SessionCommand;
use stats::Stats;

const APP_NAME: &str = "gen";
const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    let script_mode = args.script;

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "gen failed");
            if !script_mode {
                println!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, GenError> {
    let app_dir = match &args.app_dir {
        Some(dir) => dir.clone(),
        None => gen_config::default_app_dir()?,
    };

    let mut config = load_config(&args, &app_dir)?;
    args.apply_overrides(&mut config);

    if args.version {
        println!(
            "{APP_NAME} {} (pro-model: {}, flash-model: {})",
            env!("CARGO_PKG_VERSION"),
            config.api.pro_model,
            config.api.model
        );
        return Ok(ExitCode::SUCCESS);
    }

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.logging.level
    };
    let log = LogHandle::init(level)?;

    let result = execute(&args, &config, &app_dir, &log).await;
    log.shutdown();
    result
}

fn load_config(args: &Args, app_dir: &Path) -> Result<GenConfig, ConfigError> {
    match &args.config {
        Some(path) => gen_config::load_from_path(path),
        None => gen_config::load_or_create(&gen_config::config_path(app_dir)),
    }
}

async fn execute(
    args: &Args,
    config: &GenConfig,
    app_dir: &Path,
    log: &LogHandle,
) -> Result<ExitCode, GenError> {
    let schema = response_schema::parse(args.schema.as_deref().unwrap_or_default())?;
    let access_token = args.vertex_access_token.as_deref().unwrap_or_default();

    gen_config::validate(config)?;
    gen_config::validate_combination(
        config,
        &InvocationMode {
            has_schema: schema.is_some(),
            script_mode: args.script,
            access_token,
        },
    )?;

    let store = SessionStore::new(app_dir, log);

    if let Some(command) = SessionCommand::from_args(args) {
        command.run(&store, &mut std::io::stdout())?;
        return Ok(ExitCode::SUCCESS);
    }

    if args.new_session {
        store.stash()?;
        if args.prompt.is_none() {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let Some(text) = args.prompt.as_deref() else {
        return Err(GenError::Other("a single prompt is required".into()));
    };

    let model = args.model(config);
    let endpoints = gen_config::resolve(&config.api, model);
    let credential = match endpoints.platform {
        Platform::GenerativeLanguage => std::env::var(API_KEY_VAR).map_err(|_| {
            ConfigError::ValidationError(format!("the {API_KEY_VAR} environment variable is not set"))
        })?,
        Platform::Vertex => access_token.to_string(),
    };

    info!(
        model,
        platform = ?endpoints.platform,
        execution = config.tools.execution,
        script = args.script,
        "answering prompt"
    );

    let client = GeminiClient::new(
        GeminiConfig::new(endpoints, credential)
            .with_model(model)
            .with_request_timeout(Duration::from_secs(config.api.request_timeout_secs.into())),
        log,
    )?;
    let uploader = ResourceUploader::new(client.uploader(log), log)
        .with_max_concurrency(config.upload.max_concurrency as usize);

    let mut dispatcher = FunctionDispatcher::new(log);
    if config.tools.approval {
        dispatcher = dispatcher.with_approver(Arc::new(StdinApprover::terminal()));
    }

    let mut orchestrator = Orchestrator::new(Arc::new(client), store, uploader, dispatcher, log);
    if !args.script {
        orchestrator = orchestrator.with_observer(Arc::new(
            ConsoleObserver::stdout().with_approval(config.tools.approval),
        ));
    }

    let has_schema = schema.is_some();
    let settings = TurnSettings {
        tools: ToolSet {
            grounding: config
                .generation
                .grounding_enabled(has_schema, config.tools.execution),
            functions: config.tools.execution,
        },
        params: GenerationParams {
            system_prompt: prompt::system_prompt(APP_NAME, &config.generation),
            max_tokens: config.generation.max_tokens,
            temperature: config.generation.temperature,
            top_p: config.generation.top_p,
            response_schema: schema,
        },
        max_turns: config.tools.max_turns,
        script_mode: args.script,
    };

    let outcome = orchestrator
        .run(&settings, Prompt::new(text).with_attachments(args.attachments()))
        .await?;

    let (response, code) = match &outcome {
        Outcome::Answer(answer) => {
            println!("{answer}\n");
            (answer.as_str(), ExitCode::SUCCESS)
        }
        Outcome::Exit(code) => ("", ExitCode::from(exit_status(*code))),
    };

    if args.stats {
        let stats = Stats::collect(model, text, response, orchestrator.tracker());
        let json = stats
            .to_json()
            .map_err(|e| GenError::Other(format!("unable to encode stats: {e}")))?;
        eprintln!("{json}");
    }

    Ok(code)
}

/// Map a command's exit status onto a process status byte.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
