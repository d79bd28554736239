use std::path::PathBuf;

use clap::Parser;
use gen_config::GenConfig;

/// gen: a command-line client for Google Gemini with session history,
/// file attachments and local command execution.
#[derive(Parser, Debug)]
#[command(name = "gen", about, disable_version_flag = true)]
pub struct Args {
    /// The prompt to send to the model.
    pub prompt: Option<String>,

    /// Print version and model information, then exit.
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Script mode: no progress output, failed commands end the process
    /// with their exit code.
    #[arg(short = 'q', long)]
    pub script: bool,

    /// Comma-separated list of files to attach to the prompt.
    #[arg(short = 'f', long)]
    pub files: Option<String>,

    /// Stash the active session and start a new one.
    #[arg(short = 'n', long = "new")]
    pub new_session: bool,

    /// List stored sessions.
    #[arg(short = 'l', long = "list")]
    pub list_sessions: bool,

    /// Make the session with the given id active.
    #[arg(short = 'r', long = "restore", value_name = "ID")]
    pub restore_session: Option<usize>,

    /// Delete the session with the given id.
    #[arg(short = 'd', long = "delete", value_name = "ID")]
    pub delete_session: Option<usize>,

    /// Delete every stored session.
    #[arg(long = "delete-all")]
    pub delete_all_sessions: bool,

    /// Custom generate URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Custom upload URL.
    #[arg(long)]
    pub upload_url: Option<String>,

    /// Vertex AI access token, e.g. from `gcloud auth print-access-token`.
    #[arg(short = 'a', long)]
    pub vertex_access_token: Option<String>,

    /// GCP project; selects Vertex AI.
    #[arg(short = 'p', long)]
    pub gcp_project: Option<String>,

    /// GCS bucket for Vertex AI attachments.
    #[arg(short = 'b', long)]
    pub gcs_bucket: Option<String>,

    /// Response schema: JSON, or `name:type:description|...`.
    #[arg(short = 's', long)]
    pub schema: Option<String>,

    /// Allow the model to execute commands and read or write local files.
    #[arg(short = 'x', long)]
    pub exec: bool,

    /// Ask before executing each command.
    #[arg(short = 'k', long)]
    pub approve: bool,

    /// Disable grounding with Google Search.
    #[arg(long)]
    pub no_grounding: bool,

    /// Debug logging on stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print usage statistics as JSON on stderr.
    #[arg(long)]
    pub stats: bool,

    /// Directory holding config and sessions. Defaults to ~/.gen.
    #[arg(long)]
    pub app_dir: Option<PathBuf>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Model to use.
    #[arg(long)]
    pub model: Option<String>,

    /// Use the pro model.
    #[arg(long)]
    pub pro: bool,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f64>,

    #[arg(long)]
    pub top_p: Option<f64>,

    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Free text about yourself or your use-case.
    #[arg(long)]
    pub use_case: Option<String>,

    /// Upper bound on model turns for one prompt.
    #[arg(long)]
    pub max_turns: Option<u32>,
}

impl Args {
    /// Apply command-line flags on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut GenConfig) {
        let api = &mut config.api;
        override_string(&mut api.url, &self.url);
        override_string(&mut api.upload_url, &self.upload_url);
        override_string(&mut api.gcp_project, &self.gcp_project);
        override_string(&mut api.gcs_bucket, &self.gcs_bucket);
        override_string(&mut api.model, &self.model);

        let generation = &mut config.generation;
        if let Some(max_tokens) = self.max_tokens {
            generation.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            generation.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            generation.top_p = top_p;
        }
        override_string(&mut generation.system_prompt, &self.system_prompt);
        override_string(&mut generation.use_case, &self.use_case);
        if self.no_grounding {
            generation.grounding = false;
        }

        if self.exec {
            config.tools.execution = true;
        }
        if self.approve {
            config.tools.approval = true;
        }
        if let Some(max_turns) = self.max_turns {
            config.tools.max_turns = max_turns;
        }
    }

    /// The model this invocation talks to.
    pub fn model<'a>(&self, config: &'a GenConfig) -> &'a str {
        if self.pro && self.model.is_none() {
            &config.api.pro_model
        } else {
            &config.api.model
        }
    }

    /// Attachments named by `--files`, trimmed, empty entries dropped.
    pub fn attachments(&self) -> Vec<PathBuf> {
        self.files
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

fn override_string(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("gen").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn prompt_and_short_flags() {
        let parsed = args(&["-q", "-x", "-f", "a.txt, b.txt", "list files"]);
        assert_eq!(parsed.prompt.as_deref(), Some("list files"));
        assert!(parsed.script);
        assert!(parsed.exec);
        assert_eq!(
            parsed.attachments(),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn session_commands_parse() {
        let parsed = args(&["-r", "2"]);
        assert_eq!(parsed.restore_session, Some(2));

        let parsed = args(&["--delete", "3"]);
        assert_eq!(parsed.delete_session, Some(3));

        let parsed = args(&["--delete-all"]);
        assert!(parsed.delete_all_sessions);

        let parsed = args(&["-l"]);
        assert!(parsed.list_sessions);
        assert!(parsed.prompt.is_none());
    }

    #[test]
    fn session_id_must_be_numeric() {
        assert!(Args::try_parse_from(["gen", "--restore", "latest"]).is_err());
    }

    #[test]
    fn empty_files_flag_yields_no_attachments() {
        assert!(args(&[]).attachments().is_empty());
        assert!(args(&["-f", " , "]).attachments().is_empty());
    }

    #[test]
    fn overrides_replace_config_values() {
        let parsed = args(&[
            "--model",
            "gemini-custom",
            "--temperature",
            "0.9",
            "--max-turns",
            "5",
            "-p",
            "proj",
            "-b",
            "bucket",
            "-k",
            "--no-grounding",
        ]);
        let mut config = GenConfig::default();
        parsed.apply_overrides(&mut config);

        assert_eq!(config.api.model, "gemini-custom");
        assert_eq!(config.api.gcp_project, "proj");
        assert_eq!(config.api.gcs_bucket, "bucket");
        assert_eq!(config.generation.temperature, 0.9);
        assert_eq!(config.generation.top_p, 0.2);
        assert_eq!(config.tools.max_turns, 5);
        assert!(config.tools.approval);
        assert!(!config.tools.execution);
        assert!(!config.generation.grounding);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let mut config = GenConfig::default();
        config.tools.execution = true;
        config.generation.use_case = "data engineer".into();

        args(&["hello"]).apply_overrides(&mut config);

        assert!(config.tools.execution);
        assert_eq!(config.generation.use_case, "data engineer");
        assert!(config.generation.grounding);
    }

    #[test]
    fn pro_selects_pro_model_unless_model_given() {
        let config = GenConfig::default();
        assert_eq!(args(&[]).model(&config), "gemini-2.5-flash");
        assert_eq!(args(&["--pro"]).model(&config), "gemini-2.5-pro");

        let parsed = args(&["--pro", "--model", "gemini-x"]);
        let mut config = GenConfig::default();
        parsed.apply_overrides(&mut config);
        assert_eq!(parsed.model(&config), "gemini-x");
    }
}
