//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# gen configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# Command-line flags take precedence over this file.

[api]
# model = "gemini-2.5-flash"
# pro_model = "gemini-2.5-pro"     # used with --pro
# url = ""                          # custom generate url: {model}, {api-key}, {gcp-project}
# upload_url = ""                   # custom upload url: {api-key}, {gcs-bucket}, {file-name}
# gcp_project = ""                  # set to use vertex-ai (requires gcs_bucket and an access token)
# gcs_bucket = ""
# request_timeout_secs = 300        # 10-3600

[generation]
# max_tokens = 10000
# temperature = 0.0                 # 0.0-2.0
# top_p = 0.2                       # 0.0-1.0
# system_prompt = ""                # empty = built-in terminal prompt
# use_case = ""                     # e.g. "you are running in a ci pipeline"
# grounding = true                  # google search grounding; off with a schema or execution

[tools]
# execution = false                 # allow the model to run commands and read/write files
# approval = false                  # ask before running each command
# max_turns = 25                    # 1-100

[upload]
# max_concurrency = 8               # 1-64

[logging]
# level = "INFO"                    # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
