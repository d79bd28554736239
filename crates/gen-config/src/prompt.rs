//! System prompt assembly.

use crate::schema::GenerationConfig;

/// The built-in prompt for a terminal-oriented assistant named `app`.
pub fn default_system_prompt(app: &str) -> String {
    let locale = std::env::var("LANG").unwrap_or_default();
    format!(
        "You are a command line utility named '{app}' running in a terminal on the OS '{os}' with a locale set to '{locale}'. \
Factor that into the format and content of your responses and always ensure they are concise and easily rendered in such a terminal. \
You do not use complex markdown syntax in your responses as this is not rendered well in terminal output. \
You do use clear, plain text formatting that can be easily read by a human; such as using dashes for list delimiters. \
You always ensure that, to the extent that you are reasonably able, that your answers are factually correct and you take caution regarding hallucinations. \
You only answer the specific question given and do not proactively include additional information that is not directly relevant to that question. ",
        os = std::env::consts::OS,
    )
}

/// Build the system instruction sent with every request.
///
/// Appends a word budget derived from `max_tokens` and, when set, the
/// use-case text.
pub fn system_prompt(app: &str, generation: &GenerationConfig) -> String {
    let mut prompt = if generation.system_prompt.is_empty() {
        default_system_prompt(app)
    } else {
        generation.system_prompt.clone()
    };

    let words = f64::from(generation.max_tokens) * 0.75;
    prompt.push_str(&format!(
        ". Your responses must not exceed {words} words in length. "
    ));

    if !generation.use_case.is_empty() {
        prompt.push_str(
            "Consider in your responses, where it may be relevant, that the following information has been provided about your specific use-case: [",
        );
        prompt.push_str(&generation.use_case);
        prompt.push(']');
    }

    prompt
}
