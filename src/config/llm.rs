use secrecy::SecretString;

use crate::config::helpers::{optional_env, parse_optional_env, require_env};
use crate::error::ConfigError;

/// Maximum number of tool-call rounds the reasoning adapter will run per
/// question.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Per-request timeout for the reasoning service, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Configuration for the external reasoning service.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API credential for the chat-completions endpoint. Required.
    pub api_key: SecretString,
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Model identifier sent with every request. This is also the label
    /// echoed in query responses; it describes what was requested, not an
    /// independently verified fact about which model answered.
    pub model: String,
    /// Cap on tool-call rounds per question.
    pub max_iterations: usize,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let api_key = require_env(
            "OPENAI_API_KEY",
            "Set OPENAI_API_KEY in the environment or in a .env file",
        )?;

        let base_url = optional_env("OPENAI_BASE_URL")?
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        let model = optional_env("RIDELENS_MODEL")?.unwrap_or_else(|| "gpt-4".to_string());

        let max_iterations = parse_optional_env("RIDELENS_MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS)?;
        let request_timeout_secs =
            parse_optional_env("RIDELENS_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            model,
            max_iterations,
            request_timeout_secs,
        })
    }
}
