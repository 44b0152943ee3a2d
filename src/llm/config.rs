//! LLM configuration parsed from environment variables.

use super::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationParams, LlmError};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const API_KEY_VAR: &str = "LLM_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    /// `None` when the variable is unset. `Some("")` is legal and means the
    /// hosting environment injects credentials.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub params: GenerationParams,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// All optional:
    /// - `LLM_PROVIDER`: `gemini` (default) or `openai`
    /// - `LLM_API_KEY`: provider key; absence is reported when generating
    /// - `LLM_MODEL`: provider default when absent
    /// - `LLM_BASE_URL`: provider default when absent
    /// - `LLM_TEMPERATURE`: default 0.7
    /// - `LLM_MAX_TOKENS`: default 3000
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] for an unknown provider name.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = parse_provider(std::env::var("LLM_PROVIDER").ok().as_deref())?;
        let api_key = std::env::var(API_KEY_VAR).ok();
        let model = std::env::var("LLM_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model(provider).to_string());
        let base_url = std::env::var("LLM_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_base_url(provider).to_string())
            .trim_end_matches('/')
            .to_string();
        let params = GenerationParams {
            temperature: env_parse("LLM_TEMPERATURE", DEFAULT_TEMPERATURE),
            max_tokens: env_parse("LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            json_response: false,
        };
        let timeouts = LlmTimeouts {
            request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, api_key, model, base_url, params, timeouts })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_provider(raw: Option<&str>) -> Result<LlmProviderKind, LlmError> {
    match raw.map(str::trim).unwrap_or("gemini") {
        "gemini" | "" => Ok(LlmProviderKind::Gemini),
        "openai" => Ok(LlmProviderKind::OpenAi),
        other => Err(LlmError::ConfigParse(format!("unknown LLM_PROVIDER: {other}"))),
    }
}

pub(crate) fn default_model(provider: LlmProviderKind) -> &'static str {
    match provider {
        LlmProviderKind::Gemini => "gemini-2.0-flash",
        LlmProviderKind::OpenAi => "meta-llama/llama-3-70b-instruct",
    }
}

pub(crate) fn default_base_url(provider: LlmProviderKind) -> &'static str {
    match provider {
        LlmProviderKind::Gemini => DEFAULT_GEMINI_BASE_URL,
        LlmProviderKind::OpenAi => DEFAULT_OPENAI_BASE_URL,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
