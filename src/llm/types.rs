//! LLM types: provider-neutral messages, generation parameters and errors.
//!
//! Both adapters (`gemini`, `openai`) speak these types; the orchestration
//! layer never sees a provider wire shape.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by model provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// No API key was configured. Surfaced to the user, never fatal at startup.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The request never produced an HTTP response (DNS, connect, timeout, body read).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("{message}")]
    Provider { status: u16, message: String },

    /// The provider envelope had no usable first candidate/choice text.
    #[error("no content received from model")]
    EmptyCompletion,

    /// The provider response body was not valid JSON.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Provider { .. } => "E_PROVIDER",
            Self::EmptyCompletion => "E_EMPTY_COMPLETION",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Provider { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Conversation role in provider-neutral vocabulary.
///
/// Adapters translate `Assistant` into their own word for it (`model` for
/// Gemini, `assistant` for `OpenAI`-compatible APIs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, text: text.into() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into() }
    }
}

// =============================================================================
// GENERATION PARAMETERS
// =============================================================================

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 3000;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider for a bare JSON object instead of free text.
    pub json_response: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE, max_tokens: DEFAULT_MAX_TOKENS, json_response: false }
    }
}

impl GenerationParams {
    #[must_use]
    pub fn with_json_response(mut self) -> Self {
        self.json_response = true;
        self
    }
}

// =============================================================================
// MODEL PROVIDER TRAIT
// =============================================================================

/// Provider-neutral capability: messages in, completion text out.
/// Enables mocking in tests.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send the message list and return the first completion's text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] when the key is absent, the request fails,
    /// the provider rejects it, or the envelope carries no text.
    async fn generate(&self, messages: &[Message], params: &GenerationParams) -> Result<String, LlmError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Pull a human-readable message out of a provider error body.
///
/// Both providers use `{"error": {"message": ...}}`; some `OpenAI`-compatible
/// gateways send `{"error": "..."}` instead.
pub(crate) fn provider_error_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|root| {
        let error = root.get("error")?;
        error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .or_else(|| error.as_str())
            .map(str::to_owned)
    });
    match message {
        Some(m) if !m.trim().is_empty() => m,
        _ => format!("HTTP error! status: {status}"),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
