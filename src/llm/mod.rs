//! LLM: multi-provider adapter for component generation.
//!
//! DESIGN
//! ======
//! One capability, [`ModelProvider`], with two concrete adapters behind it:
//! Gemini (`candidates[0].content.parts[0].text`) and OpenAI-compatible chat
//! completions (`choices[0].message.content`). [`LlmClient`] picks one from
//! `LLM_PROVIDER` so call sites never branch on provider shape.

pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use config::{API_KEY_VAR, LlmConfig, LlmProviderKind};
pub use types::{GenerationParams, LlmError, Message, ModelProvider, Role};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either Gemini or `OpenAI`.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: Option<LlmProvider>,
    model: String,
    provider: LlmProviderKind,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider name is unknown or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// A missing API key is not an error here; it is reported by
    /// [`ModelProvider::generate`] so the rest of the application still starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = match config.api_key {
            None => None,
            Some(api_key) => Some(match config.provider {
                LlmProviderKind::Gemini => {
                    LlmProvider::Gemini(gemini::GeminiClient::new(api_key, &config.base_url, config.timeouts)?)
                }
                LlmProviderKind::OpenAi => {
                    LlmProvider::OpenAi(openai::OpenAiClient::new(api_key, &config.base_url, config.timeouts)?)
                }
            }),
        };
        Ok(Self { inner, model, provider: config.provider })
    }

    #[must_use]
    pub fn provider(&self) -> LlmProviderKind {
        self.provider
    }

    /// `false` when no API key was configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

#[async_trait::async_trait]
impl ModelProvider for LlmClient {
    async fn generate(&self, messages: &[Message], params: &GenerationParams) -> Result<String, LlmError> {
        let Some(inner) = &self.inner else {
            return Err(LlmError::MissingApiKey { var: API_KEY_VAR.into() });
        };
        match inner {
            LlmProvider::Gemini(c) => c.generate(&self.model, messages, params).await,
            LlmProvider::OpenAi(c) => c.generate(&self.model, messages, params).await,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
