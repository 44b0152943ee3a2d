//! Application configuration (backend endpoint, session location).
//!
//! Model provider settings live in [`crate::llm::config::LlmConfig`].

use std::path::PathBuf;

use crate::api::{ApiConfig, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::llm::LlmError;
use crate::llm::config::LlmConfig;

const SESSION_DIR: &str = "compgen";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session_file: PathBuf,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// - `COMPGEN_API_URL`: backend API root
    /// - `COMPGEN_SESSION_FILE`: session store path (default under the user config dir)
    /// - `COMPGEN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `COMPGEN_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LLM_*`: see [`LlmConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] for an unknown provider name.
    pub fn from_env() -> Result<Self, LlmError> {
        let llm = LlmConfig::from_env()?;
        Ok(Self::from_lookup(|key| std::env::var(key).ok(), llm))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>, llm: LlmConfig) -> Self {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |key: &str, default: u64| non_blank(key).and_then(|v| v.parse().ok()).unwrap_or(default);

        let api = ApiConfig {
            base_url: non_blank("COMPGEN_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout_secs: secs("COMPGEN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: secs("COMPGEN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let session_file = non_blank("COMPGEN_SESSION_FILE").map_or_else(default_session_file, PathBuf::from);

        Self { api, session_file, llm }
    }
}

/// `<config dir>/compgen/session.json`, or the working directory when the
/// platform has no config dir.
#[must_use]
pub fn default_session_file() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(format!(".{SESSION_DIR}")).join(SESSION_FILE),
        |dir| dir.join(SESSION_DIR).join(SESSION_FILE),
    )
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
