//! Backend HTTP client.
//!
//! DESIGN
//! ======
//! One [`BackendClient`] holds a shared `reqwest::Client` and the API root.
//! Component operations live in `components.rs`, auth in `auth.rs`; both are
//! `impl BackendClient` blocks over the same private `send` helper, which
//! attaches the bearer token and maps status codes onto [`ApiError`].
//!
//! SYSTEM CONTEXT
//! ==============
//! 401 and 403 become [`ApiError::Auth`]; the application layer drops the
//! stored session when it sees one. No call is retried here.

mod auth;
mod components;
pub mod types;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;

pub use types::{
    ComponentDraft, ComponentPage, ComponentRecord, ComponentVersion, Credentials, ExportedBlob, ListQuery,
    LoginResponse, Registration,
};

pub const DEFAULT_API_URL: &str = "https://acciojob-backend-7xqz.onrender.com/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, expired or rejected credentials.
    #[error("{0}")]
    Auth(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "E_AUTH",
            Self::Status { .. } => "E_BACKEND_STATUS",
            Self::Transport(_) => "E_BACKEND_TRANSPORT",
            Self::Decode(_) => "E_BACKEND_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend cannot start.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut request = self.http.request(method, endpoint(&self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Send and return the successful response; non-2xx maps onto [`ApiError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = backend_message(status, &body);
        tracing::warn!(status, %message, "api: request rejected");
        Err(status_error(status, message))
    }

    async fn send_json<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// The backend reports failures as `{"message": "..."}`; fall back to the
/// status line when the body carries nothing usable.
pub(crate) fn backend_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {status}"))
}

pub(crate) fn status_error(status: u16, message: String) -> ApiError {
    match status {
        401 | 403 => ApiError::Auth(message),
        _ => ApiError::Status { status, message },
    }
}

/// Pull the filename out of a `Content-Disposition` header.
pub(crate) fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = value.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
