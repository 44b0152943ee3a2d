//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper for `/models/{model}:generateContent`. Request building
//! and response parsing are pure functions for testability.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{GenerationParams, LlmError, Message, Role, provider_error_message};

// =============================================================================
// CLIENT
// =============================================================================

/// Header carrying the API key, so it never appears in a URL.
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<String, LlmError> {
        let body = build_request(messages, params);
        let url = endpoint(&self.base_url, model);

        let mut request = self.http.post(url).json(&body);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        tracing::debug!(model, turns = body.contents.len(), "gemini: sending request");
        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.without_url().to_string()))?;

        if !(200..300).contains(&status) {
            let message = provider_error_message(status, &text);
            tracing::warn!(status, %message, "gemini: request rejected");
            return Err(LlmError::Provider { status, message });
        }

        parse_response(&text)
    }
}

pub(crate) fn endpoint(base_url: &str, model: &str) -> String {
    format!("{}/models/{model}:generateContent", base_url.trim_end_matches('/'))
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest {
    pub(crate) contents: Vec<ApiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub(crate) system_instruction: Option<ApiContent>,
    #[serde(rename = "generationConfig")]
    pub(crate) generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<&'static str>,
    pub(crate) parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiPart {
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    }
}

/// Map provider-neutral messages onto a Gemini request.
///
/// System messages are folded into `systemInstruction`; Gemini has no
/// system role inside `contents`.
pub(crate) fn build_request(messages: &[Message], params: &GenerationParams) -> ApiRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();
    for message in messages {
        if message.role == Role::System {
            system_parts.push(ApiPart { text: message.text.clone() });
            continue;
        }
        contents.push(ApiContent {
            role: Some(gemini_role(message.role)),
            parts: vec![ApiPart { text: message.text.clone() }],
        });
    }
    let system_instruction =
        if system_parts.is_empty() { None } else { Some(ApiContent { role: None, parts: system_parts }) };

    ApiRequest {
        contents,
        system_instruction,
        generation_config: ApiGenerationConfig {
            temperature: params.temperature,
            max_output_tokens: params.max_tokens,
            response_mime_type: params.json_response.then_some("application/json"),
        },
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract `candidates[0].content.parts[0].text`.
pub(crate) fn parse_response(json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let text = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str);

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => Err(LlmError::EmptyCompletion),
    }
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
