//! OpenAI-compatible chat completions client.
//!
//! Targets `{base}/chat/completions`, which `OpenAI`, `OpenRouter` and most
//! self-hosted gateways accept. Forced-JSON mode maps to
//! `response_format: {"type": "json_object"}`.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{GenerationParams, LlmError, Message, provider_error_message};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
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
        let msgs = build_messages(messages);
        let body = CcRequest {
            model,
            messages: &msgs,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            response_format: params.json_response.then_some(ResponseFormat { format_type: "json_object" }),
        };
        let text = self.send_json("/chat/completions", &body).await?;
        parse_chat_completions_response(&text)
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(url).json(body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        tracing::debug!(path, "openai: sending request");
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
            tracing::warn!(status, %message, "openai: request rejected");
            return Err(LlmError::Provider { status, message });
        }
        Ok(text)
    }
}

// =============================================================================
// CHAT COMPLETIONS: wire types
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    messages: &'a [CcMessage<'a>],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CcMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

pub(crate) fn build_messages(messages: &[Message]) -> Vec<CcMessage<'_>> {
    messages
        .iter()
        .map(|m| CcMessage { role: m.role.as_str(), content: &m.text })
        .collect()
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Extract `choices[0].message.content`.
pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::EmptyCompletion);
    };

    if choice.get("finish_reason").and_then(Value::as_str) == Some("length") {
        tracing::warn!("openai: completion truncated at max_tokens");
    }

    match choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::EmptyCompletion),
    }
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
