//! Generation service: prompt → provider → extraction.
//!
//! DESIGN
//! ======
//! [`Generator`] owns an `Arc<dyn ModelProvider>` so tests swap in a canned
//! provider. Each call is one provider round trip; nothing here retries.
//!
//! [`Generator::run_turn`] drives a [`Conversation`] through one exchange.
//! The provider call races a `CancellationToken`; whichever finishes first
//! resolves the pending turn, so the conversation never stays busy after the
//! caller gives up.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::config::Preset;
use super::extract::{Artifacts, extract_artifacts, parse_structured};
use super::prompt::{SameRolePolicy, build_chat_messages, build_form_messages, chat_instruction};
use super::{GenerationRequest, GenerationResponse};
use crate::conversation::Conversation;
use crate::error::AppError;
use crate::llm::{GenerationParams, Message, ModelProvider};

/// Message recorded on a turn whose generation was cancelled.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// Extracted chat reply plus the completion it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub markup: String,
    pub style: String,
    pub explanation: String,
    pub raw: String,
}

impl ChatReply {
    fn new(artifacts: Artifacts, raw: String) -> Self {
        Self { markup: artifacts.markup, style: artifacts.style, explanation: artifacts.explanation, raw }
    }
}

pub struct Generator {
    provider: Arc<dyn ModelProvider>,
    params: GenerationParams,
    policy: SameRolePolicy,
}

impl Generator {
    #[must_use]
    pub fn new(provider: Arc<dyn ModelProvider>, params: GenerationParams) -> Self {
        Self { provider, params, policy: SameRolePolicy::default() }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SameRolePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// One chat exchange: replay `context`, send `prompt`, extract code blocks.
    ///
    /// # Errors
    ///
    /// Prompt errors, provider errors, or a missing markup block.
    pub async fn chat(&self, context: &[Message], prompt: &str, preset: Preset) -> Result<ChatReply, AppError> {
        let messages = build_chat_messages(&chat_instruction(preset), context, prompt, self.policy)?;
        tracing::info!(
            model = self.provider.model(),
            preset = %preset,
            turns = messages.len(),
            "generation: chat request"
        );

        let raw = self.provider.generate(&messages, &self.params).await?;
        let artifacts = extract_artifacts(&raw, preset.markup_tag())?;
        tracing::debug!(markup_len = artifacts.markup.len(), style_len = artifacts.style.len(), "generation: chat reply");
        Ok(ChatReply::new(artifacts, raw))
    }

    /// Form generation with a forced-JSON reply.
    ///
    /// # Errors
    ///
    /// Prompt errors, provider errors, or an unusable JSON reply.
    pub async fn generate_component(&self, request: &GenerationRequest) -> Result<GenerationResponse, AppError> {
        let messages = build_form_messages(&request.config, &request.prompt, request.existing.as_ref())?;
        let params = self.params.with_json_response();
        tracing::info!(
            model = self.provider.model(),
            preset = %request.config.preset,
            style = %request.config.style_method,
            refine = request.existing.is_some(),
            "generation: form request"
        );

        let raw = self.provider.generate(&messages, &params).await?;
        let response = parse_structured(&raw)?;
        tracing::info!(component = %response.component_name, "generation: component generated");
        Ok(response)
    }

    /// Drive one conversation exchange to a settled or errored turn.
    ///
    /// The reply's raw completion becomes the assistant turn, so later
    /// turns replay exactly what the model said.
    ///
    /// # Errors
    ///
    /// Submission errors leave the conversation untouched. Every other error
    /// is also recorded on the conversation as an errored turn.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        prompt: &str,
        preset: Preset,
        cancel: &CancellationToken,
    ) -> Result<ChatReply, AppError> {
        let submission = conversation.submit(prompt)?;

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AppError::Cancelled),
            result = self.chat(&submission.context, &submission.prompt, preset) => result,
        };

        match result {
            Ok(reply) => {
                conversation.settle(submission.ticket, reply.raw.clone())?;
                Ok(reply)
            }
            Err(err) => {
                let message = match &err {
                    AppError::Cancelled => CANCELLED_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                tracing::warn!(ticket = submission.ticket, error = %message, "generation: turn failed");
                conversation.fail(submission.ticket, message)?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
