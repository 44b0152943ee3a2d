//! Application error taxonomy.
//!
//! DESIGN
//! ======
//! Every layer owns a `thiserror` enum. [`AppError`] folds them into the four
//! user-facing categories (validation, provider/transport, missing artifact,
//! auth) and tells the UI layer where to show each one via [`Surface`].
//! Nothing here retries; `retryable()` only tells the user whether resubmitting
//! the same prompt is worth it.

use crate::api::ApiError;
use crate::conversation::ConversationError;
use crate::generation::extract::ExtractError;
use crate::generation::prompt::PromptError;
use crate::llm::LlmError;
use crate::session::SessionError;
use crate::validate::ValidationError;

/// Stable machine-readable code plus retry hint for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Where the UI layer should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Next to the offending field; never blocks the view.
    Inline,
    /// Dismissible banner; the user may resubmit.
    Banner,
    /// Banner asking the user to rephrase rather than retry identically.
    RephraseBanner,
    /// Drop the session and go to the login flow.
    RedirectToLogin,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    MissingArtifact(#[from] ExtractError),

    #[error("not signed in: {0}")]
    Auth(String),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("generation cancelled")]
    Cancelled,
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Auth(message) => Self::Auth(message),
            other => Self::Api(other),
        }
    }
}

impl AppError {
    #[must_use]
    pub fn surface(&self) -> Surface {
        match self {
            Self::Validation(_) | Self::Prompt(PromptError::EmptyPrompt) => Surface::Inline,
            Self::Conversation(e) => match e {
                ConversationError::EmptyPrompt => Surface::Inline,
                ConversationError::Busy | ConversationError::UnknownTicket(_) => Surface::Banner,
            },
            Self::MissingArtifact(_) => Surface::RephraseBanner,
            Self::Auth(_) => Surface::RedirectToLogin,
            Self::Prompt(PromptError::ConsecutiveRoles { .. })
            | Self::Llm(_)
            | Self::Api(_)
            | Self::Session(_)
            | Self::Cancelled => Surface::Banner,
        }
    }
}

impl ErrorCode for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Prompt(e) => e.error_code(),
            Self::Conversation(e) => e.error_code(),
            Self::Llm(e) => e.error_code(),
            Self::MissingArtifact(e) => e.error_code(),
            Self::Auth(_) => "E_AUTH",
            Self::Api(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
            Self::Cancelled => "E_CANCELLED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::Api(e) => e.retryable(),
            Self::Cancelled => true,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
