//! Conversation state machine for the chat sidebar.
//!
//! DESIGN
//! ======
//! The log is append-only. Submitting appends the user turn and a `Pending`
//! assistant turn; the reply (or failure) is appended as a new turn that
//! `resolves` the pending one. Nothing is mutated in place, so a late reply
//! can never overwrite the wrong placeholder. [`Conversation::view`] renders
//! each pending turn as its resolution at the pending turn's position.
//!
//! States: `Idle -> AwaitingResponse -> Idle`, with the last outcome kept as
//! `Settled` or `Errored`. At most one submission is in flight.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::llm::Message;

pub type TurnId = u64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("prompt is required")]
    EmptyPrompt,

    #[error("a response is already pending")]
    Busy,

    #[error("no pending turn {0}")]
    UnknownTicket(TurnId),
}

impl crate::error::ErrorCode for ConversationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::Busy => "E_BUSY",
            Self::UnknownTicket(_) => "E_UNKNOWN_TICKET",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnBody {
    Pending,
    Settled(String),
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub id: TurnId,
    pub speaker: Speaker,
    pub body: TurnBody,
    pub timestamp_ms: i64,
    /// Set on a reply/error turn: the pending turn it resolves.
    pub resolves: Option<TurnId>,
}

impl Turn {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.body, TurnBody::Errored(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Settled,
    Errored,
}

/// Handed to the caller on submit; carries everything needed to call the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: TurnId,
    pub prompt: String,
    /// Settled exchanges before this submission, oldest first.
    pub context: Vec<Message>,
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    log: Vec<Turn>,
    next_id: TurnId,
    in_flight: Option<TurnId>,
    last_outcome: Option<Outcome>,
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        if self.in_flight.is_some() { Status::AwaitingResponse } else { Status::Idle }
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Whether the submit control is enabled for `draft`.
    #[must_use]
    pub fn can_submit(&self, draft: &str) -> bool {
        self.in_flight.is_none() && !draft.trim().is_empty()
    }

    /// The raw append-only log.
    #[must_use]
    pub fn log(&self) -> &[Turn] {
        &self.log
    }

    /// Start a new exchange.
    ///
    /// # Errors
    ///
    /// [`ConversationError::EmptyPrompt`] for a blank draft and
    /// [`ConversationError::Busy`] while a response is pending; neither
    /// changes any state.
    pub fn submit(&mut self, draft: &str) -> Result<Submission, ConversationError> {
        if draft.trim().is_empty() {
            return Err(ConversationError::EmptyPrompt);
        }
        if self.in_flight.is_some() {
            return Err(ConversationError::Busy);
        }

        let context = self.context();
        self.push(Speaker::User, TurnBody::Settled(draft.to_string()), None);
        let ticket = self.push(Speaker::Assistant, TurnBody::Pending, None);
        self.in_flight = Some(ticket);
        tracing::debug!(ticket, context_turns = context.len(), "conversation: awaiting response");

        Ok(Submission { ticket, prompt: draft.to_string(), context })
    }

    /// Resolve the pending turn with the assistant's reply.
    ///
    /// # Errors
    ///
    /// [`ConversationError::UnknownTicket`] if `ticket` is not the pending turn.
    pub fn settle(&mut self, ticket: TurnId, text: impl Into<String>) -> Result<(), ConversationError> {
        self.resolve(ticket, TurnBody::Settled(text.into()), Outcome::Settled)
    }

    /// Resolve the pending turn with an error message.
    ///
    /// # Errors
    ///
    /// [`ConversationError::UnknownTicket`] if `ticket` is not the pending turn.
    pub fn fail(&mut self, ticket: TurnId, message: impl Into<String>) -> Result<(), ConversationError> {
        self.resolve(ticket, TurnBody::Errored(message.into()), Outcome::Errored)
    }

    fn resolve(&mut self, ticket: TurnId, body: TurnBody, outcome: Outcome) -> Result<(), ConversationError> {
        if self.in_flight != Some(ticket) {
            return Err(ConversationError::UnknownTicket(ticket));
        }
        self.push(Speaker::Assistant, body, Some(ticket));
        self.in_flight = None;
        self.last_outcome = Some(outcome);
        tracing::debug!(ticket, ?outcome, "conversation: resolved");
        Ok(())
    }

    fn push(&mut self, speaker: Speaker, body: TurnBody, resolves: Option<TurnId>) -> TurnId {
        let id = self.next_id;
        self.next_id += 1;
        self.log.push(Turn { id, speaker, body, timestamp_ms: now_ms(), resolves });
        id
    }

    /// Rendered turns: each pending turn shows its resolution once one exists.
    #[must_use]
    pub fn view(&self) -> Vec<&Turn> {
        let resolutions: HashMap<TurnId, &Turn> = self
            .log
            .iter()
            .filter_map(|t| t.resolves.map(|id| (id, t)))
            .collect();
        self.log
            .iter()
            .filter(|t| t.resolves.is_none())
            .map(|t| match t.body {
                TurnBody::Pending => resolutions.get(&t.id).copied().unwrap_or(t),
                _ => t,
            })
            .collect()
    }

    /// Settled user/assistant exchanges as model messages. Errored and
    /// pending exchanges are left out.
    #[must_use]
    pub fn context(&self) -> Vec<Message> {
        let view = self.view();
        let mut out = Vec::new();
        for pair in view.windows(2) {
            if let (
                Turn { speaker: Speaker::User, body: TurnBody::Settled(prompt), .. },
                Turn { speaker: Speaker::Assistant, body: TurnBody::Settled(reply), .. },
            ) = (pair[0], pair[1])
            {
                out.push(Message::user(prompt.clone()));
                out.push(Message::assistant(reply.clone()));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
