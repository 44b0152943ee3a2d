//! Prompt builder: instruction text and role-tagged message lists.
//!
//! DESIGN
//! ======
//! Two request shapes exist. The chat sidebar asks for fenced code blocks
//! and replays prior turns; the providers used there take no system role,
//! so the instruction rides on the first user turn. The form generator asks
//! for a single JSON object and sends a plain `[system, user]` pair.
//!
//! Providers reject back-to-back turns of one role. Replayed context can
//! still contain them (or end on a user turn before the new prompt is
//! appended), so every chat payload passes through a [`SameRolePolicy`].

use std::fmt::Write;

use super::config::{Feature, GenerationConfig, Preset};
use crate::llm::{Message, Role};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("prompt is required")]
    EmptyPrompt,

    #[error("consecutive {role} turns at position {index}")]
    ConsecutiveRoles { index: usize, role: Role },
}

impl crate::error::ErrorCode for PromptError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::ConsecutiveRoles { .. } => "E_CONSECUTIVE_ROLES",
        }
    }
}

/// What to do when two adjacent turns share a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SameRolePolicy {
    /// Join adjacent same-role turns with a blank line.
    #[default]
    Merge,
    /// Refuse to build the payload.
    Reject,
}

/// Markup/style already in the editor; switches the user prompt to refine mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingSource {
    pub markup: String,
    pub style: String,
}

impl ExistingSource {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markup.trim().is_empty() && self.style.trim().is_empty()
    }
}

/// Canned prompt offered next to the chat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction { label: "Button", prompt: "Create a reusable button component with hover effects" },
    QuickAction { label: "Card", prompt: "Generate a responsive card component with image placeholder" },
    QuickAction { label: "Modal", prompt: "Build an accessible modal dialog with overlay" },
];

// =============================================================================
// INSTRUCTIONS
// =============================================================================

/// Instruction for free-text replies carrying fenced code blocks.
#[must_use]
pub fn chat_instruction(preset: Preset) -> String {
    let tag = preset.markup_tag();
    let code = match preset {
        Preset::React | Preset::Mui => "JSX",
        Preset::Vue => "Vue single-file component",
    };
    format!(
        "You are an expert {} component generator. Return:\n\
         1. {code} code in ```{tag} blocks\n\
         2. CSS in ```css blocks\n\
         3. Brief explanation in markdown",
        preset.framework()
    )
}

/// Instruction for the form generator, which expects one JSON object back.
#[must_use]
pub fn form_instruction(config: &GenerationConfig) -> String {
    let typing = if config.wants(Feature::TypeScript) {
        "Use TypeScript"
    } else {
        match config.preset {
            Preset::Vue => "Declare props with defineProps",
            Preset::React | Preset::Mui => "Use PropTypes",
        }
    };

    let mut rules = vec![
        "Generate clean, production-ready code".to_string(),
        format!("Use {} best practices", config.preset.best_practices()),
        typing.to_string(),
        format!("Style with {}", config.style_method),
        "Make components accessible (a11y compliant)".to_string(),
        "Add JSDoc comments".to_string(),
    ];
    if config.wants(Feature::Tests) {
        rules.push("Include unit test boilerplate".to_string());
    }
    if config.wants(Feature::Storybook) {
        rules.push("Generate Storybook stories".to_string());
    }

    let mut out = format!("You are an expert {} component generator. Rules:", config.preset.framework());
    for (i, rule) in rules.iter().enumerate() {
        let _ = write!(out, "\n{}. {rule}", i + 1);
    }

    out.push_str("\n\nResponse MUST be JSON with these fields:");
    out.push_str("\n- componentName: \"PascalCaseName\"");
    out.push_str("\n- jsx: \"component code\"");
    out.push_str("\n- css: \"styles code\"");
    if config.wants(Feature::Tests) {
        out.push_str("\n- tests: \"test code\"");
    }
    if config.wants(Feature::Storybook) {
        out.push_str("\n- storybook: \"story code\"");
    }
    out.push_str("\n- explanation: \"brief description\"");
    out
}

/// User turn for the form generator: create-new or refine-existing wording.
#[must_use]
pub fn user_prompt(prompt: &str, existing: Option<&ExistingSource>) -> String {
    match existing {
        Some(src) if !src.is_empty() => format!(
            "Refine this component based on: \"{prompt}\"\n\nCurrent JSX:\n{}\n\nCurrent CSS:\n{}",
            src.markup, src.style
        ),
        _ => format!("Create new component with: \"{prompt}\""),
    }
}

// =============================================================================
// MESSAGE LISTS
// =============================================================================

/// Build the chat payload from replayed context and a new prompt.
///
/// - Empty context: one user turn, `instruction + "\n\n" + prompt`.
/// - Context opening on a user turn: instruction prepended to that turn.
/// - Context opening on an assistant turn: a synthetic leading user turn
///   holding only the instruction.
/// - System entries in the context are dropped.
/// - The prompt is always the final user turn, then `policy` is applied.
///
/// # Errors
///
/// [`PromptError::EmptyPrompt`] for a blank prompt;
/// [`PromptError::ConsecutiveRoles`] under [`SameRolePolicy::Reject`].
pub fn build_chat_messages(
    instruction: &str,
    context: &[Message],
    prompt: &str,
    policy: SameRolePolicy,
) -> Result<Vec<Message>, PromptError> {
    if prompt.trim().is_empty() {
        return Err(PromptError::EmptyPrompt);
    }

    let replay: Vec<&Message> = context.iter().filter(|m| m.role != Role::System).collect();
    let Some((first, rest)) = replay.split_first() else {
        return Ok(vec![Message::user(format!("{instruction}\n\n{prompt}"))]);
    };

    let mut out = Vec::with_capacity(replay.len() + 2);
    if first.role == Role::User {
        out.push(Message::user(format!("{instruction}\n\n{}", first.text)));
    } else {
        out.push(Message::user(instruction));
        out.push((*first).clone());
    }
    out.extend(rest.iter().map(|m| (*m).clone()));
    out.push(Message::user(prompt));

    apply_policy(out, policy)
}

/// Build the form generator payload: `[system, user]`.
///
/// # Errors
///
/// [`PromptError::EmptyPrompt`] for a blank prompt.
pub fn build_form_messages(
    config: &GenerationConfig,
    prompt: &str,
    existing: Option<&ExistingSource>,
) -> Result<Vec<Message>, PromptError> {
    if prompt.trim().is_empty() {
        return Err(PromptError::EmptyPrompt);
    }
    Ok(vec![Message::system(form_instruction(config)), Message::user(user_prompt(prompt, existing))])
}

fn apply_policy(messages: Vec<Message>, policy: SameRolePolicy) -> Result<Vec<Message>, PromptError> {
    match policy {
        SameRolePolicy::Reject => {
            if let Some(index) = (1..messages.len()).find(|&i| messages[i].role == messages[i - 1].role) {
                return Err(PromptError::ConsecutiveRoles { index, role: messages[index].role });
            }
            Ok(messages)
        }
        SameRolePolicy::Merge => {
            let mut out: Vec<Message> = Vec::with_capacity(messages.len());
            for message in messages {
                match out.last_mut() {
                    Some(prev) if prev.role == message.role => {
                        tracing::debug!(role = %message.role, "prompt: merging consecutive turns");
                        prev.text.push_str("\n\n");
                        prev.text.push_str(&message.text);
                    }
                    _ => out.push(message),
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
