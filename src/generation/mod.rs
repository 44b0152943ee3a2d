//! Component generation: prompt building, model invocation, artifact extraction.
//!
//! DESIGN
//! ======
//! Two call paths share the same provider:
//! - chat: free-text replies with fenced ```` ```jsx ```` / ```` ```css ````
//!   blocks, replayed conversation context, [`extract::extract_artifacts`].
//! - form: a `[system, user]` pair, forced-JSON replies, [`extract::parse_structured`].
//!
//! [`service::Generator`] wires them to a [`crate::llm::ModelProvider`].

pub mod config;
pub mod extract;
pub mod prompt;
pub mod service;

use crate::api::ComponentDraft;

use config::GenerationConfig;
use prompt::ExistingSource;

/// Input to the form generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub config: GenerationConfig,
    /// Present when refining a component that is already in the editor.
    pub existing: Option<ExistingSource>,
}

/// Structured result of a form generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    pub component_name: String,
    pub markup: String,
    pub style: String,
    pub tests: Option<String>,
    pub story: Option<String>,
    pub explanation: String,
}

impl GenerationResponse {
    /// Seed an editor draft from this generation.
    #[must_use]
    pub fn into_draft(self, prompt: &str) -> ComponentDraft {
        ComponentDraft {
            name: self.component_name,
            markup: self.markup,
            style: self.style,
            tests: self.tests,
            story: self.story,
            origin_prompt: prompt.to_string(),
            kind: None,
        }
    }
}
