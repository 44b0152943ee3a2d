//! Response extractor: structured artifacts out of a model completion.
//!
//! Two reply shapes: free text with fenced code blocks (chat), and a JSON
//! object (form generator). Every function here is pure.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::GenerationResponse;

pub const DEFAULT_COMPONENT_NAME: &str = "MyComponent";
pub const DEFAULT_EXPLANATION: &str = "Component generated successfully";
pub const STYLE_TAG: &str = "css";
const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The reply lacked usable component code.
    #[error("no {tag} code found in response; try rephrasing the request")]
    MissingArtifact { tag: String },

    /// A structured reply was not a JSON object.
    #[error("invalid AI response format: {0}")]
    InvalidFormat(String),
}

impl crate::error::ErrorCode for ExtractError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArtifact { .. } => "E_MISSING_ARTIFACT",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
        }
    }
}

/// Code pulled from a fenced-block reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub markup: String,
    /// Empty when the reply had no style block.
    pub style: String,
    /// Prose outside the fenced blocks.
    pub explanation: String,
}

// =============================================================================
// FENCED BLOCKS
// =============================================================================

/// Body of the first block fenced as ```` ```{tag} ````, trimmed.
///
/// Matching is non-greedy: the body ends at the next fence.
#[must_use]
pub fn extract_fenced(text: &str, tag: &str) -> Option<String> {
    let opener = format!("{FENCE}{tag}");
    let start = text.find(&opener)? + opener.len();
    let len = text[start..].find(FENCE)?;
    Some(text[start..start + len].trim().to_string())
}

/// Pull markup and style out of a chat completion.
///
/// # Errors
///
/// [`ExtractError::MissingArtifact`] when no non-blank `markup_tag` block exists.
/// A missing style block is not an error.
pub fn extract_artifacts(text: &str, markup_tag: &str) -> Result<Artifacts, ExtractError> {
    let markup = extract_fenced(text, markup_tag)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ExtractError::MissingArtifact { tag: markup_tag.to_string() })?;
    let style = extract_fenced(text, STYLE_TAG).unwrap_or_default();
    Ok(Artifacts { markup, style, explanation: strip_fences(text) })
}

fn fence_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[\s\S]*?```").expect("fence block pattern"))
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern"))
}

fn strip_fences(text: &str) -> String {
    let prose = fence_block_re().replace_all(text, "");
    blank_run_re().replace_all(prose.trim(), "\n\n").into_owned()
}

// =============================================================================
// STRUCTURED (JSON) REPLIES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeneration {
    #[serde(default)]
    component_name: Option<String>,
    #[serde(default)]
    jsx: Option<String>,
    #[serde(default)]
    css: Option<String>,
    #[serde(default)]
    tests: Option<String>,
    #[serde(default)]
    storybook: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Read a JSON-object reply field by field, applying defaults.
///
/// Models in JSON mode sometimes still wrap the object in a ```` ```json ````
/// fence; that wrapper is tolerated.
///
/// # Errors
///
/// [`ExtractError::InvalidFormat`] when neither the text nor a `json` block
/// parses as an object; [`ExtractError::MissingArtifact`] when `jsx` is
/// absent or blank.
pub fn parse_structured(text: &str) -> Result<GenerationResponse, ExtractError> {
    let raw: RawGeneration = match serde_json::from_str(text.trim()) {
        Ok(raw) => raw,
        Err(first) => extract_fenced(text, "json")
            .and_then(|body| serde_json::from_str(&body).ok())
            .ok_or_else(|| ExtractError::InvalidFormat(first.to_string()))?,
    };

    let markup = non_blank(raw.jsx).ok_or_else(|| ExtractError::MissingArtifact { tag: "jsx".to_string() })?;

    Ok(GenerationResponse {
        component_name: non_blank(raw.component_name).unwrap_or_else(|| DEFAULT_COMPONENT_NAME.to_string()),
        markup,
        style: raw.css.unwrap_or_default(),
        tests: non_blank(raw.tests),
        story: non_blank(raw.storybook),
        explanation: non_blank(raw.explanation).unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
    })
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
