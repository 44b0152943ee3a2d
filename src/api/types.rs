//! Backend wire types (components, versions, auth).
//!
//! Field names follow the backend's JSON (`_id`, `jsxCode`, `cssCode`, ...);
//! Rust names follow this crate's vocabulary (markup, style, story).

use serde::{Deserialize, Serialize};

// =============================================================================
// COMPONENTS
// =============================================================================

/// Client-side copy of a component while it is being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDraft {
    pub name: String,
    #[serde(rename = "jsxCode")]
    pub markup: String,
    #[serde(rename = "cssCode", default)]
    pub style: String,
    #[serde(rename = "testCode", default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
    #[serde(rename = "storybookCode", default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(rename = "prompt", default)]
    pub origin_prompt: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A persisted component as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "jsxCode", default)]
    pub markup: String,
    #[serde(rename = "cssCode", default)]
    pub style: String,
    #[serde(rename = "testCode", default)]
    pub tests: Option<String>,
    #[serde(rename = "storybookCode", default)]
    pub story: Option<String>,
    #[serde(rename = "prompt", default)]
    pub origin_prompt: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl ComponentRecord {
    /// Editable copy of this record.
    #[must_use]
    pub fn to_draft(&self) -> ComponentDraft {
        ComponentDraft {
            name: self.name.clone(),
            markup: self.markup.clone(),
            style: self.style.clone(),
            tests: self.tests.clone(),
            story: self.story.clone(),
            origin_prompt: self.origin_prompt.clone(),
            kind: self.kind.clone(),
        }
    }
}

/// One stored revision of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersion {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(rename = "jsxCode", default)]
    pub markup: String,
    #[serde(rename = "cssCode", default)]
    pub style: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// Filters for the component list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    /// Sent as `type`; empty means all types.
    pub kind: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10, search: String::new(), kind: String::new() }
    }
}

impl ListQuery {
    pub(crate) fn to_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("search", self.search.clone()),
            ("type", self.kind.clone()),
        ]
    }
}

/// One page of the component list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentPage {
    pub components: Vec<ComponentRecord>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

/// Kinds the dashboard keeps a running count of.
pub const SUMMARY_KINDS: [&str; 3] = ["button", "card", "modal"];

impl ComponentPage {
    #[must_use]
    pub fn count_by_kind(&self, kind: &str) -> usize {
        self.components
            .iter()
            .filter(|c| c.kind.as_deref() == Some(kind))
            .count()
    }

    /// Per-kind counts for [`SUMMARY_KINDS`] on this page.
    #[must_use]
    pub fn kind_summary(&self) -> Vec<(&'static str, usize)> {
        SUMMARY_KINDS.iter().map(|&kind| (kind, self.count_by_kind(kind))).collect()
    }
}

/// The list endpoint answers with either a paged envelope or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse {
    Paged {
        components: Vec<ComponentRecord>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        pages: Option<u32>,
    },
    Bare(Vec<ComponentRecord>),
}

impl ListResponse {
    pub(crate) fn into_page(self, query: &ListQuery) -> ComponentPage {
        match self {
            Self::Paged { components, total, page, pages } => {
                let total = total.unwrap_or(components.len() as u64);
                ComponentPage { components, total, page: page.unwrap_or(query.page), pages: pages.unwrap_or(1) }
            }
            Self::Bare(components) => {
                ComponentPage { total: components.len() as u64, components, page: query.page, pages: 1 }
            }
        }
    }
}

/// Downloaded export archive or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBlob {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of a successful `/auth/login` (and usually `/auth/register`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(alias = "username", default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
