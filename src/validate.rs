//! Client-side checks run before anything is saved or sent to the backend.
//!
//! These are UI heuristics, not a parser: they catch obviously wrong input
//! (empty name, prose instead of code, a missing default export) and say
//! nothing about whether the code actually compiles.

use std::sync::OnceLock;

use regex::Regex;

use crate::api::{ComponentDraft, Credentials, Registration};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Valid component code is required")]
    NotAComponent,

    #[error("Component must have default export")]
    MissingDefaultExport,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

impl crate::error::ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Required { .. } => "E_REQUIRED",
            Self::NotAComponent => "E_NOT_A_COMPONENT",
            Self::MissingDefaultExport => "E_MISSING_DEFAULT_EXPORT",
            Self::PasswordTooShort { .. } => "E_PASSWORD_TOO_SHORT",
            Self::InvalidEmail => "E_INVALID_EMAIL",
        }
    }
}

impl ValidationError {
    /// Form field the error belongs to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } => field,
            Self::NotAComponent | Self::MissingDefaultExport => "markup",
            Self::PasswordTooShort { .. } => "password",
            Self::InvalidEmail => "email",
        }
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

fn function_component() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bfunction(\s+([A-Z]\w*))?\s*\(").expect("function pattern"))
}

fn arrow_component() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:const|let|var)\s+([A-Z]\w*)\s*=\s*(?:\([^)]*\)|\w+)\s*=>").expect("arrow pattern")
    })
}

fn class_component() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bclass\s+([A-Z]\w*)\s+extends\s+(?:React\.)?(?:Pure)?Component\b").expect("class pattern")
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Name of the first component defined in `markup`, if any.
#[must_use]
pub fn defined_component(markup: &str) -> Option<String> {
    [function_component(), arrow_component(), class_component()]
        .iter()
        .filter_map(|re| re.captures(markup))
        .filter_map(|caps| caps.iter().skip(1).flatten().last().map(|m| m.as_str().to_string()))
        .find(|name| is_identifier(name))
}

// =============================================================================
// CHECKS
// =============================================================================

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(ValidationError::Required { field }) } else { Ok(()) }
}

/// Heuristic check that `markup` defines a component.
///
/// # Errors
///
/// [`ValidationError::NotAComponent`] when no function, arrow, class or
/// single-file-template definition is present, or a `function` component
/// never returns.
pub fn check_component_markup(markup: &str) -> Result<(), ValidationError> {
    required(markup, "markup")?;
    if markup.contains("<template") {
        return Ok(());
    }
    if function_component().is_match(markup) {
        return if markup.contains("return") { Ok(()) } else { Err(ValidationError::NotAComponent) };
    }
    if arrow_component().is_match(markup) || class_component().is_match(markup) {
        return Ok(());
    }
    Err(ValidationError::NotAComponent)
}

/// Everything a draft must satisfy before it is created or updated.
///
/// # Errors
///
/// The first failing check, in form order: name, markup, default export.
pub fn validate_draft(draft: &ComponentDraft) -> Result<(), ValidationError> {
    required(&draft.name, "name")?;
    check_component_markup(&draft.markup)?;
    if !draft.markup.contains("export default") {
        return Err(ValidationError::MissingDefaultExport);
    }
    Ok(())
}

/// Append `export default <Name>;` when the markup has no default export.
///
/// The exported name is the first component the markup defines, falling
/// back to `name`. Markup that already exports, or where no usable name
/// exists, is returned unchanged.
#[must_use]
pub fn ensure_default_export(markup: &str, name: &str) -> String {
    if markup.contains("export default") {
        return markup.to_string();
    }
    let export = defined_component(markup).or_else(|| is_identifier(name).then(|| name.to_string()));
    match export {
        Some(export) => format!("{}\n\nexport default {export};\n", markup.trim_end()),
        None => markup.to_string(),
    }
}

/// # Errors
///
/// Missing fields, an email without `@`, or a short password.
pub fn validate_registration(registration: &Registration) -> Result<(), ValidationError> {
    required(&registration.name, "name")?;
    validate_email(&registration.email)?;
    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }
    Ok(())
}

/// # Errors
///
/// Missing or malformed email, or missing password.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
    validate_email(&credentials.email)?;
    required(&credentials.password, "password")
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    required(email, "email")?;
    match email.trim().split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') && !domain.ends_with('.') => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
