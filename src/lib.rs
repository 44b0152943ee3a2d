//! AI component generator.
//!
//! Turns natural-language prompts into UI component source (markup, style,
//! optional tests and stories) through a remote LLM, keeps a chat-style
//! conversation for iterative refinement, and stores components in a
//! token-authenticated backend.

pub mod api;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod generation;
pub mod llm;
pub mod preview;
pub mod session;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::AppContext;
pub use error::{AppError, ErrorCode, Surface};
