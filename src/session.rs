//! Persisted auth session.
//!
//! DESIGN
//! ======
//! The session lives in a small JSON file whose top-level object holds one
//! well-known key, `user`, carrying the login response (id, name, email,
//! token). An absent file, an absent key or a blank token all mean
//! "signed out"; none of them is an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::LoginResponse;

/// Storage key holding the signed-in user.
pub const SESSION_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl crate::error::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_SESSION_IO",
            Self::Corrupt { .. } => "E_SESSION_CORRUPT",
        }
    }
}

/// Authenticated user plus bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", default)]
    pub user_id: String,
    #[serde(rename = "name", alias = "username", default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "token", default)]
    pub auth_token: String,
}

impl Session {
    /// Session from a login response; `None` without a usable token.
    #[must_use]
    pub fn from_login(response: LoginResponse) -> Option<Self> {
        let token = response.token.filter(|t| !t.trim().is_empty())?;
        Some(Self { user_id: response.id, display_name: response.name, email: response.email, auth_token: token })
    }
}

/// File-backed session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hydrate the stored session.
    ///
    /// # Errors
    ///
    /// I/O failures other than "not found", or a file that is not a JSON object.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let Some(doc) = self.read_document()? else {
            return Ok(None);
        };
        let Some(user) = doc.get(SESSION_KEY) else {
            return Ok(None);
        };
        let session: Session = serde_json::from_value(user.clone()).map_err(|e| self.corrupt(e))?;
        if session.auth_token.trim().is_empty() {
            tracing::debug!(path = %self.path.display(), "session: stored user has no token");
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Persist `session` under the session key, keeping any other keys.
    ///
    /// # Errors
    ///
    /// Directory creation or write failures.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut doc = self.read_document().unwrap_or_default().unwrap_or_default();
        let user = serde_json::to_value(session).map_err(|e| self.corrupt(e))?;
        doc.insert(SESSION_KEY.to_string(), user);
        self.write_document(&doc)?;
        tracing::info!(path = %self.path.display(), user = %session.display_name, "session: saved");
        Ok(())
    }

    /// Drop the stored session. Clearing an absent session is a no-op.
    ///
    /// # Errors
    ///
    /// I/O failures while removing or rewriting the file.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut doc = match self.read_document() {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(()),
            // An unreadable document cannot hold a usable session either.
            Err(SessionError::Corrupt { .. }) => Map::new(),
            Err(e) => return Err(e),
        };
        if doc.remove(SESSION_KEY).is_none() && !doc.is_empty() {
            return Ok(());
        }
        if doc.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(self.io(source)),
            }
        } else {
            self.write_document(&doc)?;
        }
        tracing::info!(path = %self.path.display(), "session: cleared");
        Ok(())
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>, SessionError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io(source)),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&text).map_err(|e| self.corrupt(e))? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(SessionError::Corrupt { path: self.path.clone(), message: "expected a JSON object".into() }),
        }
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        let text = serde_json::to_string_pretty(doc).map_err(|e| self.corrupt(e))?;
        std::fs::write(&self.path, text).map_err(|e| self.io(e))
    }

    fn io(&self, source: std::io::Error) -> SessionError {
        SessionError::Io { path: self.path.clone(), source }
    }

    fn corrupt(&self, e: serde_json::Error) -> SessionError {
        SessionError::Corrupt { path: self.path.clone(), message: e.to_string() }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
