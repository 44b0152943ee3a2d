//! Explicit application context.
//!
//! DESIGN
//! ======
//! Everything a command needs (backend client, session store, current
//! session, generator) travels in one [`AppContext`] value handed to each
//! operation. There are no process-wide globals.
//!
//! Lifecycle: [`AppContext::start`] hydrates the stored session, `login`
//! replaces it, `logout` drops it. Any backend call answered with 401/403
//! drops the local session too, so the next command starts signed out.

use std::sync::Arc;

use crate::api::{
    ApiError, BackendClient, ComponentDraft, ComponentPage, ComponentRecord, ComponentVersion, Credentials,
    ExportedBlob, ListQuery, LoginResponse, Registration,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::generation::service::Generator;
use crate::llm::LlmClient;
use crate::session::{Session, SessionStore};
use crate::validate::{validate_credentials, validate_draft, validate_registration};

pub const SIGNED_OUT_MESSAGE: &str = "please log in first";

pub struct AppContext {
    config: AppConfig,
    backend: BackendClient,
    store: SessionStore,
    session: Option<Session>,
    generator: Generator,
}

impl AppContext {
    /// Build the context and hydrate any stored session.
    ///
    /// An unreadable session file is logged and treated as signed out.
    ///
    /// # Errors
    ///
    /// HTTP client construction failures.
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        let backend = BackendClient::new(&config.api)?;
        let llm = LlmClient::from_config(config.llm.clone())?;
        tracing::info!(provider = ?llm.provider(), model = %config.llm.model, "context: llm client ready");
        if !llm.is_configured() {
            tracing::warn!("context: no LLM API key configured; generation will fail until one is set");
        }
        let generator = Generator::new(Arc::new(llm), config.llm.params);
        let store = SessionStore::new(config.session_file.clone());
        Ok(Self::from_parts(config, backend, store, generator))
    }

    /// Assemble a context from prebuilt parts.
    #[must_use]
    pub fn from_parts(config: AppConfig, backend: BackendClient, store: SessionStore, generator: Generator) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "context: ignoring unreadable session");
                None
            }
        };
        if let Some(s) = &session {
            tracing::debug!(user = %s.display_name, path = %store.path().display(), "context: session restored");
        }
        Self { config, backend, store, session, generator }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// # Errors
    ///
    /// [`AppError::Auth`] when nobody is signed in.
    pub fn require_session(&self) -> Result<&Session, AppError> {
        self.session.as_ref().ok_or_else(|| AppError::Auth(SIGNED_OUT_MESSAGE.into()))
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Sign in and persist the new session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Validation, backend, or session store failures.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Session, AppError> {
        validate_credentials(credentials)?;
        let response = self.backend.login(credentials).await?;
        let session = Session::from_login(response).ok_or_else(|| AppError::Auth("login returned no token".into()))?;
        self.store.save(&session)?;
        tracing::info!(user = %session.display_name, "context: signed in");
        Ok(self.session.insert(session))
    }

    /// Create an account. The caller signs in separately.
    ///
    /// # Errors
    ///
    /// Validation or backend failures.
    pub async fn register(&self, registration: &Registration) -> Result<LoginResponse, AppError> {
        validate_registration(registration)?;
        Ok(self.backend.register(registration).await?)
    }

    /// Drop the session locally; the backend keeps no session state.
    ///
    /// # Errors
    ///
    /// Session store failures. The in-memory session is dropped regardless.
    pub fn logout(&mut self) -> Result<(), AppError> {
        self.session = None;
        self.store.clear()?;
        tracing::info!("context: signed out");
        Ok(())
    }

    /// Map a backend result, dropping the session on an auth rejection.
    fn guard<T>(&mut self, result: Result<T, ApiError>) -> Result<T, AppError> {
        match result {
            Err(ApiError::Auth(message)) => {
                tracing::warn!(%message, "context: backend rejected session");
                if let Err(e) = self.logout() {
                    tracing::warn!(error = %e, "context: failed to clear rejected session");
                }
                Err(AppError::Auth(message))
            }
            other => other.map_err(AppError::from),
        }
    }

    fn token(&self) -> Result<String, AppError> {
        Ok(self.require_session()?.auth_token.clone())
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Validate, then create (`id` is `None`) or update the component.
    ///
    /// # Errors
    ///
    /// Validation failures are reported before any network call.
    pub async fn save_component(&mut self, id: Option<&str>, draft: &ComponentDraft) -> Result<ComponentRecord, AppError> {
        validate_draft(draft)?;
        let token = self.token()?;
        let result = match id {
            Some(id) => self.backend.update_component(&token, id, draft).await,
            None => self.backend.create_component(&token, draft).await,
        };
        self.guard(result)
    }

    pub async fn list_components(&mut self, query: &ListQuery) -> Result<ComponentPage, AppError> {
        let token = self.token()?;
        let result = self.backend.list_components(&token, query).await;
        self.guard(result)
    }

    pub async fn get_component(&mut self, id: &str, code_only: bool) -> Result<ComponentRecord, AppError> {
        let token = self.token()?;
        let result = self.backend.get_component(&token, id, code_only).await;
        self.guard(result)
    }

    pub async fn component_versions(&mut self, id: &str) -> Result<Vec<ComponentVersion>, AppError> {
        let token = self.token()?;
        let result = self.backend.component_versions(&token, id).await;
        self.guard(result)
    }

    pub async fn delete_component(&mut self, id: &str) -> Result<(), AppError> {
        let token = self.token()?;
        let result = self.backend.delete_component(&token, id).await;
        self.guard(result)
    }

    pub async fn export_component(&mut self, id: &str) -> Result<ExportedBlob, AppError> {
        let token = self.token()?;
        let result = self.backend.export_component(&token, id).await;
        self.guard(result)
    }

    pub async fn restore_version(&mut self, id: &str, version_id: &str) -> Result<ComponentRecord, AppError> {
        let token = self.token()?;
        let result = self.backend.restore_version(&token, id, version_id).await;
        self.guard(result)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
