//! `/auth` operations. These run without a token.

use reqwest::Method;

use super::types::{Credentials, LoginResponse, Registration};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// Create an account. Registration does not sign the user in.
    pub async fn register(&self, registration: &Registration) -> Result<LoginResponse, ApiError> {
        tracing::info!(email = %registration.email, "api: registering");
        let request = self.request(Method::POST, "auth/register", None).json(registration);
        self.send_json(request).await
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// A 2xx body without a token is reported as [`ApiError::Auth`].
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        tracing::info!(email = %credentials.email, "api: logging in");
        let request = self.request(Method::POST, "auth/login", None).json(credentials);
        let response: LoginResponse = self.send_json(request).await?;
        require_token(response)
    }
}

pub(crate) fn require_token(response: LoginResponse) -> Result<LoginResponse, ApiError> {
    match response.token.as_deref() {
        Some(token) if !token.trim().is_empty() => Ok(response),
        _ => Err(ApiError::Auth("login response carried no token".into())),
    }
}
