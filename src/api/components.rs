//! `/components` operations. Every call needs a bearer token.

use reqwest::Method;
use serde::Deserialize;

use super::types::{
    ComponentDraft, ComponentPage, ComponentRecord, ComponentVersion, ExportedBlob, ListQuery, ListResponse,
};
use super::{ApiError, BackendClient, disposition_filename};

/// Versions come back bare or wrapped in `{"versions": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum VersionsResponse {
    Wrapped { versions: Vec<ComponentVersion> },
    Bare(Vec<ComponentVersion>),
}

pub(crate) fn component_path(id: &str) -> String {
    format!("components/{id}")
}

pub(crate) fn export_filename(id: &str) -> String {
    format!("component-{id}.zip")
}

impl BackendClient {
    pub async fn create_component(&self, token: &str, draft: &ComponentDraft) -> Result<ComponentRecord, ApiError> {
        tracing::info!(name = %draft.name, "api: creating component");
        let request = self.request(Method::POST, "components", Some(token)).json(draft);
        self.send_json(request).await
    }

    pub async fn update_component(
        &self,
        token: &str,
        id: &str,
        draft: &ComponentDraft,
    ) -> Result<ComponentRecord, ApiError> {
        tracing::info!(id, name = %draft.name, "api: updating component");
        let request = self.request(Method::PUT, &component_path(id), Some(token)).json(draft);
        self.send_json(request).await
    }

    pub async fn list_components(&self, token: &str, query: &ListQuery) -> Result<ComponentPage, ApiError> {
        let request = self
            .request(Method::GET, "components", Some(token))
            .query(&query.to_pairs());
        let response: ListResponse = self.send_json(request).await?;
        let page = response.into_page(query);
        tracing::debug!(count = page.components.len(), total = page.total, "api: listed components");
        Ok(page)
    }

    /// Fetch one component; `code_only` asks the backend to omit metadata.
    pub async fn get_component(&self, token: &str, id: &str, code_only: bool) -> Result<ComponentRecord, ApiError> {
        let request = self
            .request(Method::GET, &component_path(id), Some(token))
            .query(&[("codeOnly", code_only)]);
        self.send_json(request).await
    }

    pub async fn component_versions(&self, token: &str, id: &str) -> Result<Vec<ComponentVersion>, ApiError> {
        let path = format!("{}/versions", component_path(id));
        let response: VersionsResponse = self.send_json(self.request(Method::GET, &path, Some(token))).await?;
        Ok(match response {
            VersionsResponse::Wrapped { versions } | VersionsResponse::Bare(versions) => versions,
        })
    }

    pub async fn delete_component(&self, token: &str, id: &str) -> Result<(), ApiError> {
        tracing::info!(id, "api: deleting component");
        self.send(self.request(Method::DELETE, &component_path(id), Some(token))).await?;
        Ok(())
    }

    /// Download the component's export bundle as raw bytes.
    pub async fn export_component(&self, token: &str, id: &str) -> Result<ExportedBlob, ApiError> {
        let path = format!("{}/export", component_path(id));
        let response = self.send(self.request(Method::GET, &path, Some(token))).await?;

        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = header(reqwest::header::CONTENT_DISPOSITION)
            .as_deref()
            .and_then(disposition_filename)
            .unwrap_or_else(|| export_filename(id));
        let content_type = header(reqwest::header::CONTENT_TYPE);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .to_vec();
        tracing::info!(id, %filename, size = bytes.len(), "api: exported component");
        Ok(ExportedBlob { filename, content_type, bytes })
    }

    pub async fn restore_version(
        &self,
        token: &str,
        id: &str,
        version_id: &str,
    ) -> Result<ComponentRecord, ApiError> {
        tracing::info!(id, version_id, "api: restoring version");
        let path = format!("{}/restore/{version_id}", component_path(id));
        let request = self
            .request(Method::POST, &path, Some(token))
            .json(&serde_json::json!({}));
        self.send_json(request).await
    }
}
