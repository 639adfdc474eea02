//! Remote project store
//!
//! Authenticated per-user cloud collection over HTTP, one addressable record
//! per project id:
//!
//! - `GET    {base}/projects`      - list
//! - `GET    {base}/projects/{id}` - fetch one
//! - `PUT    {base}/projects/{id}` - verbatim upsert
//! - `DELETE {base}/projects/{id}` - idempotent delete
//! - `DELETE {base}/projects`      - clear
//! - `HEAD   {base}/projects/{id}` - existence check without a body
//!
//! Network failures are surfaced as `BackendUnavailable`; the adapter never
//! retries - retry policy belongs to the caller.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{RepoError, RepoResult};
use crate::models::Project;
use crate::store::ProjectStore;

/// Cloud-backed store addressing one record per project id
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RemoteStore {
    /// Create a store for the given base URL and bearer token
    ///
    /// The token identifies the user; the server scopes the collection to
    /// that user. Session lifecycle is the caller's concern.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// URL of the whole collection
    fn collection_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    /// URL of a single record
    fn record_url(&self, id: Uuid) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }

    /// Map a transport-level failure to `BackendUnavailable`
    fn transport(err: reqwest::Error) -> RepoError {
        warn!("Remote store request failed: {}", err);
        RepoError::backend(err.to_string())
    }

    /// Reject any non-success status as `BackendUnavailable`
    fn check_status(status: StatusCode, url: &str) -> RepoResult<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(RepoError::backend(format!("{} returned {}", url, status)))
        }
    }
}

#[async_trait]
impl ProjectStore for RemoteStore {
    async fn get_all(&self) -> RepoResult<Vec<Project>> {
        let url = self.collection_url();
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::transport)?;

        Self::check_status(response.status(), &url)?;
        response
            .json()
            .await
            .map_err(|e| RepoError::backend(format!("invalid response body: {}", e)))
    }

    async fn get(&self, id: Uuid) -> RepoResult<Project> {
        let url = self.record_url(id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepoError::NotFound { id });
        }
        Self::check_status(response.status(), &url)?;
        response
            .json()
            .await
            .map_err(|e| RepoError::backend(format!("invalid response body: {}", e)))
    }

    async fn put(&self, project: &Project) -> RepoResult<()> {
        let url = self.record_url(project.id);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(project)
            .send()
            .await
            .map_err(Self::transport)?;

        Self::check_status(response.status(), &url)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let url = self.record_url(id);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::transport)?;

        // Deleting an absent record is a successful no-op
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response.status(), &url)
    }

    async fn clear(&self) -> RepoResult<()> {
        let url = self.collection_url();
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response.status(), &url)
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        let url = self.record_url(id);
        debug!("HEAD {}", url);

        let response = self
            .client
            .head(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check_status(response.status(), &url)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = RemoteStore::new("https://api.example.com", "token");
        assert_eq!(
            store.collection_url(),
            "https://api.example.com/projects"
        );

        let id = Uuid::new_v4();
        assert_eq!(
            store.record_url(id),
            format!("https://api.example.com/projects/{}", id)
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let store = RemoteStore::new("https://api.example.com/", "token");
        assert_eq!(
            store.collection_url(),
            "https://api.example.com/projects"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(RemoteStore::check_status(StatusCode::OK, "url").is_ok());
        assert!(RemoteStore::check_status(StatusCode::NO_CONTENT, "url").is_ok());

        let err = RemoteStore::check_status(StatusCode::BAD_GATEWAY, "url").unwrap_err();
        assert!(matches!(err, RepoError::BackendUnavailable { .. }));

        let err = RemoteStore::check_status(StatusCode::UNAUTHORIZED, "url").unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
