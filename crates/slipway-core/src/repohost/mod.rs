//! Repository host client.
//!
//! Talks to a GitHub-style REST API with structured results. The conflict
//! guard uses the existence probe, project creation optionally creates a
//! repository, and teardown deletes one idempotently.

use crate::config::RepoHostConfig;
use crate::error::{Error, Result};
use crate::types::DeleteStatus;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Typed client for the external version-control host.
#[async_trait]
pub trait RepoHostClient: Send + Sync {
    /// Whether a repository with this name already exists. An error here is
    /// an error; never guess "absent" on an ambiguous response.
    async fn repo_exists(&self, name: &str) -> Result<bool>;

    /// Create a repository and return its browse URL.
    async fn create_repo(&self, name: &str, description: &str) -> Result<String>;

    /// Delete a repository. Deleting an absent repository is success.
    async fn delete_repo(&self, name: &str) -> Result<DeleteStatus>;
}

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    html_url: String,
}

/// GitHub REST API client.
#[derive(Clone)]
pub struct GitHub {
    api_url: String,
    owner: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl GitHub {
    pub fn new(config: &RepoHostConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("slipway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            token: config.token.clone(),
            client,
        })
    }

    fn repo_url(&self, name: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.owner, name)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl RepoHostClient for GitHub {
    async fn repo_exists(&self, name: &str) -> Result<bool> {
        let url = self.repo_url(name);
        let resp = self.authorize(self.client.get(&url)).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::RepoHost(format!(
                "existence check for '{}/{}' returned {}",
                self.owner, name, status
            ))),
        }
    }

    async fn create_repo(&self, name: &str, description: &str) -> Result<String> {
        let url = format!("{}/orgs/{}/repos", self.api_url, self.owner);
        let body = CreateRepoBody {
            name,
            description,
            private: false,
        };
        let resp = self.authorize(self.client.post(&url).json(&body)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::RepoHost(format!(
                "creating repository '{}/{}' returned {}",
                self.owner, name, status
            )));
        }

        let repo: RepoResponse = resp.json().await?;
        debug!("Created repository {}", repo.html_url);
        Ok(repo.html_url)
    }

    async fn delete_repo(&self, name: &str) -> Result<DeleteStatus> {
        let url = self.repo_url(name);
        let resp = self.authorize(self.client.delete(&url)).send().await?;

        match resp.status() {
            StatusCode::NO_CONTENT => {
                debug!("Deleted repository {}/{}", self.owner, name);
                Ok(DeleteStatus::Deleted)
            }
            StatusCode::NOT_FOUND => Ok(DeleteStatus::AlreadyAbsent),
            status => Err(Error::RepoHost(format!(
                "deleting repository '{}/{}' returned {}",
                self.owner, name, status
            ))),
        }
    }
}
