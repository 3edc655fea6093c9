//! GitHub Pull Request Adapter
//!
//! Lists open pull requests per repository through the GitHub REST API and
//! serves as the remote query behind the open-PR aggregation.

use crate::aggregator::{Credential, OpenItemSource};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Client-wide timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
/// Per-request timeout for listing pull requests
const LIST_TIMEOUT: Duration = Duration::from_secs(15);
/// GitHub's maximum page size
const PER_PAGE: u32 = 100;

/// GitHub REST client listing open pull requests
#[derive(Debug, Clone)]
pub struct GitHubAdapter {
    client: Client,
    rest_base_url: String,
}

/// Pull request (REST API format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub draft: bool,
    pub html_url: String,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub requested_reviewers: Vec<GitHubUser>,
    pub head: GitRef,
    pub base: GitRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Branch reference of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

/// GitHub error payload
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Access forbidden: {0}")]
    Forbidden(String),
    #[error("Repository not found: {0}")]
    NotFound(String),
    #[error("Rate limited by GitHub API")]
    RateLimited { reset_at: Option<u64> },
    #[error("GitHub API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected pull request payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GitHubAdapter {
    /// Create an adapter for a GitHub instance URL
    ///
    /// `https://github.com` maps to `https://api.github.com`; any other host is
    /// treated as GitHub Enterprise and served from `{url}/api/v3`.
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(instance_url: &str) -> Result<Self> {
        Self::with_api_base(&rest_base_for(instance_url))
    }

    /// Create an adapter against a REST base URL used verbatim
    pub fn with_api_base(rest_base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::USER_AGENT,
                    header::HeaderValue::from_static(concat!(
                        "statusboard/",
                        env!("CARGO_PKG_VERSION")
                    )),
                );
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/vnd.github+json"),
                );
                headers
            })
            .build()?; // reqwest::Error converts to StatusBoardError::Http via #[from]

        Ok(Self {
            client,
            rest_base_url: rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn rest_base_url(&self) -> &str {
        &self.rest_base_url
    }

    /// List open pull requests of `owner/repo` (first page, up to 100)
    pub async fn list_open_pulls(
        &self,
        credential: &Credential,
        owner: &str,
        repo: &str,
    ) -> std::result::Result<Vec<PullRequest>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.rest_base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );

        debug!(owner = %owner, repo = %repo, "Listing open pull requests");

        let per_page = PER_PAGE.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("state", "open"), ("per_page", per_page.as_str())])
            .bearer_auth(credential.expose())
            .timeout(LIST_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let pulls: Vec<PullRequest> = serde_json::from_str(&body)?;
                debug!(owner = %owner, repo = %repo, count = pulls.len(), "Pull requests listed");
                Ok(pulls)
            }
            StatusCode::UNAUTHORIZED => Err(GitHubError::Auth(error_message(response).await)),
            StatusCode::NOT_FOUND => Err(GitHubError::NotFound(format!("{}/{}", owner, repo))),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                if let Some(reset_at) = rate_limit_reset(&response) {
                    warn!(
                        owner = %owner,
                        repo = %repo,
                        reset_at = ?reset_at,
                        "GitHub rate limit hit"
                    );
                    return Err(GitHubError::RateLimited { reset_at });
                }
                Err(GitHubError::Forbidden(error_message(response).await))
            }
            status => Err(GitHubError::Api {
                status: status.as_u16(),
                message: error_message(response).await,
            }),
        }
    }
}

#[async_trait]
impl OpenItemSource for GitHubAdapter {
    type Item = PullRequest;
    type Error = GitHubError;

    async fn fetch_open_items(
        &self,
        credential: &Credential,
        owner: &str,
        resource: &str,
    ) -> std::result::Result<Vec<PullRequest>, GitHubError> {
        self.list_open_pulls(credential, owner, resource).await
    }
}

/// REST base for a GitHub instance URL
fn rest_base_for(instance_url: &str) -> String {
    let base_url = instance_url.trim_end_matches('/');
    if base_url.contains("api.github.com") || base_url.ends_with("/api/v3") {
        base_url.to_string()
    } else if base_url.contains("github.com") {
        crate::config::DEFAULT_API_URL.to_string()
    } else {
        format!("{}/api/v3", base_url)
    }
}

/// Detect a rate-limit rejection; the inner value is the reset epoch if sent
fn rate_limit_reset(response: &Response) -> Option<Option<u64>> {
    let headers = response.headers();
    let exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    if response.status() != StatusCode::TOO_MANY_REQUESTS && !exhausted {
        return None;
    }

    Some(
        headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok()),
    )
}

/// Extract GitHub's `message` from an error response, falling back to the raw body
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    parse_error_body(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            body
        }
    })
}

fn parse_error_body(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
}
