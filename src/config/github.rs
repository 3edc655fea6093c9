//! GitHub source settings
//!
//! Holds the owner, repository list and credential the open-PR endpoint needs,
//! and resolves them into the inputs of one aggregation call.

use crate::aggregator::Credential;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Split a comma-separated repository list, trimming entries and dropping empty ones
pub fn parse_repo_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// GitHub integration settings
///
/// The token is never written to the config file; it comes from the command
/// line, `GITHUB_TOKEN`, or the variable named by `token_env`.
#[derive(Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// GitHub instance URL (e.g., "https://github.com" or an Enterprise host)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Organization or user owning the repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Repositories to query, in display order
    #[serde(default)]
    pub repos: Vec<String>,

    /// Environment variable holding the token, when not GITHUB_TOKEN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(skip)]
    token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            owner: None,
            repos: Vec::new(),
            token_env: None,
            token: None,
        }
    }
}

impl std::fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repos", &self.repos)
            .field("token_env", &self.token_env)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration required by the open-PR endpoint is missing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct MissingConfig {
    pub error: String,
    pub hint: String,
}

/// Values from the command line or environment that override the config file
#[derive(Default, Clone)]
pub struct GitHubOverrides {
    pub token: Option<String>,
    pub owner: Option<String>,
    /// Comma-separated repository list
    pub repos: Option<String>,
    pub api_url: Option<String>,
}

/// Inputs for one aggregation call
#[derive(Debug, Clone)]
pub struct ResolvedGitHub {
    pub credential: Credential,
    pub owner: String,
    pub repos: Vec<String>,
}

impl GitHubSettings {
    pub fn new(owner: impl Into<String>, repos: Vec<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            repos,
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the authentication token
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Replace the repository list from a comma-separated string
    pub fn set_repos_from_list(&mut self, raw: &str) {
        self.repos = parse_repo_list(raw);
    }

    /// Layer overrides on top of file values
    ///
    /// Without an explicit token, the variable named by `token_env` is read.
    pub fn apply(&mut self, overrides: GitHubOverrides) {
        if let Some(owner) = overrides.owner {
            self.owner = Some(owner);
        }
        if let Some(ref repos) = overrides.repos {
            self.set_repos_from_list(repos);
        }
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        match overrides.token {
            Some(token) => self.token = Some(token),
            None => {
                if let Some(ref var) = self.token_env {
                    self.token = std::env::var(var).ok();
                }
            }
        }
    }

    /// Resolve the settings into aggregation inputs
    ///
    /// Repository names are trimmed and empty entries dropped. Fails with a
    /// remediation hint when the token, owner or repositories are missing.
    pub fn resolve(&self) -> std::result::Result<ResolvedGitHub, MissingConfig> {
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(MissingConfig {
                error: "GitHub token is not configured".to_string(),
                hint: match self.token_env {
                    Some(ref var) => format!("Set {} to a GitHub personal access token", var),
                    None => "Set GITHUB_TOKEN to a GitHub personal access token".to_string(),
                },
            });
        };

        let owner = self
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty());
        let Some(owner) = owner else {
            return Err(MissingConfig {
                error: "GitHub owner is not configured".to_string(),
                hint: "Set GITHUB_OWNER or github.owner in the config file".to_string(),
            });
        };

        let repos: Vec<String> = self
            .repos
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        if repos.is_empty() {
            return Err(MissingConfig {
                error: "No GitHub repositories configured".to_string(),
                hint: "Set GITHUB_REPOS to a comma-separated list (e.g. \"api,web\")"
                    .to_string(),
            });
        }

        Ok(ResolvedGitHub {
            credential: Credential::new(token),
            owner: owner.to_string(),
            repos,
        })
    }
}
