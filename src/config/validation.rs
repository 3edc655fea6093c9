//! Configuration validation
//!
//! Validates statusboard configuration for correctness:
//! - Server port is usable
//! - GitHub URL is an http(s) URL
//! - Repository names are unique and well-formed
//! - The token variable, when named, is set

use super::statusboard_config::StatusBoardConfig;
use crate::StatusBoardError;
use std::collections::HashSet;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a statusboard configuration
///
/// Missing owner/repos/token are not errors here: the open-PR endpoint reports
/// them per request with a remediation hint.
pub fn validate_config(config: &StatusBoardConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::new(
            "server.port",
            "Port must be greater than 0",
        ));
    }

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::new("server.host", "Host cannot be empty"));
    }

    let github = &config.github;
    if !github.api_url.starts_with("http://") && !github.api_url.starts_with("https://") {
        errors.push(ValidationError::new(
            "github.api_url",
            format!("Invalid GitHub URL: {}", github.api_url),
        ));
    }

    if let Some(ref owner) = github.owner {
        if owner.trim().is_empty() {
            errors.push(ValidationError::new(
                "github.owner",
                "GitHub owner cannot be empty",
            ));
        }
    }

    let mut seen = HashSet::new();
    for repo in &github.repos {
        let name = repo.trim();
        if name.contains('/') || name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::new(
                "github.repos",
                format!(
                    "Invalid repository name '{}': use the bare name without the owner",
                    repo
                ),
            ));
        }
        if !name.is_empty() && !seen.insert(name) {
            tracing::warn!(repo = %name, "Repository listed more than once, it is queried once");
        }
    }

    if let Some(ref var) = github.token_env {
        if std::env::var(var).is_err() {
            tracing::warn!(
                env_var = %var,
                "Token environment variable not set (this may be intentional if set at runtime)"
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &StatusBoardConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        StatusBoardError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
