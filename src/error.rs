//! Error types for Statusboard
//!
//! Defines the crate-wide error enum covering configuration, I/O, remote
//! queries and the HTTP server. Uses thiserror for ergonomic error handling.

use crate::aggregator::AggregationError;
use crate::integrations::GitHubError;
use crate::server::ServerError;
use thiserror::Error;

/// Result type alias for Statusboard operations
pub type Result<T> = std::result::Result<T, StatusBoardError>;

/// Comprehensive error type for Statusboard operations
#[derive(Error, Debug)]
pub enum StatusBoardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single GitHub query failed outside of an aggregation
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// One resource in a multi-resource fetch failed
    #[error(transparent)]
    Aggregation(#[from] AggregationError<GitHubError>),

    /// Dashboard server errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
