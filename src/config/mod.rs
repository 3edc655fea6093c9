//! Configuration system
//!
//! Loads ~/.config/statusboard/config.yaml with support for:
//! - Dashboard server bind address
//! - GitHub owner, repository list and API endpoint
//!
//! Command line flags and environment variables override file values; the
//! result is an explicit struct handed to the server at construction time.

mod github;
mod statusboard_config;
pub mod validation;

pub use github::{
    parse_repo_list, GitHubOverrides, GitHubSettings, MissingConfig, ResolvedGitHub,
    DEFAULT_API_URL,
};
pub use statusboard_config::{ServerConfig, StatusBoardConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
