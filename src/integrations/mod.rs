//! External Integrations
//!
//! Adapters for the third-party services the dashboard reads status from.
//!
//! # Built-in Integrations
//!
//! - **GitHub**: REST adapter listing open pull requests per repository
//!
//! Each adapter implements [`crate::aggregator::OpenItemSource`] so the
//! aggregator can fan a query out across many resources.

pub mod github;

// GitHub exports
pub use github::{GitHubAdapter, GitHubError, GitHubLabel, GitHubUser, GitRef, PullRequest};
