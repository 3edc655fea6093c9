//! Statusboard - Aggregated status dashboard backend
//!
//! Statusboard gathers status data from third-party services (starting with
//! open GitHub pull requests) and serves it as one JSON API for a dashboard UI.
//!
//! # Architecture
//!
//! - **aggregator**: Fans one query per repository out to a source and merges the outcomes
//! - **integrations**: External service adapters (GitHub REST)
//! - **server**: axum HTTP API (`/api/github/open-prs`)
//! - **ticket**: Source-neutral ticket model for rendering
//! - **config**: YAML configuration with CLI/env overrides

// Core modules
pub mod aggregator;
pub mod config;
pub mod error;
pub mod integrations;

// Surfaces
pub mod logging;
pub mod server;
pub mod ticket;

// Re-exports
pub use error::{Result, StatusBoardError};
