//! HTTP server for the dashboard
//!
//! Exposes aggregated third-party status as JSON for the dashboard UI.
//!
//! # Routes
//!
//! - `GET /health` - Liveness probe
//! - `GET /api/github/open-prs` - Open pull requests for every configured repository
//!
//! # Response shape
//!
//! `open-prs` answers `{"success": true, "data": {...}}` with one key per
//! repository in configured order. Missing configuration yields 503 with an
//! `error` and a remediation `hint`; a failed repository query yields 500 with
//! the error message, and no partial data.
//!
//! # Example
//!
//! ```no_run
//! use statusboard::config::GitHubSettings;
//! use statusboard::integrations::GitHubAdapter;
//! use statusboard::server::DashboardServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = GitHubSettings::new("acme", vec!["api".into(), "web".into()])
//!         .with_token("ghp_example");
//!     let adapter = GitHubAdapter::new(&settings.api_url).expect("Failed to create adapter");
//!     let server = DashboardServer::new(settings, Arc::new(adapter));
//!
//!     server.run("127.0.0.1:8787").await.expect("Server failed");
//! }
//! ```

use crate::aggregator::{AggregationResult, Aggregator, OpenItemSource};
use crate::config::GitHubSettings;
use crate::integrations::{GitHubError, PullRequest};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;

/// Any source of open pull requests, usually [`crate::integrations::GitHubAdapter`]
pub type PullRequestSource = dyn OpenItemSource<Item = PullRequest, Error = GitHubError>;

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bind error: {0}")]
    Bind(String),
}

/// Shared server state
struct AppState {
    github: GitHubSettings,
    aggregator: Aggregator<PullRequestSource>,
}

/// HTTP server for the dashboard API
pub struct DashboardServer {
    state: Arc<AppState>,
}

impl DashboardServer {
    /// Create a server answering from `github` settings and a pull request source
    pub fn new(github: GitHubSettings, source: Arc<PullRequestSource>) -> Self {
        Self {
            state: Arc::new(AppState {
                github,
                aggregator: Aggregator::new(source),
            }),
        }
    }

    /// Build the router with request logging
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/github/open-prs", get(open_prs))
            .layer(middleware::from_fn(log_requests))
            .with_state(Arc::clone(&self.state))
    }

    /// Run the server on the given address until Ctrl-C
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {}", addr, e)))?;

        tracing::info!(
            addr = addr,
            repos = self.state.github.repos.len(),
            "Dashboard server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Io)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down dashboard server");
}

/// Request logging middleware
async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );

    response
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Successful open-PR response
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenPrsResponse {
    pub success: bool,
    pub data: AggregationResult<PullRequest>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            hint: None,
        }
    }

    fn with_hint(error: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            hint: Some(hint.into()),
            ..Self::new(error)
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn open_prs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OpenPrsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let resolved = state.github.resolve().map_err(|missing| {
        tracing::warn!(error = %missing.error, "GitHub source not configured");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::with_hint(missing.error, missing.hint)),
        )
    })?;

    let data = state
        .aggregator
        .aggregate(&resolved.credential, &resolved.owner, &resolved.repos)
        .await
        .map_err(|e| {
            tracing::error!(
                owner = %resolved.owner,
                repo = %e.resource(),
                error = %e,
                "Open pull request aggregation failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?;

    Ok(Json(OpenPrsResponse {
        success: true,
        data,
    }))
}
