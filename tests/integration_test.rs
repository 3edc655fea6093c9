//! Integration tests for statusboard
//!
//! These tests run the GitHub adapter, the aggregator and the dashboard API
//! against an in-process server that mimics the GitHub REST API.

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use statusboard::aggregator::{Aggregator, Credential};
use statusboard::config::GitHubSettings;
use statusboard::integrations::{GitHubAdapter, GitHubError};
use statusboard::server::DashboardServer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;

const GOOD_TOKEN: &str = "good-token";

fn pull_json(owner: &str, repo: &str, number: u64, title: &str) -> Value {
    json!({
        "id": number * 1000,
        "number": number,
        "state": "open",
        "title": title,
        "body": null,
        "draft": false,
        "html_url": format!("https://github.com/{}/{}/pull/{}", owner, repo, number),
        "user": { "login": "octocat", "id": 1 },
        "labels": [],
        "head": { "label": "octocat:topic", "ref": "topic", "sha": "abc123" },
        "base": { "label": "octocat:main", "ref": "main", "sha": "def456" },
        "created_at": "2026-10-01T12:00:00Z",
        "updated_at": "2026-10-02T12:00:00Z"
    })
}

/// GET /repos/{owner}/{repo}/pulls
async fn list_pulls(
    Path((owner, repo)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if auth != Some(&format!("Bearer {}", GOOD_TOKEN)[..]) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        )
            .into_response();
    }

    if params.get("state").map(String::as_str) != Some("open") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "expected state=open" })),
        )
            .into_response();
    }

    match repo.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Not Found" })),
        )
            .into_response(),
        "throttled" => (
            StatusCode::FORBIDDEN,
            [
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-reset", "1760000000"),
            ],
            Json(json!({ "message": "API rate limit exceeded" })),
        )
            .into_response(),
        "locked" => (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Resource not accessible by integration" })),
        )
            .into_response(),
        "quiet" => Json(json!([])).into_response(),
        "garbled" => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"items": "not a list"}"#,
        )
            .into_response(),
        "repoA" => Json(json!([pull_json(&owner, &repo, 1, "x")])).into_response(),
        "repoB" => Json(json!([pull_json(&owner, &repo, 2, "y")])).into_response(),
        _ => Json(json!([
            pull_json(&owner, &repo, 10, "first"),
            pull_json(&owner, &repo, 11, "second"),
        ]))
        .into_response(),
    }
}

/// Start the fake GitHub API and return its base URL
async fn spawn_fake_github() -> String {
    let app = Router::new().route("/repos/{owner}/{repo}/pulls", get(list_pulls));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

mod adapter_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_open_pulls() {
        let base = spawn_fake_github().await;
        let adapter = GitHubAdapter::with_api_base(&base).unwrap();

        let pulls = adapter
            .list_open_pulls(&Credential::new(GOOD_TOKEN), "acme", "api")
            .await
            .unwrap();

        assert_eq!(pulls.len(), 2);
        assert_eq!(pulls[0].number, 10);
        assert_eq!(pulls[1].title, "second");
        assert_eq!(pulls[0].html_url, "https://github.com/acme/api/pull/10");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let base = spawn_fake_github().await;
        let adapter = GitHubAdapter::with_api_base(&base).unwrap();

        let err = adapter
            .list_open_pulls(&Credential::new("wrong"), "acme", "api")
            .await
            .unwrap_err();

        assert!(matches!(err, GitHubError::Auth(ref msg) if msg == "Bad credentials"));
    }

    #[tokio::test]
    async fn test_missing_repository() {
        let base = spawn_fake_github().await;
        let adapter = GitHubAdapter::with_api_base(&base).unwrap();

        let err = adapter
            .list_open_pulls(&Credential::new(GOOD_TOKEN), "acme", "missing")
            .await
            .unwrap_err();

        assert!(matches!(err, GitHubError::NotFound(ref name) if name == "acme/missing"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let base = spawn_fake_github().await;
        let adapter = GitHubAdapter::with_api_base(&base).unwrap();

        let err = adapter
            .list_open_pulls(&Credential::new(GOOD_TOKEN), "acme", "throttled")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GitHubError::RateLimited {
                reset_at: Some(1760000000)
            }
        ));
    }

    #[tokio::test]
    async fn test_forbidden_without_rate_limit() {
        let base = spawn_fake_github().await;
        let adapter = GitHubAdapter::with_api_base(&base).unwrap();

        let err = adapter
            .list_open_pulls(&Credential::new(GOOD_TOKEN), "acme", "locked")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Access forbidden: Resource not accessible by integration"
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let base = spawn_fake_github().await;
        let adapter = GitHubAdapter::with_api_base(&base).unwrap();

        let err = adapter
            .list_open_pulls(&Credential::new(GOOD_TOKEN), "acme", "garbled")
            .await
            .unwrap_err();

        assert!(matches!(err, GitHubError::Decode(_)));
        assert!(err.to_string().starts_with("Unexpected pull request payload: "));
    }
}

mod aggregation_tests {
    use super::*;

    fn repos(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_aggregate_two_repositories() {
        let base = spawn_fake_github().await;
        let aggregator = Aggregator::new(Arc::new(GitHubAdapter::with_api_base(&base).unwrap()));

        let result = aggregator
            .aggregate(&Credential::new(GOOD_TOKEN), "acme", &repos(&["repoA", "repoB"]))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.get("repoA").unwrap()[0].title, "x");
        assert_eq!(result.get("repoB").unwrap()[0].title, "y");
        assert_eq!(result.get("repoA").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_keeps_empty_repositories() {
        let base = spawn_fake_github().await;
        let aggregator = Aggregator::new(Arc::new(GitHubAdapter::with_api_base(&base).unwrap()));

        let result = aggregator
            .aggregate(&Credential::new(GOOD_TOKEN), "acme", &repos(&["quiet", "api"]))
            .await
            .unwrap();

        let order: Vec<&str> = result.resources().collect();
        assert_eq!(order, vec!["quiet", "api"]);
        assert!(result.get("quiet").unwrap().is_empty());
        assert_eq!(result.total_items(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_fails_on_one_missing_repository() {
        let base = spawn_fake_github().await;
        let aggregator = Aggregator::new(Arc::new(GitHubAdapter::with_api_base(&base).unwrap()));

        let err = aggregator
            .aggregate(
                &Credential::new(GOOD_TOKEN),
                "acme",
                &repos(&["repoA", "missing", "repoB"]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.resource(), "missing");
        assert!(matches!(err.cause(), GitHubError::NotFound(_)));
    }
}

mod server_tests {
    use super::*;

    async fn get_open_prs(settings: GitHubSettings, base: &str) -> (StatusCode, Value) {
        let adapter = GitHubAdapter::with_api_base(base).unwrap();
        let server = DashboardServer::new(settings, Arc::new(adapter));

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/github/open-prs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_open_prs_end_to_end() {
        let base = spawn_fake_github().await;
        let mut settings = GitHubSettings::new("acme", vec![]).with_token(GOOD_TOKEN);
        settings.set_repos_from_list(" repoB, ,repoA ");

        let (status, body) = get_open_prs(settings, &base).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = body["data"].as_object().unwrap();
        let keys: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["repoB", "repoA"]);
        assert_eq!(data["repoA"][0]["title"], "x");
        assert_eq!(data["repoB"][0]["title"], "y");
    }

    #[tokio::test]
    async fn test_open_prs_rejected_credential() {
        let base = spawn_fake_github().await;
        let settings =
            GitHubSettings::new("acme", vec!["repoA".to_string()]).with_token("revoked-token");

        let (status, body) = get_open_prs(settings, &base).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "failed to fetch open items for 'repoA': Authentication failed: Bad credentials"
        );
    }

    #[tokio::test]
    async fn test_open_prs_missing_token() {
        let base = spawn_fake_github().await;
        let settings = GitHubSettings::new("acme", vec!["repoA".to_string()]);

        let (status, body) = get_open_prs(settings, &base).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
        assert!(body["hint"].is_string());
    }

    #[tokio::test]
    async fn test_open_prs_is_repeatable() {
        let base = spawn_fake_github().await;
        let settings = GitHubSettings::new("acme", vec!["api".to_string(), "repoA".to_string()])
            .with_token(GOOD_TOKEN);

        let (_, first) = get_open_prs(settings.clone(), &base).await;
        let (_, second) = get_open_prs(settings, &base).await;

        assert_eq!(first, second);
    }
}

mod config_tests {
    use statusboard::config::{
        validate_config, validate_config_result, GitHubOverrides, StatusBoardConfig,
    };
    use tempfile::TempDir;

    #[test]
    fn test_file_then_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 9100\ngithub:\n  owner: acme\n  repos: [api, web]\n",
        )
        .unwrap();

        let mut config = StatusBoardConfig::load(&path).unwrap();
        config.github.apply(GitHubOverrides {
            token: Some("cli-token".to_string()),
            repos: Some("cli".to_string()),
            ..Default::default()
        });

        assert!(validate_config(&config).is_ok());
        let resolved = config.github.resolve().unwrap();
        assert_eq!(resolved.owner, "acme");
        assert_eq!(resolved.repos, vec!["cli"]);
        assert_eq!(config.server.addr(), "127.0.0.1:9100");
    }

    #[test]
    fn test_repeated_repository_is_accepted() {
        let mut config = StatusBoardConfig::new();
        config.github.apply(GitHubOverrides {
            token: Some("cli-token".to_string()),
            owner: Some("acme".to_string()),
            repos: Some("api,web,api".to_string()),
            ..Default::default()
        });

        assert!(validate_config_result(&config).is_ok());
        let resolved = config.github.resolve().unwrap();
        assert_eq!(resolved.repos, vec!["api", "web", "api"]);
    }
}
