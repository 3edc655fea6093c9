//! Ticket-like display model
//!
//! Source-neutral shape the dashboard renders for pull requests, issues and
//! similar entities.

use crate::integrations::PullRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state shown on a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Draft,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Draft => "draft",
            TicketStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Service a ticket was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketSource {
    #[serde(rename = "github")]
    GitHub,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// `repo#number`
    pub id: String,
    pub title: String,
    pub status: TicketStatus,
    pub url: String,
    pub author: Option<String>,
    pub labels: Vec<String>,
    pub source: TicketSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Convert a GitHub pull request of `repo` into a ticket
    pub fn from_pull_request(repo: &str, pull: &PullRequest) -> Self {
        let status = if pull.state.eq_ignore_ascii_case("closed") {
            TicketStatus::Closed
        } else if pull.draft {
            TicketStatus::Draft
        } else {
            TicketStatus::Open
        };

        Self {
            id: format!("{}#{}", repo, pull.number),
            title: pull.title.clone(),
            status,
            url: pull.html_url.clone(),
            author: pull.user.as_ref().map(|u| u.login.clone()),
            labels: pull.labels.iter().map(|l| l.name.clone()).collect(),
            source: TicketSource::GitHub,
            created_at: pull.created_at,
            updated_at: pull.updated_at,
        }
    }

    /// Whole days since the ticket was opened
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }
}
