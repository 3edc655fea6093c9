//! Remote query capability used by the aggregator

use async_trait::async_trait;

/// Opaque secret authorizing each remote query
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for building an authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A service that lists the open items of one resource under an owner
///
/// Implementations issue exactly one logical query per call and hold no
/// per-call state, so calls for different resources may run concurrently.
#[async_trait]
pub trait OpenItemSource: Send + Sync {
    /// Item returned per resource (e.g. a pull request)
    type Item: Send;

    /// Failure of a single query
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch open items for `owner/resource`
    async fn fetch_open_items(
        &self,
        credential: &Credential,
        owner: &str,
        resource: &str,
    ) -> std::result::Result<Vec<Self::Item>, Self::Error>;
}
