//! Multi-resource aggregation fetch

use super::source::{Credential, OpenItemSource};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Open items keyed by resource name, in request order
///
/// Serializes as a JSON object whose keys follow the requested order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationResult<T> {
    entries: IndexMap<String, Vec<T>>,
}

impl<T> AggregationResult<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Items fetched for a resource
    pub fn get(&self, resource: &str) -> Option<&[T]> {
        self.entries.get(resource).map(Vec::as_slice)
    }

    /// Resource names in request order
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Item count across all resources
    pub fn total_items(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> IndexMap<String, Vec<T>> {
        self.entries
    }
}

impl<T> IntoIterator for AggregationResult<T> {
    type Item = (String, Vec<T>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A resource query failed; the whole aggregation is abandoned
#[derive(Debug, Error)]
#[error("failed to fetch open items for '{resource}': {cause}")]
pub struct AggregationError<E: std::error::Error + 'static> {
    resource: String,
    #[source]
    cause: E,
}

impl<E: std::error::Error + 'static> AggregationError<E> {
    pub fn new(resource: impl Into<String>, cause: E) -> Self {
        Self {
            resource: resource.into(),
            cause,
        }
    }

    /// Name of the resource whose query failed
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn cause(&self) -> &E {
        &self.cause
    }

    pub fn into_cause(self) -> E {
        self.cause
    }
}

/// Fans one query per resource out to an [`OpenItemSource`] and merges the outcomes
///
/// All-or-nothing: any failed query fails the aggregation. Queries run
/// concurrently but outcomes are read back in request order, so with several
/// failures the earliest requested resource is the one reported.
pub struct Aggregator<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for Aggregator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S> Aggregator<S>
where
    S: OpenItemSource + ?Sized,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Fetch open items for every resource under `owner`
    ///
    /// Callers reject an empty resource list beforehand; an empty slice simply
    /// yields an empty result. A name repeated in `resources` is queried once
    /// and keeps its first position.
    pub async fn aggregate(
        &self,
        credential: &Credential,
        owner: &str,
        resources: &[String],
    ) -> std::result::Result<AggregationResult<S::Item>, AggregationError<S::Error>> {
        let mut unique: Vec<&str> = Vec::with_capacity(resources.len());
        for resource in resources {
            if !unique.contains(&resource.as_str()) {
                unique.push(resource.as_str());
            }
        }

        tracing::debug!(owner = %owner, resources = unique.len(), "Aggregating open items");

        let queries = unique.iter().map(|&resource| async move {
            tracing::debug!(owner = %owner, resource = %resource, "Querying resource");
            self.source
                .fetch_open_items(credential, owner, resource)
                .await
        });
        let outcomes = join_all(queries).await;

        let mut result = AggregationResult::with_capacity(unique.len());
        let mut first_failure = None;
        for (resource, outcome) in unique.into_iter().zip(outcomes) {
            match outcome {
                Ok(items) => {
                    if first_failure.is_none() {
                        result.entries.insert(resource.to_string(), items);
                    }
                }
                Err(cause) => {
                    tracing::warn!(
                        owner = %owner,
                        resource = %resource,
                        error = %cause,
                        "Resource query failed"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(AggregationError::new(resource, cause));
                    }
                }
            }
        }

        if let Some(err) = first_failure {
            return Err(err);
        }

        tracing::info!(
            owner = %owner,
            resources = result.len(),
            items = result.total_items(),
            "Aggregation complete"
        );

        Ok(result)
    }
}
