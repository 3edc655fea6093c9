//! Multi-repository aggregator
//!
//! Issues one open-items query per requested resource through an
//! [`OpenItemSource`] and merges the outcomes into a single result keyed by
//! resource name, failing as a whole if any resource fails.

mod multi_source;
mod source;

pub use multi_source::{AggregationError, AggregationResult, Aggregator};
pub use source::{Credential, OpenItemSource};
