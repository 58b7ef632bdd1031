//! Contracts a collection implements to be served as a change stream.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Range query over the modification time of documents.
pub const UPDATED_BETWEEN: &str = "updatedBetween";

/// Range query over the creation time of documents.
pub const CREATED_BETWEEN: &str = "createdBetween";

/// A time-window lookup over a collection.
///
/// Both bounds are epoch milliseconds. The adapter passes them through
/// unchecked: `start_at` may be negative or greater than `end_at`, and how
/// the bounds are interpreted (inclusive or exclusive) is up to the
/// implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RangeQuery: Send + Sync {
    /// Resolves exactly once with either the documents changed inside the
    /// window or the error the store reported.
    async fn between(&self, start_at: i64, end_at: i64) -> Result<Vec<Value>>;
}

/// A collection that can tell what changed inside a time window.
pub trait Changeable: Send + Sync {
    /// Identifies the collection in configuration errors.
    fn model_name(&self) -> &str;

    /// Sent verbatim as the `event:` field of every record.
    fn collection_name(&self) -> &str;

    /// Looks up a range query by name, e.g. [`UPDATED_BETWEEN`].
    ///
    /// Returns `None` when the collection has no such query. Called once
    /// while building a `ChangeStream`.
    fn range_query(&self, name: &str) -> Option<Arc<dyn RangeQuery>>;
}
