//! Backend plugin contract
//!
//! A [`ResourcePlugin`] is the capability object a controller dispatches to.
//! The trait is total: every operation a controller can route is a named
//! method resolved at construction time, so a missing backend capability is
//! a compile error rather than a runtime dispatch failure.
//!
//! Plugins receive mutation bodies as full envelopes keyed by resource name
//! (`{"network": {...}}`), with schema defaults already materialized for
//! update calls. List and get calls receive the normalized [`RequestQuery`]
//! so backends can honor filters, field projection, and verbosity without
//! reparsing the request.
//!
//! Implementations own their concurrency discipline. Calls are never
//! serialized by this layer, and any blocking happens inside the plugin.

use async_trait::async_trait;
use serde_json::Value;

use super::context::RequestContext;
use super::fault::DomainError;
use super::query::RequestQuery;

/// Backend capability object behind a resource controller
///
/// All operations report business-rule violations as [`DomainError`]; the
/// fault boundary decides which of those become protocol faults.
#[async_trait]
pub trait ResourcePlugin: Send + Sync {
    /// List all objects of the collection visible to the caller
    async fn list(
        &self,
        ctx: &RequestContext,
        query: &RequestQuery,
    ) -> Result<Vec<Value>, DomainError>;

    /// Fetch a single object by identifier
    async fn get(
        &self,
        ctx: &RequestContext,
        id: &str,
        query: &RequestQuery,
    ) -> Result<Value, DomainError>;

    /// Create an object from a body envelope
    async fn create(&self, ctx: &RequestContext, body: Value) -> Result<Value, DomainError>;

    /// Update an object from a prepared body envelope
    ///
    /// The identifying attribute travels inside the envelope; the routing id
    /// is not passed separately.
    async fn update(&self, ctx: &RequestContext, body: Value) -> Result<Value, DomainError>;

    /// Delete an object by identifier
    async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), DomainError>;
}
