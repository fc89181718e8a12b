//! Resource factory
//!
//! [`ResourceBuilder`] assembles a [`ResourceController`] and binds it to an
//! axum [`Router`]. The router is the transport adapter: path parsing, body
//! bytes, and format negotiation live here, and the controller only ever sees
//! decoded values. One call produces the five collection routes:
//!
//! | Method | Path                  | Operation | Status |
//! |--------|-----------------------|-----------|--------|
//! | GET    | `/{collection}`       | index     | 200    |
//! | POST   | `/{collection}`       | create    | 201    |
//! | GET    | `/{collection}/{id}`  | show      | 200    |
//! | PUT    | `/{collection}/{id}`  | update    | 200    |
//! | DELETE | `/{collection}/{id}`  | delete    | 204    |

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::{header, HeaderMap, StatusCode};
use serde_json::Value;

use crate::error::{Error, Result};

use super::context::RequestContext;
use super::controller::ResourceController;
use super::fault::FaultMap;
use super::formats::{BodyFormat, FormatRegistry};
use super::plugin::ResourcePlugin;
use super::query::RequestQuery;
use super::schema::ResourceSchema;
use super::views::{identity_view, ViewRegistry};

/// Shared state behind every route of one resource
#[derive(Clone)]
struct ResourceState {
    controller: Arc<ResourceController>,
    formats: Arc<FormatRegistry>,
}

/// Builder binding a backend plugin to a routed resource
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use gridway::api::{
///     identity_view, FaultMap, ResourceBuilder, ResourcePlugin, ResourceSchema, ViewRegistry,
/// };
/// use serde_json::json;
///
/// fn bind(plugin: Arc<dyn ResourcePlugin>) -> gridway::Result<axum::Router> {
///     ResourceBuilder::new("networks", "network")
///         .with_schema(
///             ResourceSchema::new()
///                 .with_required("name")
///                 .with_default("admin_state_up", json!(true)),
///         )
///         .with_views(ViewRegistry::new().with_view("network", identity_view()))
///         .with_faults(FaultMap::default())
///         .build(plugin)
/// }
/// ```
#[derive(Debug)]
pub struct ResourceBuilder {
    collection: String,
    resource: String,
    schema: ResourceSchema,
    views: ViewRegistry,
    faults: FaultMap,
    formats: FormatRegistry,
}

impl ResourceBuilder {
    /// Start a builder for the named collection and resource
    #[must_use]
    pub fn new(collection: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            resource: resource.into(),
            schema: ResourceSchema::new(),
            views: ViewRegistry::new(),
            faults: FaultMap::default(),
            formats: FormatRegistry::new(),
        }
    }

    /// Set the parameter schema used for body preparation
    #[must_use]
    pub fn with_schema(mut self, schema: ResourceSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the view registry; it must carry a view for this resource
    #[must_use]
    pub fn with_views(mut self, views: ViewRegistry) -> Self {
        self.views = views;
        self
    }

    /// Set the domain-error to fault mapping
    #[must_use]
    pub fn with_faults(mut self, faults: FaultMap) -> Self {
        self.faults = faults;
        self
    }

    /// Set the wire format registry
    #[must_use]
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Construct the controller and bind the collection routes
    ///
    /// Fails with [`Error::Internal`] when the view registry has no entry for
    /// the resource being bound.
    pub fn build(self, plugin: Arc<dyn ResourcePlugin>) -> Result<Router> {
        let view = self.views.get(&self.resource).ok_or_else(|| {
            Error::Internal(format!(
                "no view registered for resource '{}'",
                self.resource
            ))
        })?;

        let controller = Arc::new(ResourceController::new(
            plugin,
            self.collection.clone(),
            self.resource,
            self.schema,
            view,
            self.faults,
        ));

        let state = ResourceState {
            controller,
            formats: Arc::new(self.formats),
        };

        let collection_path = format!("/{}", self.collection);
        let member_path = format!("/{}/{{id}}", self.collection);

        Ok(Router::new()
            .route(&collection_path, get(index).post(create))
            .route(&member_path, get(show).put(update).delete(delete))
            .with_state(state))
    }
}

/// Bind a resource with an identity view and default fault and format tables
pub fn create_resource(
    plugin: Arc<dyn ResourcePlugin>,
    collection: impl Into<String>,
    resource: impl Into<String>,
    schema: ResourceSchema,
) -> Result<Router> {
    let resource = resource.into();
    ResourceBuilder::new(collection, resource.clone())
        .with_schema(schema)
        .with_views(ViewRegistry::new().with_view(resource, identity_view()))
        .build(plugin)
}

async fn index(
    State(state): State<ResourceState>,
    ctx: RequestContext,
    query: RequestQuery,
    headers: HeaderMap,
) -> Response {
    let format = state.formats.negotiate(&headers);
    match state.controller.index(&ctx, &query).await {
        Ok(value) => render(format.as_ref(), StatusCode::OK, &value),
        Err(err) => err.into_response(),
    }
}

async fn show(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    ctx: RequestContext,
    query: RequestQuery,
    headers: HeaderMap,
) -> Response {
    let format = state.formats.negotiate(&headers);
    match state.controller.show(&ctx, &id, &query).await {
        Ok(value) => render(format.as_ref(), StatusCode::OK, &value),
        Err(err) => err.into_response(),
    }
}

async fn create(
    State(state): State<ResourceState>,
    ctx: RequestContext,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let format = state.formats.negotiate(&headers);
    let body = match decode_body(format.as_ref(), &bytes) {
        Ok(body) => body.unwrap_or(Value::Null),
        Err(response) => return response,
    };
    match state.controller.create(&ctx, body).await {
        Ok(value) => render(format.as_ref(), StatusCode::CREATED, &value),
        Err(err) => err.into_response(),
    }
}

async fn update(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    ctx: RequestContext,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let format = state.formats.negotiate(&headers);
    let body = match decode_body(format.as_ref(), &bytes) {
        Ok(body) => body,
        Err(response) => return response,
    };
    match state.controller.update(&ctx, &id, body).await {
        Ok(value) => render(format.as_ref(), StatusCode::OK, &value),
        Err(err) => err.into_response(),
    }
}

async fn delete(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
    ctx: RequestContext,
) -> Response {
    match state.controller.delete(&ctx, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Decode request bytes with the negotiated format
///
/// An empty body decodes to `None` so mutation handlers can distinguish
/// no-body from an explicit null.
fn decode_body(format: &dyn BodyFormat, bytes: &[u8]) -> std::result::Result<Option<Value>, Response> {
    if bytes.is_empty() {
        return Ok(None);
    }
    format
        .deserialize(bytes)
        .map(Some)
        .map_err(|err| Error::BadRequest(err.to_string()).into_response())
}

fn render(format: &dyn BodyFormat, status: StatusCode, value: &Value) -> Response {
    match format.serialize(value) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, format.content_type())],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(content_type = format.content_type(), "Response serialization failed: {}", err);
            Error::Internal("response serialization failed".to_string()).into_response()
        }
    }
}
