//! Resource controller
//!
//! One controller instance serves every request for a single resource type.
//! Construction binds the backend plugin (behind a [`FaultBoundary`]), the
//! collection and resource names, the parameter schema, and the view
//! function; after that the controller is immutable and safe for concurrent
//! use without locking.
//!
//! Mutating operations run body preparation first: the submitted envelope is
//! validated against the schema and defaults are written back in place, so
//! the plugin always receives fully materialized attributes. Create is the
//! deliberate exception and hands the raw envelope through untouched.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::error::ErrorResponse;

use super::context::RequestContext;
use super::fault::{BoundaryError, DomainError, Fault, FaultBoundary, FaultMap};
use super::plugin::ResourcePlugin;
use super::query::RequestQuery;
use super::schema::ResourceSchema;
use super::views::ViewFn;

/// Failure raised by a controller operation
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A mapped domain failure, already translated to a protocol fault
    #[error(transparent)]
    Fault(Fault),

    /// An unmapped domain failure, propagated unchanged
    #[error(transparent)]
    Domain(DomainError),

    /// Request body does not contain the resource's own key
    #[error("Unable to find '{resource}' in request body")]
    MissingResourceKey {
        /// The expected top-level key
        resource: String,
    },

    /// A mandatory attribute was neither submitted nor defaulted
    #[error("Failed to parse request. Required attribute '{attr}' not specified")]
    MissingParameter {
        /// The resource being prepared
        resource: String,
        /// The missing attribute
        attr: String,
    },
}

impl From<BoundaryError> for ControllerError {
    fn from(err: BoundaryError) -> Self {
        match err {
            BoundaryError::Fault(fault) => Self::Fault(fault),
            BoundaryError::Domain(domain) => Self::Domain(domain),
        }
    }
}

impl ControllerError {
    /// HTTP status code this error surfaces as
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Fault(fault) => fault.status_code(),
            Self::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingResourceKey { .. } => StatusCode::BAD_REQUEST,
            Self::MissingParameter { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        match self {
            Self::Fault(fault) => fault.into_response(),

            Self::Domain(ref err) => {
                tracing::error!(kind = %err.kind, "Unmapped domain error: {}", err.message);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (
                    status,
                    Json(ErrorResponse::with_code(
                        status,
                        "INTERNAL_ERROR",
                        "Request could not be completed",
                    )),
                )
                    .into_response()
            }

            Self::MissingResourceKey { .. } => {
                let status = StatusCode::BAD_REQUEST;
                (
                    status,
                    Json(ErrorResponse::with_code(
                        status,
                        "BAD_REQUEST",
                        self.to_string(),
                    )),
                )
                    .into_response()
            }

            Self::MissingParameter { .. } => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                (
                    status,
                    Json(ErrorResponse::with_code(
                        status,
                        "UNPROCESSABLE_ENTITY",
                        self.to_string(),
                    )),
                )
                    .into_response()
            }
        }
    }
}

/// CRUD dispatcher for a single resource type
pub struct ResourceController {
    plugin: FaultBoundary,
    collection: String,
    resource: String,
    schema: ResourceSchema,
    view: ViewFn,
}

impl ResourceController {
    /// Bind a controller to a plugin and its resource metadata
    pub fn new(
        plugin: Arc<dyn ResourcePlugin>,
        collection: impl Into<String>,
        resource: impl Into<String>,
        schema: ResourceSchema,
        view: ViewFn,
        faults: FaultMap,
    ) -> Self {
        Self {
            plugin: FaultBoundary::new(plugin, faults),
            collection: collection.into(),
            resource: resource.into(),
            schema,
            view,
        }
    }

    /// Plural collection name
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Singular resource name
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Bound parameter schema
    #[must_use]
    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// List the collection: `{collection: [view(obj), ...]}`
    pub async fn index(
        &self,
        ctx: &RequestContext,
        query: &RequestQuery,
    ) -> Result<Value, ControllerError> {
        let objects = self.plugin.list(ctx, query).await?;
        let views: Vec<Value> = objects.iter().map(|obj| (self.view)(obj)).collect();
        Ok(envelope(&self.collection, Value::Array(views)))
    }

    /// Fetch one object: `{resource: view(obj)}`
    pub async fn show(
        &self,
        ctx: &RequestContext,
        id: &str,
        query: &RequestQuery,
    ) -> Result<Value, ControllerError> {
        let obj = self.plugin.get(ctx, id, query).await?;
        Ok(envelope(&self.resource, (self.view)(&obj)))
    }

    /// Create an object from the raw submitted envelope
    ///
    /// The body is handed to the plugin without schema preparation; only
    /// update validates and defaults. Backends owning create-time rules must
    /// enforce them.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        body: Value,
    ) -> Result<Value, ControllerError> {
        let obj = self.plugin.create(ctx, body).await?;
        Ok(envelope(&self.resource, (self.view)(&obj)))
    }

    /// Update an object after preparing the submitted envelope
    ///
    /// The routing id is consumed here; the identifying attribute travels
    /// inside the prepared body.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        _id: &str,
        body: Option<Value>,
    ) -> Result<Value, ControllerError> {
        let body = self.prepare_request_body(body)?;
        let obj = self.plugin.update(ctx, body).await?;
        Ok(envelope(&self.resource, (self.view)(&obj)))
    }

    /// Delete an object; produces no body
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), ControllerError> {
        self.plugin.delete(ctx, id).await?;
        Ok(())
    }

    /// Validate and default a mutation body against the bound schema
    ///
    /// An absent or null body is replaced with an empty envelope before
    /// validation. Each schema attribute is resolved in declared order from
    /// the submitted value, falling back to the declared default; the first
    /// attribute that resolves to nothing fails the whole call. Resolved
    /// values are written back so the returned body carries every attribute
    /// materialized.
    pub fn prepare_request_body(&self, body: Option<Value>) -> Result<Value, ControllerError> {
        let mut body = match body {
            None | Some(Value::Null) => {
                let mut envelope = Map::new();
                envelope.insert(self.resource.clone(), Value::Object(Map::new()));
                Value::Object(envelope)
            }
            Some(body) => body,
        };

        let res_dict = body
            .get_mut(&self.resource)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ControllerError::MissingResourceKey {
                resource: self.resource.clone(),
            })?;

        for param in self.schema.params() {
            let resolved = match res_dict.get(&param.attr) {
                Some(value) => value.clone(),
                None => param.default.clone().unwrap_or(Value::Null),
            };

            if resolved.is_null() {
                tracing::error!(
                    resource = %self.resource,
                    attr = %param.attr,
                    "Failed to parse request. Required attribute not specified"
                );
                return Err(ControllerError::MissingParameter {
                    resource: self.resource.clone(),
                    attr: param.attr.clone(),
                });
            }

            res_dict.insert(param.attr.clone(), resolved);
        }

        Ok(body)
    }
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("collection", &self.collection)
            .field("resource", &self.resource)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn envelope(key: &str, value: Value) -> Value {
    let mut out = Map::new();
    out.insert(key.to_string(), value);
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::views::{identity_view, project_fields};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Plugin double that serves canned objects and records mutation bodies
    struct RecordingPlugin {
        objects: Vec<Value>,
        last_body: Mutex<Option<Value>>,
        fail_with: Option<DomainError>,
    }

    impl RecordingPlugin {
        fn with_objects(objects: Vec<Value>) -> Self {
            Self {
                objects,
                last_body: Mutex::new(None),
                fail_with: None,
            }
        }

        fn failing(error: DomainError) -> Self {
            Self {
                objects: Vec::new(),
                last_body: Mutex::new(None),
                fail_with: Some(error),
            }
        }

        fn record(&self, body: &Value) {
            *self.last_body.lock().unwrap() = Some(body.clone());
        }

        fn first_or_fail(&self) -> Result<Value, DomainError> {
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(self.objects.first().cloned().unwrap_or(Value::Null)),
            }
        }
    }

    #[async_trait]
    impl ResourcePlugin for RecordingPlugin {
        async fn list(
            &self,
            _ctx: &RequestContext,
            _query: &RequestQuery,
        ) -> Result<Vec<Value>, DomainError> {
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(self.objects.clone()),
            }
        }

        async fn get(
            &self,
            _ctx: &RequestContext,
            _id: &str,
            _query: &RequestQuery,
        ) -> Result<Value, DomainError> {
            self.first_or_fail()
        }

        async fn create(&self, _ctx: &RequestContext, body: Value) -> Result<Value, DomainError> {
            self.record(&body);
            self.first_or_fail()
        }

        async fn update(&self, _ctx: &RequestContext, body: Value) -> Result<Value, DomainError> {
            self.record(&body);
            self.first_or_fail()
        }

        async fn delete(&self, _ctx: &RequestContext, _id: &str) -> Result<(), DomainError> {
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn network_schema() -> ResourceSchema {
        ResourceSchema::new()
            .with_required("name")
            .with_default("admin_state_up", json!(true))
    }

    fn controller_with(plugin: RecordingPlugin) -> (Arc<RecordingPlugin>, ResourceController) {
        let plugin = Arc::new(plugin);
        let controller = ResourceController::new(
            plugin.clone(),
            "networks",
            "network",
            network_schema(),
            identity_view(),
            FaultMap::default(),
        );
        (plugin, controller)
    }

    #[tokio::test]
    async fn test_index_wraps_collection_key() {
        let objects = vec![json!({"id": "n1"}), json!({"id": "n2"})];
        let (_, controller) = controller_with(RecordingPlugin::with_objects(objects));

        let out = controller
            .index(&RequestContext::new(), &RequestQuery::default())
            .await
            .unwrap();
        assert_eq!(out, json!({"networks": [{"id": "n1"}, {"id": "n2"}]}));
    }

    #[tokio::test]
    async fn test_index_applies_view_per_object() {
        let plugin = Arc::new(RecordingPlugin::with_objects(vec![
            json!({"id": "n1", "tenant_id": "t1"}),
        ]));
        let controller = ResourceController::new(
            plugin,
            "networks",
            "network",
            network_schema(),
            project_fields(&["id"]),
            FaultMap::default(),
        );

        let out = controller
            .index(&RequestContext::new(), &RequestQuery::default())
            .await
            .unwrap();
        assert_eq!(out, json!({"networks": [{"id": "n1"}]}));
    }

    #[tokio::test]
    async fn test_show_wraps_resource_key() {
        let (_, controller) =
            controller_with(RecordingPlugin::with_objects(vec![json!({"id": "n1"})]));

        let out = controller
            .show(&RequestContext::new(), "n1", &RequestQuery::default())
            .await
            .unwrap();
        assert_eq!(out, json!({"network": {"id": "n1"}}));
    }

    #[tokio::test]
    async fn test_show_is_idempotent_with_stable_backend() {
        let (_, controller) =
            controller_with(RecordingPlugin::with_objects(vec![json!({"id": "n1"})]));
        let ctx = RequestContext::new();
        let query = RequestQuery::default();

        let first = controller.show(&ctx, "n1", &query).await.unwrap();
        let second = controller.show(&ctx, "n1", &query).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_bypasses_body_preparation() {
        // Create hands the raw envelope through even though "name" is
        // mandatory for update. The asymmetry is intentional.
        let (plugin, controller) =
            controller_with(RecordingPlugin::with_objects(vec![json!({"id": "n1"})]));

        let body = json!({"network": {}});
        controller
            .create(&RequestContext::new(), body.clone())
            .await
            .unwrap();
        assert_eq!(*plugin.last_body.lock().unwrap(), Some(body));
    }

    #[tokio::test]
    async fn test_update_materializes_defaults_for_plugin() {
        let (plugin, controller) =
            controller_with(RecordingPlugin::with_objects(vec![json!({"id": "n1"})]));

        controller
            .update(
                &RequestContext::new(),
                "n1",
                Some(json!({"network": {"name": "net1"}})),
            )
            .await
            .unwrap();

        assert_eq!(
            *plugin.last_body.lock().unwrap(),
            Some(json!({"network": {"name": "net1", "admin_state_up": true}}))
        );
    }

    #[tokio::test]
    async fn test_update_missing_mandatory_attribute_fails() {
        let (plugin, controller) = controller_with(RecordingPlugin::with_objects(vec![]));

        let err = controller
            .update(&RequestContext::new(), "n1", Some(json!({"network": {}})))
            .await
            .unwrap_err();

        match err {
            ControllerError::MissingParameter { ref attr, .. } => assert_eq!(attr, "name"),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        // The plugin was never reached.
        assert!(plugin.last_body.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_produces_no_body() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        controller
            .delete(&RequestContext::new(), "n1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mapped_domain_error_surfaces_as_fault() {
        let (_, controller) = controller_with(RecordingPlugin::failing(
            DomainError::network_not_found("n1"),
        ));

        let err = controller
            .show(&RequestContext::new(), "n1", &RequestQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        match err {
            ControllerError::Fault(fault) => assert_eq!(fault.body.kind, "NetworkNotFound"),
            other => panic!("expected Fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unmapped_domain_error_preserved() {
        let original = DomainError::ip_address_in_use("n1", "10.0.0.2");
        let (_, controller) = controller_with(RecordingPlugin::failing(original.clone()));

        let err = controller
            .delete(&RequestContext::new(), "p1")
            .await
            .unwrap_err();
        match err {
            ControllerError::Domain(domain) => assert_eq!(domain, original),
            other => panic!("expected Domain, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_body_absent_becomes_empty_envelope() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));

        // An absent body is normalized to {resource: {}} before validation,
        // so it fails on the first mandatory attribute.
        let err = controller.prepare_request_body(None).unwrap_err();
        match err {
            ControllerError::MissingParameter { attr, .. } => assert_eq!(attr, "name"),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_body_null_treated_as_absent() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let err = controller
            .prepare_request_body(Some(Value::Null))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_prepare_body_missing_resource_key() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let err = controller
            .prepare_request_body(Some(json!({"port": {"name": "p1"}})))
            .unwrap_err();

        match err {
            ControllerError::MissingResourceKey { ref resource } => {
                assert_eq!(resource, "network");
            }
            other => panic!("expected MissingResourceKey, got {other:?}"),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_prepare_body_non_object_resource_value() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let err = controller
            .prepare_request_body(Some(json!({"network": "bogus"})))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_prepare_body_fills_defaults() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let prepared = controller
            .prepare_request_body(Some(json!({"network": {"name": "net1"}})))
            .unwrap();
        assert_eq!(
            prepared,
            json!({"network": {"name": "net1", "admin_state_up": true}})
        );
    }

    #[test]
    fn test_prepare_body_submitted_value_beats_default() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let prepared = controller
            .prepare_request_body(Some(json!({
                "network": {"name": "net1", "admin_state_up": false}
            })))
            .unwrap();
        assert_eq!(
            prepared,
            json!({"network": {"name": "net1", "admin_state_up": false}})
        );
    }

    #[test]
    fn test_prepare_body_explicit_null_fails_even_with_default() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let err = controller
            .prepare_request_body(Some(json!({
                "network": {"name": "net1", "admin_state_up": null}
            })))
            .unwrap_err();

        match err {
            ControllerError::MissingParameter { attr, .. } => assert_eq!(attr, "admin_state_up"),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_body_fails_on_first_missing_attribute() {
        let plugin = Arc::new(RecordingPlugin::with_objects(vec![]));
        let controller = ResourceController::new(
            plugin,
            "networks",
            "network",
            ResourceSchema::new().with_required("name").with_required("cidr"),
            identity_view(),
            FaultMap::default(),
        );

        // Both attributes are missing; only the first is reported.
        let err = controller
            .prepare_request_body(Some(json!({"network": {}})))
            .unwrap_err();
        match err {
            ControllerError::MissingParameter { attr, .. } => assert_eq!(attr, "name"),
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_body_extra_attributes_untouched() {
        let (_, controller) = controller_with(RecordingPlugin::with_objects(vec![]));
        let prepared = controller
            .prepare_request_body(Some(json!({
                "network": {"name": "net1", "custom": "kept"}
            })))
            .unwrap();
        assert_eq!(prepared["network"]["custom"], json!("kept"));
    }
}
