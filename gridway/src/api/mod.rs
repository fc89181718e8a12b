//! Resource API framework
//!
//! This module turns a backend [`ResourcePlugin`] into a routed REST
//! collection. The pieces compose in one direction:
//!
//! - [`query`] normalizes the request query string into fields, filters,
//!   and verbosity facets
//! - [`context`] carries caller identity from trusted gateway headers
//! - [`schema`] declares the attributes a resource body may carry
//! - [`fault`] translates backend domain errors into protocol faults
//! - [`plugin`] is the backend contract a controller dispatches to
//! - [`views`] shape internal objects into public representations
//! - [`controller`] runs the five CRUD operations and body preparation
//! - [`formats`] negotiate the wire serialization
//! - [`resource`] binds everything to an axum router
//!
//! Most applications only touch [`ResourceBuilder`] or [`create_resource`]
//! and implement [`ResourcePlugin`] for their backend.

pub mod context;
pub mod controller;
pub mod fault;
pub mod formats;
pub mod plugin;
pub mod query;
pub mod resource;
pub mod schema;
pub mod views;

pub use context::{RequestContext, ROLES_HEADER, TENANT_HEADER, USER_HEADER};
pub use controller::{ControllerError, ResourceController};
pub use fault::{
    BoundaryError, DomainError, DomainErrorKind, Fault, FaultBody, FaultBoundary, FaultEnvelope,
    FaultKind, FaultMap,
};
pub use formats::{BodyFormat, FormatError, FormatRegistry, JsonFormat};
pub use plugin::ResourcePlugin;
pub use query::{
    extract_fields, extract_filters, extract_verbose, RequestQuery, Verbosity, FIELDS_KEY,
    VERBOSE_KEY,
};
pub use resource::{create_resource, ResourceBuilder};
pub use schema::{ParamDescriptor, ResourceSchema};
pub use views::{identity_view, project_fields, ViewFn, ViewRegistry};
