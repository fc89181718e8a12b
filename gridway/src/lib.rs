//! # gridway
//!
//! Resource controller framework for network-management REST APIs.
//!
//! gridway turns a backend plugin into a routed REST collection. One
//! controller per resource type handles listing, fetching, creating,
//! updating, and deleting, with request normalization (field selection,
//! filters, verbosity), schema-driven body preparation, per-resource view
//! projection, and a configurable mapping from backend domain errors to
//! protocol faults.
//!
//! ## Features
//!
//! - **Explicit plugin contract**: backends implement one trait; every
//!   operation is resolved at construction time
//! - **Fault boundary**: mapped domain errors become protocol faults with a
//!   stable wire shape, unmapped errors propagate unchanged
//! - **Body preparation**: mutation bodies are validated against a declared
//!   schema with defaults materialized before the backend sees them
//! - **Views**: per-resource projection keeps internal attributes private
//! - **Ambient stack**: figment configuration, JSON tracing, tower-http
//!   middleware, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use gridway::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn plugin() -> Arc<dyn ResourcePlugin> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     // Bind a resource to its routes
//!     let schema = ResourceSchema::new()
//!         .with_required("name")
//!         .with_default("admin_state_up", json!(true));
//!     let app = create_resource(plugin(), "networks", "network", schema)?;
//!
//!     // Run server
//!     Server::new(config).serve(app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod observability;
pub mod server;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{
        create_resource, identity_view, project_fields, BodyFormat, ControllerError, DomainError,
        DomainErrorKind, Fault, FaultBoundary, FaultKind, FaultMap, FormatRegistry, JsonFormat,
        ParamDescriptor, RequestContext, RequestQuery, ResourceBuilder, ResourceController,
        ResourcePlugin, ResourceSchema, Verbosity, ViewFn, ViewRegistry,
    };

    pub use crate::config::{Config, MiddlewareConfig, ServiceConfig};

    pub use crate::error::{Error, ErrorResponse, Result};

    pub use crate::observability::{init_tracing, shutdown_tracing};

    pub use crate::server::Server;

    pub use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, HeaderValue, StatusCode},
        response::{IntoResponse, Json, Response},
        routing::{delete, get, patch, post, put},
        Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros and types
    pub use tracing::{debug, error, info, instrument, trace, warn, Level, Span};

    // Re-export tokio for async runtime
    pub use tokio;

    // Re-export async-trait for async trait definitions
    pub use async_trait::async_trait;

    pub use serde_json::Value;
}
