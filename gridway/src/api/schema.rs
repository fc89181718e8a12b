//! Parameter schemas for resource bodies
//!
//! A [`ResourceSchema`] declares, in order, which attributes a resource body
//! carries and which of them have defaults. Attributes without a default are
//! mandatory. The controller consults the schema when preparing mutation
//! bodies, writing resolved defaults back into the body so backends always
//! see fully materialized attributes.
//!
//! # Example
//!
//! ```rust
//! use gridway::api::ResourceSchema;
//! use serde_json::json;
//!
//! let schema = ResourceSchema::new()
//!     .with_required("name")
//!     .with_default("admin_state_up", json!(true));
//!
//! assert_eq!(schema.len(), 2);
//! assert!(schema.get("name").unwrap().is_required());
//! ```

use serde_json::Value;

/// A single attribute descriptor within a resource schema
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    /// Attribute name within the resource body
    pub attr: String,

    /// Value applied when the attribute is not submitted. Absent means the
    /// attribute is mandatory.
    pub default: Option<Value>,
}

impl ParamDescriptor {
    /// Create a mandatory descriptor
    pub fn required(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            default: None,
        }
    }

    /// Create an optional descriptor with a default value
    pub fn with_default(attr: impl Into<String>, default: Value) -> Self {
        Self {
            attr: attr.into(),
            default: Some(default),
        }
    }

    /// Whether the attribute must be submitted by the caller
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered attribute schema for a resource type
///
/// Attribute names are unique within a schema. Declaring an attribute twice
/// replaces the earlier descriptor in place, keeping its original position.
///
/// # Example
///
/// ```rust
/// use gridway::api::ResourceSchema;
/// use serde_json::json;
///
/// let schema = ResourceSchema::new()
///     .with_required("name")
///     .with_default("admin_state_up", json!(true))
///     .with_default("shared", json!(false));
///
/// let attrs: Vec<&str> = schema.params().iter().map(|p| p.attr.as_str()).collect();
/// assert_eq!(attrs, vec!["name", "admin_state_up", "shared"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    params: Vec<ParamDescriptor>,
}

impl ResourceSchema {
    /// Create an empty schema
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mandatory attribute
    #[must_use]
    pub fn with_required(self, attr: impl Into<String>) -> Self {
        self.with_param(ParamDescriptor::required(attr))
    }

    /// Add an optional attribute with a default value
    #[must_use]
    pub fn with_default(self, attr: impl Into<String>, default: Value) -> Self {
        self.with_param(ParamDescriptor::with_default(attr, default))
    }

    /// Add a descriptor, replacing any earlier descriptor with the same name
    #[must_use]
    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        match self.params.iter_mut().find(|p| p.attr == param.attr) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
        self
    }

    /// Descriptors in declared order
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Look up a descriptor by attribute name
    #[must_use]
    pub fn get(&self, attr: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.attr == attr)
    }

    /// Number of declared attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the schema declares no attributes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
