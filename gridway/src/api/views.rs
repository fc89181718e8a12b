//! View formatting
//!
//! A view maps an internal object to its public representation. Views are
//! registered per resource name and invoked by the controller on every
//! object it returns, so backends never shape external payloads themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// A per-resource projection from internal object to public representation
pub type ViewFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Lookup table from resource name to view function
///
/// # Example
///
/// ```rust
/// use gridway::api::{project_fields, ViewRegistry};
/// use serde_json::json;
///
/// let views = ViewRegistry::new()
///     .with_view("network", project_fields(&["id", "name"]));
///
/// let view = views.get("network").unwrap();
/// let public = view(&json!({"id": "n1", "name": "net1", "secret": "x"}));
/// assert_eq!(public, json!({"id": "n1", "name": "net1"}));
/// ```
#[derive(Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<String, ViewFn>,
}

impl ViewRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view, returning the updated registry
    #[must_use]
    pub fn with_view(mut self, resource: impl Into<String>, view: ViewFn) -> Self {
        self.views.insert(resource.into(), view);
        self
    }

    /// Register a view in place
    pub fn register(&mut self, resource: impl Into<String>, view: ViewFn) {
        self.views.insert(resource.into(), view);
    }

    /// Look up the view for a resource name
    #[must_use]
    pub fn get(&self, resource: &str) -> Option<ViewFn> {
        self.views.get(resource).cloned()
    }

    /// Registered resource names
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("resources", &self.views.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Build a view that projects an object down to the named fields
///
/// Fields absent from the object are omitted rather than emitted as null.
/// Non-object values pass through unchanged.
#[must_use]
pub fn project_fields(fields: &[&str]) -> ViewFn {
    let fields: Vec<String> = fields.iter().map(|f| (*f).to_string()).collect();
    Arc::new(move |value: &Value| match value.as_object() {
        Some(obj) => {
            let mut out = Map::new();
            for field in &fields {
                if let Some(v) = obj.get(field) {
                    out.insert(field.clone(), v.clone());
                }
            }
            Value::Object(out)
        }
        None => value.clone(),
    })
}

/// Build a view that returns the object unchanged
#[must_use]
pub fn identity_view() -> ViewFn {
    Arc::new(Value::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_lookup() {
        let views = ViewRegistry::new().with_view("network", identity_view());
        assert!(views.get("network").is_some());
        assert!(views.get("port").is_none());
    }

    #[test]
    fn test_registry_register_in_place() {
        let mut views = ViewRegistry::new();
        views.register("port", identity_view());
        assert!(views.get("port").is_some());
    }

    #[test]
    fn test_project_fields_restricts_output() {
        let view = project_fields(&["id", "name"]);
        let public = view(&json!({"id": "n1", "name": "net1", "tenant_id": "t1"}));
        assert_eq!(public, json!({"id": "n1", "name": "net1"}));
    }

    #[test]
    fn test_project_fields_omits_missing_fields() {
        let view = project_fields(&["id", "mtu"]);
        let public = view(&json!({"id": "n1"}));
        assert_eq!(public, json!({"id": "n1"}));
    }

    #[test]
    fn test_project_fields_non_object_passes_through() {
        let view = project_fields(&["id"]);
        assert_eq!(view(&json!("raw")), json!("raw"));
    }

    #[test]
    fn test_identity_view() {
        let view = identity_view();
        let obj = json!({"id": "n1", "name": "net1"});
        assert_eq!(view(&obj), obj);
    }
}
