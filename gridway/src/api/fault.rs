//! Domain error to protocol fault translation
//!
//! Backends report business-rule violations as [`DomainError`] values. A
//! [`FaultMap`] declares which error kinds are client-visible and what
//! protocol class they map to; the [`FaultBoundary`] applies that mapping at
//! the plugin-call seam, once, when the controller is constructed. A mapped
//! error becomes a [`Fault`] with a structured body; an unmapped error passes
//! through unchanged for the transport layer to surface as a server error.
//!
//! # Example
//!
//! ```rust
//! use gridway::api::{DomainError, DomainErrorKind, FaultKind, FaultMap};
//!
//! let faults = FaultMap::default();
//! assert_eq!(
//!     faults.get(DomainErrorKind::NetworkNotFound),
//!     Some(FaultKind::NotFound)
//! );
//!
//! // Unmapped kinds propagate unchanged through the boundary.
//! assert!(faults.get(DomainErrorKind::MacAddressInUse).is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::context::RequestContext;
use super::plugin::ResourcePlugin;
use super::query::RequestQuery;

/// Business-rule violations a backend plugin can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainErrorKind {
    /// Network does not exist
    NetworkNotFound,
    /// Subnet does not exist
    SubnetNotFound,
    /// Port does not exist
    PortNotFound,
    /// Network still has ports attached
    NetworkInUse,
    /// Subnet still has allocations
    SubnetInUse,
    /// Port still has an attachment
    PortInUse,
    /// Requested state transition is not supported
    StateInvalid,
    /// MAC address already allocated
    MacAddressInUse,
    /// IP address already allocated
    IpAddressInUse,
}

impl DomainErrorKind {
    /// Kind name as it appears in fault bodies
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NetworkNotFound => "NetworkNotFound",
            Self::SubnetNotFound => "SubnetNotFound",
            Self::PortNotFound => "PortNotFound",
            Self::NetworkInUse => "NetworkInUse",
            Self::SubnetInUse => "SubnetInUse",
            Self::PortInUse => "PortInUse",
            Self::StateInvalid => "StateInvalid",
            Self::MacAddressInUse => "MacAddressInUse",
            Self::IpAddressInUse => "IpAddressInUse",
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkNotFound => write!(f, "network_not_found"),
            Self::SubnetNotFound => write!(f, "subnet_not_found"),
            Self::PortNotFound => write!(f, "port_not_found"),
            Self::NetworkInUse => write!(f, "network_in_use"),
            Self::SubnetInUse => write!(f, "subnet_in_use"),
            Self::PortInUse => write!(f, "port_in_use"),
            Self::StateInvalid => write!(f, "state_invalid"),
            Self::MacAddressInUse => write!(f, "mac_address_in_use"),
            Self::IpAddressInUse => write!(f, "ip_address_in_use"),
        }
    }
}

/// Error raised by a backend plugin for a business-rule violation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DomainError {
    /// The violation category
    pub kind: DomainErrorKind,
    /// Human-readable description
    pub message: String,
}

impl DomainError {
    /// Create a domain error with an explicit message
    pub fn new(kind: DomainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Network lookup failed
    pub fn network_not_found(net_id: &str) -> Self {
        Self::new(
            DomainErrorKind::NetworkNotFound,
            format!("Network {net_id} could not be found"),
        )
    }

    /// Subnet lookup failed
    pub fn subnet_not_found(subnet_id: &str) -> Self {
        Self::new(
            DomainErrorKind::SubnetNotFound,
            format!("Subnet {subnet_id} could not be found"),
        )
    }

    /// Port lookup failed
    pub fn port_not_found(port_id: &str, net_id: &str) -> Self {
        Self::new(
            DomainErrorKind::PortNotFound,
            format!("Port {port_id} could not be found on network {net_id}"),
        )
    }

    /// Network deletion blocked by attached ports
    pub fn network_in_use(net_id: &str) -> Self {
        Self::new(
            DomainErrorKind::NetworkInUse,
            format!(
                "Unable to complete operation on network {net_id}. \
                 There are one or more ports still in use on the network"
            ),
        )
    }

    /// Subnet deletion blocked by live allocations
    pub fn subnet_in_use(subnet_id: &str) -> Self {
        Self::new(
            DomainErrorKind::SubnetInUse,
            format!(
                "Unable to complete operation on subnet {subnet_id}. \
                 One or more ports have an IP allocation from this subnet"
            ),
        )
    }

    /// Port operation blocked by an attachment
    pub fn port_in_use(port_id: &str, net_id: &str) -> Self {
        Self::new(
            DomainErrorKind::PortInUse,
            format!(
                "Unable to complete operation on port {port_id} for network {net_id}. \
                 The port is in use"
            ),
        )
    }

    /// Unsupported state transition requested
    pub fn state_invalid(state: &str) -> Self {
        Self::new(
            DomainErrorKind::StateInvalid,
            format!("Unsupported port state: {state}"),
        )
    }

    /// MAC address already allocated on the network
    pub fn mac_address_in_use(net_id: &str, mac: &str) -> Self {
        Self::new(
            DomainErrorKind::MacAddressInUse,
            format!("Unable to complete operation for network {net_id}. The mac address {mac} is in use"),
        )
    }

    /// IP address already allocated on the network
    pub fn ip_address_in_use(net_id: &str, ip: &str) -> Self {
        Self::new(
            DomainErrorKind::IpAddressInUse,
            format!("Unable to complete operation for network {net_id}. The IP address {ip} is in use"),
        )
    }
}

/// Protocol-level fault class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Client submitted an invalid request (400)
    BadRequest,
    /// Referenced entity does not exist (404)
    NotFound,
    /// Operation conflicts with current entity state (409)
    Conflict,
}

impl FaultKind {
    /// HTTP status code for this fault class
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
        }
    }
}

static DEFAULT_FAULT_MAP: Lazy<FaultMap> = Lazy::new(|| {
    FaultMap::empty()
        .with(DomainErrorKind::NetworkNotFound, FaultKind::NotFound)
        .with(DomainErrorKind::SubnetNotFound, FaultKind::NotFound)
        .with(DomainErrorKind::PortNotFound, FaultKind::NotFound)
        .with(DomainErrorKind::NetworkInUse, FaultKind::Conflict)
        .with(DomainErrorKind::SubnetInUse, FaultKind::Conflict)
        .with(DomainErrorKind::PortInUse, FaultKind::Conflict)
        .with(DomainErrorKind::StateInvalid, FaultKind::BadRequest)
});

/// Mapping from domain-error kind to protocol fault class
///
/// Fixed after construction; the boundary only reads it. The default table
/// covers the lookup, in-use, and state kinds. Address-allocation kinds are
/// not mapped by default and therefore propagate to the transport unchanged.
///
/// # Example
///
/// ```rust
/// use gridway::api::{DomainErrorKind, FaultKind, FaultMap};
///
/// let faults = FaultMap::default()
///     .with(DomainErrorKind::MacAddressInUse, FaultKind::Conflict);
///
/// assert_eq!(
///     faults.get(DomainErrorKind::MacAddressInUse),
///     Some(FaultKind::Conflict)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultMap {
    map: HashMap<DomainErrorKind, FaultKind>,
}

impl FaultMap {
    /// Create a mapping with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Add a mapping, returning the updated table
    #[must_use]
    pub fn with(mut self, kind: DomainErrorKind, fault: FaultKind) -> Self {
        self.map.insert(kind, fault);
        self
    }

    /// Add a mapping in place
    pub fn insert(&mut self, kind: DomainErrorKind, fault: FaultKind) {
        self.map.insert(kind, fault);
    }

    /// Merge another table into this one; entries from `other` win
    pub fn merge(&mut self, other: &FaultMap) {
        for (kind, fault) in &other.map {
            self.map.insert(*kind, *fault);
        }
    }

    /// Look up the fault class for a domain-error kind
    #[must_use]
    pub fn get(&self, kind: DomainErrorKind) -> Option<FaultKind> {
        self.map.get(&kind).copied()
    }

    /// Whether the kind is mapped
    #[must_use]
    pub fn contains(&self, kind: DomainErrorKind) -> bool {
        self.map.contains_key(&kind)
    }

    /// Number of mapped kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for FaultMap {
    fn default() -> Self {
        DEFAULT_FAULT_MAP.clone()
    }
}

/// Structured fault body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultBody {
    /// Domain-error kind name
    #[serde(rename = "type")]
    pub kind: String,

    /// Human-readable description from the domain error
    pub message: String,

    /// Placeholder detail field
    pub detail: String,
}

/// Wire envelope for fault bodies: `{"Error": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultEnvelope {
    /// The fault body
    #[serde(rename = "Error")]
    pub error: FaultBody,
}

/// A protocol fault: status class plus structured body
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} fault: {message}", message = .body.message)]
pub struct Fault {
    /// Protocol fault class
    pub kind: FaultKind,
    /// Structured body returned to the caller
    pub body: FaultBody,
}

impl Fault {
    /// Build a fault from a mapped domain error
    #[must_use]
    pub fn from_domain(kind: FaultKind, err: &DomainError) -> Self {
        Self {
            kind,
            body: FaultBody {
                kind: err.kind.name().to_string(),
                message: err.message.clone(),
                detail: String::new(),
            },
        }
    }

    /// HTTP status code for this fault
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        (self.kind.status_code(), Json(FaultEnvelope { error: self.body })).into_response()
    }
}

/// Failure surfaced by a fault-wrapped plugin call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoundaryError {
    /// The domain error was mapped and translated
    #[error(transparent)]
    Fault(Fault),

    /// The domain error was not mapped and propagates unchanged
    #[error(transparent)]
    Domain(DomainError),
}

/// Fault-translating decorator around a backend plugin
///
/// Constructed once per controller. Successful results pass through
/// untouched; failures are translated per the bound [`FaultMap`]. The
/// boundary holds a shared reference to the plugin and never copies or
/// intercepts plugin state.
#[derive(Clone)]
pub struct FaultBoundary {
    plugin: Arc<dyn ResourcePlugin>,
    faults: FaultMap,
}

impl FaultBoundary {
    /// Wrap a plugin with a fault mapping
    pub fn new(plugin: Arc<dyn ResourcePlugin>, faults: FaultMap) -> Self {
        Self { plugin, faults }
    }

    /// The bound fault mapping
    #[must_use]
    pub fn faults(&self) -> &FaultMap {
        &self.faults
    }

    fn translate(&self, err: DomainError) -> BoundaryError {
        match self.faults.get(err.kind) {
            Some(fault_kind) => BoundaryError::Fault(Fault::from_domain(fault_kind, &err)),
            None => BoundaryError::Domain(err),
        }
    }

    /// List objects, translating failures
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &RequestQuery,
    ) -> Result<Vec<Value>, BoundaryError> {
        self.plugin
            .list(ctx, query)
            .await
            .map_err(|e| self.translate(e))
    }

    /// Fetch one object, translating failures
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: &str,
        query: &RequestQuery,
    ) -> Result<Value, BoundaryError> {
        self.plugin
            .get(ctx, id, query)
            .await
            .map_err(|e| self.translate(e))
    }

    /// Create an object, translating failures
    pub async fn create(&self, ctx: &RequestContext, body: Value) -> Result<Value, BoundaryError> {
        self.plugin
            .create(ctx, body)
            .await
            .map_err(|e| self.translate(e))
    }

    /// Update an object, translating failures
    pub async fn update(&self, ctx: &RequestContext, body: Value) -> Result<Value, BoundaryError> {
        self.plugin
            .update(ctx, body)
            .await
            .map_err(|e| self.translate(e))
    }

    /// Delete an object, translating failures
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), BoundaryError> {
        self.plugin
            .delete(ctx, id)
            .await
            .map_err(|e| self.translate(e))
    }
}

impl fmt::Debug for FaultBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultBoundary")
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingPlugin {
        error: DomainError,
    }

    #[async_trait]
    impl ResourcePlugin for FailingPlugin {
        async fn list(
            &self,
            _ctx: &RequestContext,
            _query: &RequestQuery,
        ) -> Result<Vec<Value>, DomainError> {
            Err(self.error.clone())
        }

        async fn get(
            &self,
            _ctx: &RequestContext,
            _id: &str,
            _query: &RequestQuery,
        ) -> Result<Value, DomainError> {
            Err(self.error.clone())
        }

        async fn create(&self, _ctx: &RequestContext, _body: Value) -> Result<Value, DomainError> {
            Err(self.error.clone())
        }

        async fn update(&self, _ctx: &RequestContext, _body: Value) -> Result<Value, DomainError> {
            Err(self.error.clone())
        }

        async fn delete(&self, _ctx: &RequestContext, _id: &str) -> Result<(), DomainError> {
            Err(self.error.clone())
        }
    }

    fn boundary_for(error: DomainError) -> FaultBoundary {
        FaultBoundary::new(Arc::new(FailingPlugin { error }), FaultMap::default())
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DomainErrorKind::NetworkNotFound.name(), "NetworkNotFound");
        assert_eq!(DomainErrorKind::PortInUse.name(), "PortInUse");
        assert_eq!(format!("{}", DomainErrorKind::StateInvalid), "state_invalid");
    }

    #[test]
    fn test_fault_kind_status_codes() {
        assert_eq!(FaultKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(FaultKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(FaultKind::Conflict.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_default_fault_map_contents() {
        let faults = FaultMap::default();
        assert_eq!(
            faults.get(DomainErrorKind::NetworkNotFound),
            Some(FaultKind::NotFound)
        );
        assert_eq!(
            faults.get(DomainErrorKind::NetworkInUse),
            Some(FaultKind::Conflict)
        );
        assert_eq!(
            faults.get(DomainErrorKind::PortInUse),
            Some(FaultKind::Conflict)
        );
        assert_eq!(
            faults.get(DomainErrorKind::StateInvalid),
            Some(FaultKind::BadRequest)
        );
        assert!(faults.get(DomainErrorKind::MacAddressInUse).is_none());
        assert!(faults.get(DomainErrorKind::IpAddressInUse).is_none());
    }

    #[test]
    fn test_fault_map_merge_overrides() {
        let mut faults = FaultMap::default();
        let overrides = FaultMap::empty()
            .with(DomainErrorKind::StateInvalid, FaultKind::Conflict)
            .with(DomainErrorKind::MacAddressInUse, FaultKind::Conflict);
        faults.merge(&overrides);

        assert_eq!(
            faults.get(DomainErrorKind::StateInvalid),
            Some(FaultKind::Conflict)
        );
        assert_eq!(
            faults.get(DomainErrorKind::MacAddressInUse),
            Some(FaultKind::Conflict)
        );
        // Unrelated entries survive the merge.
        assert_eq!(
            faults.get(DomainErrorKind::NetworkNotFound),
            Some(FaultKind::NotFound)
        );
    }

    #[test]
    fn test_fault_from_domain_body_fields() {
        let err = DomainError::network_not_found("net-1");
        let fault = Fault::from_domain(FaultKind::NotFound, &err);

        assert_eq!(fault.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(fault.body.kind, "NetworkNotFound");
        assert_eq!(fault.body.message, "Network net-1 could not be found");
        assert_eq!(fault.body.detail, "");
    }

    #[test]
    fn test_fault_envelope_serialization() {
        let err = DomainError::state_invalid("FROZEN");
        let fault = Fault::from_domain(FaultKind::BadRequest, &err);
        let json = serde_json::to_value(FaultEnvelope { error: fault.body }).unwrap();

        assert_eq!(json["Error"]["type"], "StateInvalid");
        assert_eq!(json["Error"]["message"], "Unsupported port state: FROZEN");
        assert_eq!(json["Error"]["detail"], "");
    }

    #[tokio::test]
    async fn test_boundary_translates_mapped_error() {
        let boundary = boundary_for(DomainError::network_not_found("net-1"));
        let err = boundary
            .get(&RequestContext::new(), "net-1", &RequestQuery::default())
            .await
            .unwrap_err();

        match err {
            BoundaryError::Fault(fault) => {
                assert_eq!(fault.kind, FaultKind::NotFound);
                assert_eq!(fault.body.kind, "NetworkNotFound");
            }
            BoundaryError::Domain(_) => panic!("mapped error must become a fault"),
        }
    }

    #[tokio::test]
    async fn test_boundary_passes_unmapped_error_unchanged() {
        let original = DomainError::mac_address_in_use("net-1", "aa:bb:cc:dd:ee:ff");
        let boundary = boundary_for(original.clone());
        let err = boundary
            .delete(&RequestContext::new(), "port-1")
            .await
            .unwrap_err();

        match err {
            BoundaryError::Domain(domain) => assert_eq!(domain, original),
            BoundaryError::Fault(_) => panic!("unmapped error must not be translated"),
        }
    }

    #[tokio::test]
    async fn test_boundary_respects_custom_map() {
        let plugin = Arc::new(FailingPlugin {
            error: DomainError::ip_address_in_use("net-1", "10.0.0.2"),
        });
        let faults =
            FaultMap::default().with(DomainErrorKind::IpAddressInUse, FaultKind::Conflict);
        let boundary = FaultBoundary::new(plugin, faults);

        let err = boundary
            .create(&RequestContext::new(), Value::Null)
            .await
            .unwrap_err();
        match err {
            BoundaryError::Fault(fault) => assert_eq!(fault.kind, FaultKind::Conflict),
            BoundaryError::Domain(_) => panic!("custom mapping must apply"),
        }
    }
}
