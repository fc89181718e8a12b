//! Ambient request context
//!
//! Every plugin call receives a [`RequestContext`] describing the caller:
//! tenant scope, user identity, and whether the request carries the admin
//! role. The context is assembled from trusted gateway headers; this layer
//! performs no authentication of its own.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::{request::Parts, HeaderMap};

/// Header carrying the tenant identifier
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Header carrying the user identifier
pub const USER_HEADER: &str = "x-user-id";

/// Header carrying a comma-separated role list
pub const ROLES_HEADER: &str = "x-roles";

/// Caller identity and scope threaded into every backend call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Tenant owning the request, if scoped
    pub tenant_id: Option<String>,

    /// Authenticated user, if known
    pub user_id: Option<String>,

    /// Whether the request carries the admin role
    pub is_admin: bool,
}

impl RequestContext {
    /// Create an empty, unscoped context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tenant identifier
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the user identifier
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Mark the context as admin-scoped
    #[must_use]
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// Build a context from gateway headers
    ///
    /// # Example
    ///
    /// ```rust
    /// use gridway::api::RequestContext;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-tenant-id", "t-1".parse().unwrap());
    /// headers.insert("x-roles", "member,admin".parse().unwrap());
    ///
    /// let ctx = RequestContext::from_headers(&headers);
    /// assert_eq!(ctx.tenant_id.as_deref(), Some("t-1"));
    /// assert!(ctx.is_admin);
    /// ```
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let is_admin = header_str(ROLES_HEADER)
            .map(|roles| roles.split(',').any(|role| role.trim() == "admin"))
            .unwrap_or(false);

        Self {
            tenant_id: header_str(TENANT_HEADER),
            user_id: header_str(USER_HEADER),
            is_admin,
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_default_is_unscoped() {
        let ctx = RequestContext::new();
        assert!(ctx.tenant_id.is_none());
        assert!(ctx.user_id.is_none());
        assert!(!ctx.is_admin);
    }

    #[test]
    fn test_context_builder() {
        let ctx = RequestContext::new()
            .with_tenant("t-1")
            .with_user("u-1")
            .with_admin(true);
        assert_eq!(ctx.tenant_id.as_deref(), Some("t-1"));
        assert_eq!(ctx.user_id.as_deref(), Some("u-1"));
        assert!(ctx.is_admin);
    }

    #[test]
    fn test_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, "t-9".parse().unwrap());
        headers.insert(USER_HEADER, "u-9".parse().unwrap());

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.tenant_id.as_deref(), Some("t-9"));
        assert_eq!(ctx.user_id.as_deref(), Some("u-9"));
        assert!(!ctx.is_admin);
    }

    #[test]
    fn test_context_admin_role_detection() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLES_HEADER, "member, admin".parse().unwrap());
        assert!(RequestContext::from_headers(&headers).is_admin);

        let mut headers = HeaderMap::new();
        headers.insert(ROLES_HEADER, "member,administrator".parse().unwrap());
        assert!(!RequestContext::from_headers(&headers).is_admin);
    }

    #[test]
    fn test_context_missing_headers() {
        let ctx = RequestContext::from_headers(&HeaderMap::new());
        assert_eq!(ctx, RequestContext::default());
    }
}
