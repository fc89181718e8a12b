//! Request query normalization
//!
//! Every incoming request carries up to three orthogonal query facets:
//!
//! - **Field projection** via the reserved `show` key: which attributes the
//!   caller wants in the response.
//! - **Filters**: every other repeatable key, treated as a multi-valued
//!   equality filter for the backend.
//! - **Verbosity** via the reserved `verbose` key: how much nested or related
//!   data to include, either as a plain boolean or as backend-interpreted
//!   tokens.
//!
//! [`RequestQuery`] captures all three as an immutable per-request value. It
//! is computed fresh from each request and never persisted.
//!
//! # Example
//!
//! ```rust
//! use gridway::api::RequestQuery;
//!
//! let query = RequestQuery::from_query_str("show=id&show=name&status=ACTIVE&verbose=true");
//!
//! assert!(query.fields.contains("id"));
//! assert!(query.fields.contains("name"));
//! assert_eq!(query.filters["status"], vec!["ACTIVE"]);
//! assert!(query.is_verbose());
//! ```

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;
use url::form_urlencoded;

/// Reserved query key selecting output fields
pub const FIELDS_KEY: &str = "show";

/// Reserved query key controlling verbosity
pub const VERBOSE_KEY: &str = "verbose";

/// A single verbosity marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verbosity {
    /// Full verbosity was requested with an explicit boolean true
    Full,
    /// A custom token passed through for backend interpretation
    Token(String),
}

/// Normalized query facets for a single request
///
/// Construction resolves the verbosity markers up front: any explicit true
/// token wins outright and collapses the sequence to `[Full]`; any explicit
/// false token (with no true present) disables verbosity entirely; otherwise
/// the raw non-boolean tokens pass through in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQuery {
    /// Requested output projection, from repeated `show` values
    pub fields: HashSet<String>,

    /// Multi-valued equality filters, keyed by query parameter name.
    /// Reserved keys (`show`, `verbose`) never appear here, and a key whose
    /// submitted values are all empty is excluded entirely.
    pub filters: HashMap<String, Vec<String>>,

    /// Resolved verbosity markers, already collapsed per the precedence rule
    pub verbose: Vec<Verbosity>,
}

impl RequestQuery {
    /// Parse a raw query string into its normalized facets
    ///
    /// # Example
    ///
    /// ```rust
    /// use gridway::api::RequestQuery;
    ///
    /// let query = RequestQuery::from_query_str("name=net1&name=net2&verbose=false");
    /// assert_eq!(query.filters["name"], vec!["net1", "net2"]);
    /// assert!(query.verbose.is_empty());
    /// ```
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        Self {
            fields: extract_fields(&pairs),
            filters: extract_filters(&pairs),
            verbose: extract_verbose(&pairs),
        }
    }

    /// Whether full verbosity was explicitly requested
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        matches!(self.verbose.first(), Some(Verbosity::Full))
    }

    /// Whether the caller requested a field projection
    #[must_use]
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether any filters were submitted
    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

impl<S> FromRequestParts<S> for RequestQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query_str(parts.uri.query().unwrap_or("")))
    }
}

/// Collect every non-empty value under the reserved `show` key
#[must_use]
pub fn extract_fields(pairs: &[(String, String)]) -> HashSet<String> {
    pairs
        .iter()
        .filter(|(key, value)| key == FIELDS_KEY && !value.is_empty())
        .map(|(_, value)| value.clone())
        .collect()
}

/// Collect filters from every non-reserved query key
///
/// Values are kept in submission order per key. Empty values are skipped, and
/// a key whose values are all empty is excluded rather than kept as an empty
/// existence filter.
#[must_use]
pub fn extract_filters(pairs: &[(String, String)]) -> HashMap<String, Vec<String>> {
    let mut filters: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in pairs {
        if key == FIELDS_KEY || key == VERBOSE_KEY || value.is_empty() {
            continue;
        }
        filters.entry(key.clone()).or_default().push(value.clone());
    }
    filters
}

/// Collect and resolve the `verbose` markers
///
/// Each non-empty value is first normalized from a loose boolean token.
/// Resolution precedence: any true collapses to `[Full]`, else any false
/// yields the empty sequence, else the raw tokens pass through in order.
#[must_use]
pub fn extract_verbose(pairs: &[(String, String)]) -> Vec<Verbosity> {
    let mut saw_true = false;
    let mut saw_false = false;
    let mut tokens = Vec::new();

    for (key, value) in pairs {
        if key != VERBOSE_KEY || value.is_empty() {
            continue;
        }
        match parse_bool_token(value) {
            Some(true) => saw_true = true,
            Some(false) => saw_false = true,
            None => tokens.push(value.clone()),
        }
    }

    if saw_true {
        vec![Verbosity::Full]
    } else if saw_false {
        Vec::new()
    } else {
        tokens.into_iter().map(Verbosity::Token).collect()
    }
}

/// Normalize a loose boolean token, case-insensitively
///
/// Accepts `true/t/yes/y/on/1` and `false/f/no/n/off/0`. Anything else is
/// not a boolean and returns `None`.
fn parse_bool_token(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
