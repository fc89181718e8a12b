//! Wire format negotiation
//!
//! Request and response bodies pass through a [`BodyFormat`] chosen per
//! request from the `Content-Type` header. The registry ships with JSON and
//! falls back to its default format when the header is absent or names an
//! unknown media type, so a bare `curl` without headers still works.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use serde_json::Value;
use thiserror::Error;

/// Failure to read or produce a wire body
#[derive(Debug, Error)]
pub enum FormatError {
    /// The body could not be parsed as the negotiated format
    #[error("malformed {content_type} body: {source}")]
    Malformed {
        content_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An internal object could not be rendered
    #[error("failed to serialize {content_type} body: {source}")]
    Serialize {
        content_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A bidirectional mapping between wire bytes and internal objects
pub trait BodyFormat: Send + Sync {
    /// Media type this format handles, also used as the response `Content-Type`
    fn content_type(&self) -> &'static str;

    /// Render an internal object to wire bytes
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, FormatError>;

    /// Parse wire bytes into an internal object
    fn deserialize(&self, bytes: &[u8]) -> Result<Value, FormatError>;
}

/// JSON wire format
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl BodyFormat for JsonFormat {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, FormatError> {
        serde_json::to_vec(value).map_err(|source| FormatError::Serialize {
            content_type: self.content_type(),
            source,
        })
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, FormatError> {
        serde_json::from_slice(bytes).map_err(|source| FormatError::Malformed {
            content_type: self.content_type(),
            source,
        })
    }
}

/// Lookup table from media type to body format
///
/// # Example
///
/// ```rust
/// use gridway::api::FormatRegistry;
/// use http::HeaderMap;
///
/// let formats = FormatRegistry::new();
/// let mut headers = HeaderMap::new();
/// headers.insert("content-type", "application/json".parse().unwrap());
///
/// let format = formats.negotiate(&headers);
/// assert_eq!(format.content_type(), "application/json");
/// ```
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<&'static str, Arc<dyn BodyFormat>>,
    default: Arc<dyn BodyFormat>,
}

impl FormatRegistry {
    /// Create a registry with JSON registered as the default format
    #[must_use]
    pub fn new() -> Self {
        let json: Arc<dyn BodyFormat> = Arc::new(JsonFormat);
        let mut formats: HashMap<&'static str, Arc<dyn BodyFormat>> = HashMap::new();
        formats.insert(json.content_type(), Arc::clone(&json));
        Self {
            formats,
            default: json,
        }
    }

    /// Register a format, returning the updated registry
    #[must_use]
    pub fn with_format(mut self, format: Arc<dyn BodyFormat>) -> Self {
        self.formats.insert(format.content_type(), format);
        self
    }

    /// Register a format in place
    pub fn register(&mut self, format: Arc<dyn BodyFormat>) {
        self.formats.insert(format.content_type(), format);
    }

    /// Look up a format by exact media type
    #[must_use]
    pub fn get(&self, content_type: &str) -> Option<Arc<dyn BodyFormat>> {
        self.formats.get(content_type).cloned()
    }

    /// The fallback format used when negotiation finds no match
    #[must_use]
    pub fn default_format(&self) -> Arc<dyn BodyFormat> {
        Arc::clone(&self.default)
    }

    /// Choose a format from request headers
    ///
    /// Media type parameters such as `; charset=utf-8` are ignored. Missing
    /// or unrecognized types resolve to the default format.
    #[must_use]
    pub fn negotiate(&self, headers: &HeaderMap) -> Arc<dyn BodyFormat> {
        headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim())
            .and_then(|media_type| self.get(media_type))
            .unwrap_or_else(|| self.default_format())
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .field("default", &self.default.content_type())
            .finish()
    }
}
