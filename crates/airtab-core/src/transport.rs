//! The transport seam between the table operations and the network.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::Result;

/// HTTP method of a table request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performs requests against a base.
///
/// `path` is relative to the base and already escaped: `Table` or
/// `Table/recXXXXXXXXXXXXXX`. `query` is an encoded query string without the
/// leading `?`, possibly empty. Implementations apply authentication, rate
/// limiting and retries, and turn service error envelopes into
/// [`Error::Request`](crate::Error::Request) (see [`check_for_service_error`]).
///
/// Calls block until the response body has been read.
pub trait Transport: Send + Sync {
    fn request(&self, method: Method, path: &str, query: &str, body: Option<&[u8]>)
    -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        (**self).request(method, path, query, body)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        (**self).request(method, path, query, body)
    }
}

/// An error envelope returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Error type, e.g. `NOT_FOUND` or `INVALID_REQUEST_UNKNOWN`.
    pub kind: Option<String>,
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) if self.message.is_empty() => f.write_str(kind),
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Value,
}

/// Check a response body for the service's error envelope.
///
/// The service reports errors as `{"error": {"type": ..., "message": ...}}`
/// or `{"error": "NOT_FOUND"}`. Any non-null `error` member is an error. A
/// body that is not JSON at all is reported as an error too.
pub fn check_for_service_error(bytes: &[u8]) -> std::result::Result<(), ServiceError> {
    let envelope: ErrorEnvelope = serde_json::from_slice(bytes).map_err(|e| ServiceError {
        kind: None,
        message: format!("couldn't unmarshal response: {e}"),
    })?;

    match envelope.error {
        Value::Null => Ok(()),
        Value::String(kind) => Err(ServiceError {
            kind: Some(kind),
            message: String::new(),
        }),
        Value::Object(map) => Err(ServiceError {
            kind: map.get("type").and_then(Value::as_str).map(str::to_string),
            message: map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        other => Err(ServiceError {
            kind: None,
            message: other.to_string(),
        }),
    }
}
