//! Single-request HTTP transport.
//!
//! A [`Transport`] performs exactly one request and reports non-success
//! statuses as [`HelpdeskError::Http`] with the literal status code. There
//! are no retries at this layer.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use http::HttpTransport;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReply, MockTransport, RecordedRequest};

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::HelpdeskError;

/// Everything but RFC 3986 unreserved characters is percent-encoded, in
/// path segments and query components alike.
pub(crate) const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `Accept` value for listing calls.
pub const ACCEPT_JSON: &str = "application/json";

/// `Accept` value for delete calls.
pub const ACCEPT_TEXT: &str = "text/plain";

/// HTTP method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the tenant base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    /// Query parameters, sent in order.
    pub query: Vec<(String, String)>,
    /// Optional JSON request body.
    pub body: Option<Value>,
    /// Requested response content type.
    pub accept: &'static str,
}

impl ApiRequest {
    /// GET request expecting JSON.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            accept: ACCEPT_JSON,
        }
    }

    /// DELETE request accepting plain text.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query: Vec::new(),
            body: None,
            accept: ACCEPT_TEXT,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first query parameter named `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body of a response declaring a JSON content type.
    Json(Value),
    /// Any other body, kept verbatim.
    Text(String),
}

impl ResponseBody {
    /// Decode raw body text according to the response content type.
    ///
    /// An empty JSON body decodes to `null`.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Json`] if a JSON body does not parse.
    pub fn decode(content_type: Option<&str>, text: String) -> Result<Self, HelpdeskError> {
        let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        if !is_json {
            return Ok(Self::Text(text));
        }
        if text.trim().is_empty() {
            return Ok(Self::Json(Value::Null));
        }
        Ok(Self::Json(serde_json::from_str(&text)?))
    }

    /// Stringified body, as carried by [`HelpdeskError::Http`].
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }
}

/// Performs one authenticated request against the helpdesk.
pub trait Transport {
    /// Send `request` and return the decoded body.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Http`] for error statuses, or a transport
    /// or decoding error.
    fn send(&self, request: &ApiRequest) -> Result<ResponseBody, HelpdeskError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ResponseBody, HelpdeskError> {
        (**self).send(request)
    }
}

/// Build the error for a non-success status.
pub(crate) fn http_error(status: u16, body: ResponseBody) -> HelpdeskError {
    let status_text = ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
        .to_owned();
    HelpdeskError::Http {
        status,
        status_text,
        body: body.into_string(),
    }
}
