//! HTTP request types for the SAP Incentive Management API.
//!
//! This module provides the [`HttpRequest`] type and its builder. A request
//! is a method, a path relative to the tenant base URL, query parameters and
//! an optional JSON body.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Status codes that count as success for this method.
    ///
    /// Any other 2xx answer is treated as an unexpected response.
    #[must_use]
    pub const fn success_codes(self) -> &'static [u16] {
        match self {
            Self::Get | Self::Put | Self::Delete => &[200],
            Self::Post => &[200, 201],
        }
    }

    /// Whether sending the request twice has the same effect as sending it once.
    ///
    /// Only idempotent requests are retried after the server may have seen
    /// them.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        !matches!(self, Self::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// An HTTP request to be sent to the API.
///
/// Use [`HttpRequest::builder`] to construct requests with the builder pattern.
///
/// # Example
///
/// ```rust
/// use sapim::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let list = HttpRequest::builder(HttpMethod::Get, "api/v2/participants")
///     .query_param("top", "50")
///     .build()
///     .unwrap();
/// assert_eq!(list.query.get("top").map(String::as_str), Some("50"));
///
/// let create = HttpRequest::builder(HttpMethod::Post, "api/v2/participants")
///     .body(json!([{"payeeId": "P-1"}]))
///     .build()
///     .unwrap();
/// assert!(create.body.is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The path relative to the base URL, e.g. `api/v2/participants`.
    pub path: String,
    /// The JSON request body, if any.
    pub body: Option<serde_json::Value>,
    /// Query parameters to append to the URL.
    pub query: HashMap<String, String>,
    /// Additional headers to include in the request.
    pub extra_headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the path is empty, if a POST or
    /// PUT has no body, or if a GET or DELETE carries one.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.path.trim().is_empty() {
            return Err(InvalidHttpRequestError::EmptyPath);
        }

        match (self.http_method, &self.body) {
            (HttpMethod::Post | HttpMethod::Put, None) => Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            }),
            (HttpMethod::Get | HttpMethod::Delete, Some(_)) => {
                Err(InvalidHttpRequestError::UnexpectedBody {
                    method: self.http_method.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    query: HashMap<String, String>,
    extra_headers: HashMap<String, String>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            query: HashMap::new(),
            extra_headers: HashMap::new(),
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds all query parameters from `query`.
    #[must_use]
    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.query.extend(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Builds the request, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if validation fails.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            query: self.query,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_success_codes_per_method() {
        assert_eq!(HttpMethod::Get.success_codes(), &[200]);
        assert_eq!(HttpMethod::Post.success_codes(), &[200, 201]);
        assert_eq!(HttpMethod::Put.success_codes(), &[200]);
    }

    #[test]
    fn test_only_post_is_not_idempotent() {
        assert!(HttpMethod::Get.is_idempotent());
        assert!(HttpMethod::Put.is_idempotent());
        assert!(HttpMethod::Delete.is_idempotent());
        assert!(!HttpMethod::Post.is_idempotent());
    }

    #[test]
    fn test_verify_requires_body_for_post_and_put() {
        let post = HttpRequest::builder(HttpMethod::Post, "api/v2/titles").build();
        assert!(matches!(post, Err(InvalidHttpRequestError::MissingBody { .. })));

        let put = HttpRequest::builder(HttpMethod::Put, "api/v2/titles").build();
        assert!(matches!(put, Err(InvalidHttpRequestError::MissingBody { .. })));
    }

    #[test]
    fn test_verify_rejects_body_on_get() {
        let get = HttpRequest::builder(HttpMethod::Get, "api/v2/titles")
            .body(json!({}))
            .build();
        assert!(matches!(get, Err(InvalidHttpRequestError::UnexpectedBody { .. })));
    }

    #[test]
    fn test_verify_rejects_empty_path() {
        let get = HttpRequest::builder(HttpMethod::Get, "  ").build();
        assert!(matches!(get, Err(InvalidHttpRequestError::EmptyPath)));
    }

    #[test]
    fn test_builder_collects_query_and_headers() {
        let request = HttpRequest::builder(HttpMethod::Get, "api/v2/titles")
            .query_param("top", "10")
            .query_param("$filter", "name eq 'A'")
            .header("X-Trace", "1")
            .build()
            .unwrap();
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.extra_headers.get("X-Trace").map(String::as_str), Some("1"));
    }
}
