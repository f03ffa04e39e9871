//! HTTP-level error types.
//!
//! Every failure of the request executor is reported as an [`HttpError`].
//! The variants let callers tell apart the cases that matter:
//!
//! - [`HttpError::Authentication`]: no usable token could be obtained, or the
//!   API rejected a freshly issued one
//! - [`HttpError::ClientRequest`]: a non-retryable 4xx (or unexpected 3xx)
//! - [`HttpError::NotFound`]: a 404
//! - [`HttpError::Transient`]: 429, 5xx or connection failures that outlasted
//!   the retry budget
//! - [`HttpError::UnexpectedResponse`]: a success status with a body the
//!   client cannot use, e.g. an HTML maintenance page
//! - [`HttpError::NotModified`]: a 304
//!
//! # Example
//!
//! ```rust,ignore
//! match executor.execute(&request).await {
//!     Ok(response) => println!("{}", response.body),
//!     Err(HttpError::NotFound(e)) => println!("gone: {}", e.message),
//!     Err(e) if e.is_transient() => println!("try again later: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use thiserror::Error;

use crate::auth::AuthError;

/// A non-successful response that is not retried.
///
/// `body` is the parsed JSON body so callers can inspect API error codes.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("HTTP {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The response body rendered as a string.
    pub message: String,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// Reference ID for error reporting (from X-Request-Id header).
    pub error_reference: Option<String>,
}

/// A transient failure that persisted for the whole retry budget.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Request failed after {attempts} attempt(s) ({}): {message}", .code.map_or_else(|| "connection error".to_string(), |c| format!("HTTP {c}")))]
pub struct TransientRequestError {
    /// The status of the last response, or `None` for a connection failure.
    pub code: Option<u16>,
    /// The number of attempts made.
    pub attempts: u32,
    /// The last failure message or response body.
    pub message: String,
    /// Reference ID for error reporting (from X-Request-Id header).
    pub error_reference: Option<String>,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The request path is empty.
    #[error("Cannot send a request without a path.")]
    EmptyPath,
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
    /// A GET or DELETE request carries a body.
    #[error("Cannot send a body with {method}.")]
    UnexpectedBody {
        /// The HTTP method that must not carry a body.
        method: String,
    },
    /// The underlying transport refused to build the request.
    #[error("Could not build request: {message}")]
    Transport {
        /// The transport's reason.
        message: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HttpError {
    /// Authentication failed.
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// The API rejected the request; retrying will not help.
    #[error("Client request error: {0}")]
    ClientRequest(HttpResponseError),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(HttpResponseError),

    /// Transient failures exhausted the retry budget.
    #[error(transparent)]
    Transient(#[from] TransientRequestError),

    /// The request failed validation before being sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The response cannot be interpreted.
    #[error("Unexpected response (HTTP {code}): {message}")]
    UnexpectedResponse {
        /// The HTTP status code.
        code: u16,
        /// What was wrong with it.
        message: String,
    },

    /// The server answered 304 Not Modified.
    #[error("Resource not modified")]
    NotModified,
}

impl HttpError {
    /// Returns the HTTP status code associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication(e) => e.status(),
            Self::ClientRequest(e) | Self::NotFound(e) => Some(e.code),
            Self::Transient(e) => e.code,
            Self::UnexpectedResponse { code, .. } => Some(*code),
            Self::NotModified => Some(304),
            Self::InvalidRequest(_) => None,
        }
    }

    /// Returns `true` for a 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if the failure was transient and the retry budget ran out.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns the parsed response body, if the error carries one.
    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ClientRequest(e) | Self::NotFound(e) => Some(&e.body),
            _ => None,
        }
    }

    /// Returns the `X-Request-Id` of the failing response, if known.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ClientRequest(e) | Self::NotFound(e) => e.error_reference.as_deref(),
            Self::Transient(e) => e.error_reference.as_deref(),
            _ => None,
        }
    }
}

// Verify HttpError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
