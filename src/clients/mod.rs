//! HTTP client layer for the SAP Incentive Management API.
//!
//! This module provides the transport-facing half of the crate: requests,
//! responses, error classification, authenticated execution with retries,
//! and pagination.
//!
//! # Overview
//!
//! - [`RequestExecutor`]: Sends authenticated requests with retry and backoff
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`HttpError`]: Classified failures
//! - [`PageWalker`], [`PaginationScheme`]: Walking paginated collections
//!
//! # Example
//!
//! ```rust,ignore
//! use sapim::clients::{HttpMethod, HttpRequest, RequestExecutor};
//!
//! let executor = RequestExecutor::new(&config)?;
//! let request = HttpRequest::builder(HttpMethod::Get, "api/v2/participants")
//!     .query_param("top", "1")
//!     .build()?;
//! let response = executor.execute(&request).await?;
//! ```

mod errors;
mod executor;
mod http_request;
mod http_response;
mod pagination;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError, TransientRequestError};
pub use executor::{RequestExecutor, ResponseClass, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use pagination::{PageWalker, PaginationScheme};
