//! Authenticated request execution with retry and backoff.
//!
//! [`RequestExecutor`] sends an [`HttpRequest`] to the tenant, attaching a
//! bearer token from the [`TokenManager`], and turns the outcome into either
//! an [`HttpResponse`] or a classified [`HttpError`].
//!
//! # Retry Behavior
//!
//! - **2xx**: returned if the status is a success code for the method and the
//!   body is JSON
//! - **304**: [`HttpError::NotModified`]
//! - **401**: the token is invalidated and the request is retried once with a
//!   fresh one; a second 401 is an authentication error
//! - **404**: [`HttpError::NotFound`], never retried
//! - **429, 5xx, connection failures**: retried with exponential backoff and
//!   jitter until the [`RetryPolicy`] budget is spent. A `Retry-After` header
//!   extends the wait, capped at the policy's maximum delay. A `POST` is
//!   retried only on 429 and on failures to connect, where the server cannot
//!   have acted on it; a 5xx or a dropped connection fails after one attempt
//! - **Anything else**: [`HttpError::ClientRequest`], never retried

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AccessToken, AuthError, TokenManager};
use crate::clients::errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, TransientRequestError,
};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{BaseUrl, ClientConfig, RetryPolicy};
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How a response status is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx.
    Success,
    /// 304.
    NotModified,
    /// 401.
    Unauthorized,
    /// 404.
    NotFound,
    /// 429 or 5xx.
    Transient,
    /// Any other status.
    Fatal,
}

impl ResponseClass {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn of(code: u16) -> Self {
        match code {
            200..=299 => Self::Success,
            304 => Self::NotModified,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            429 | 500..=599 => Self::Transient,
            _ => Self::Fatal,
        }
    }
}

/// A response as read off the wire, before its body is interpreted.
struct RawResponse {
    code: u16,
    headers: HashMap<String, Vec<String>>,
    text: String,
}

/// Sends authenticated requests to the API.
///
/// The executor is `Send + Sync` and is meant to be shared by every resource
/// operation of one client.
#[derive(Debug)]
pub struct RequestExecutor {
    client: reqwest::Client,
    base_url: BaseUrl,
    default_headers: HashMap<String, String>,
    credentials: Arc<TokenManager>,
    retry_policy: RetryPolicy,
}

// Verify RequestExecutor is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RequestExecutor>();
};

impl RequestExecutor {
    /// Creates an executor, and the token manager it uses, from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP transport cannot be
    /// initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;
        let credentials = Arc::new(TokenManager::new(config, client.clone()));
        Ok(Self::with_credentials(config, client, credentials))
    }

    /// Creates an executor that shares an existing token manager.
    #[must_use]
    pub fn with_credentials(
        config: &ClientConfig,
        client: reqwest::Client,
        credentials: Arc<TokenManager>,
    ) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}SAP IM Rust Client v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Self {
            client,
            base_url: config.base_url().clone(),
            default_headers,
            credentials,
            retry_policy: config.retry_policy().clone(),
        }
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the default headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the token manager.
    #[must_use]
    pub const fn credentials(&self) -> &Arc<TokenManager> {
        &self.credentials
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Sends `request`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] classified as described in the module docs.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);
        let max_attempts = self.retry_policy.max_attempts();
        let mut failures: u32 = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.credentials.get_valid_token().await?;
            tracing::debug!(
                method = %request.http_method,
                path = %request.path,
                "Sending request"
            );

            let (response, failure, retryable) = match self.send(&url, request, &token).await {
                Ok(raw) => match ResponseClass::of(raw.code) {
                    ResponseClass::Success => return Self::accept(request, raw),
                    ResponseClass::NotModified => return Err(HttpError::NotModified),
                    ResponseClass::Unauthorized => {
                        if reauthenticated {
                            tracing::error!(path = %request.path, "Fresh access token rejected");
                            return Err(AuthError::TokenRejected { message: raw.text }.into());
                        }
                        tracing::warn!(path = %request.path, "Access token rejected, refreshing");
                        reauthenticated = true;
                        self.credentials.invalidate_if_current(&token).await;
                        continue;
                    }
                    ResponseClass::NotFound => {
                        return Err(HttpError::NotFound(Self::response_error(raw)))
                    }
                    ResponseClass::Fatal => {
                        let error = Self::response_error(raw);
                        tracing::debug!(code = error.code, "Request rejected");
                        return Err(HttpError::ClientRequest(error));
                    }
                    ResponseClass::Transient => {
                        let retryable =
                            request.http_method.is_idempotent() || raw.code == 429;
                        let response = Self::lenient(raw);
                        let message = response.body.to_string();
                        (Some(response), message, retryable)
                    }
                },
                Err(error) if error.is_builder() => {
                    return Err(InvalidHttpRequestError::Transport {
                        message: error.to_string(),
                    }
                    .into());
                }
                Err(error) => {
                    let retryable = request.http_method.is_idempotent() || error.is_connect();
                    (None, format!("Network error: {error}"), retryable)
                }
            };

            failures += 1;
            let code = response.as_ref().map(|r| r.code);
            if !retryable || failures >= max_attempts {
                tracing::error!(
                    method = %request.http_method,
                    path = %request.path,
                    attempts = failures,
                    code,
                    retryable,
                    "Giving up after transient failure"
                );
                return Err(TransientRequestError {
                    code,
                    attempts: failures,
                    message: failure,
                    error_reference: response
                        .as_ref()
                        .and_then(HttpResponse::request_id)
                        .map(String::from),
                }
                .into());
            }

            let delay = self.retry_delay(failures, response.as_ref());
            tracing::warn!(
                method = %request.http_method,
                path = %request.path,
                attempt = failures,
                code,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send(
        &self,
        url: &str,
        request: &HttpRequest,
        token: &AccessToken,
    ) -> Result<RawResponse, reqwest::Error> {
        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };

        for (key, value) in self.default_headers.iter().chain(&request.extra_headers) {
            req_builder = req_builder.header(key, value);
        }
        req_builder = req_builder.header("Authorization", token.authorization_header());

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let res = req_builder.send().await?;
        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let text = res.text().await?;

        Ok(RawResponse {
            code,
            headers,
            text,
        })
    }

    /// Interprets a 2xx answer.
    fn accept(request: &HttpRequest, raw: RawResponse) -> Result<HttpResponse, HttpError> {
        if !request.http_method.success_codes().contains(&raw.code) {
            return Err(HttpError::UnexpectedResponse {
                code: raw.code,
                message: format!("{} answered with an unexpected success status", request.http_method),
            });
        }

        if raw.text.trim().is_empty() {
            return Ok(HttpResponse::new(raw.code, raw.headers, serde_json::json!({})));
        }

        let response = HttpResponse::new(raw.code, raw.headers, serde_json::Value::Null);
        if !response.is_json() {
            tracing::warn!(
                content_type = response.content_type().unwrap_or("none"),
                "Response is not JSON, the tenant may be under maintenance"
            );
            return Err(HttpError::UnexpectedResponse {
                code: raw.code,
                message: format!(
                    "expected application/json, got {}",
                    response.content_type().unwrap_or("no content type")
                ),
            });
        }

        let body = serde_json::from_str(&raw.text).map_err(|e| HttpError::UnexpectedResponse {
            code: raw.code,
            message: format!("invalid JSON body: {e}"),
        })?;
        Ok(HttpResponse { body, ..response })
    }

    /// Parses an error body, keeping non-JSON text under `raw_body`.
    fn lenient(raw: RawResponse) -> HttpResponse {
        let body = if raw.text.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&raw.text)
                .unwrap_or_else(|_| serde_json::json!({ "raw_body": raw.text }))
        };
        HttpResponse::new(raw.code, raw.headers, body)
    }

    fn response_error(raw: RawResponse) -> HttpResponseError {
        let response = Self::lenient(raw);
        HttpResponseError {
            code: response.code,
            message: response.body.to_string(),
            error_reference: response.request_id().map(String::from),
            body: response.body,
        }
    }

    fn retry_delay(&self, failures: u32, response: Option<&HttpResponse>) -> Duration {
        let backoff = self.retry_policy.delay_for(failures);
        let retry_after = response
            .and_then(|r| r.retry_request_after)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .map(|after| after.min(self.retry_policy.max_delay()));
        retry_after.map_or(backoff, |after| backoff.max(after))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
