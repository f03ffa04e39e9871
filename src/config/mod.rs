//! Configuration types for the SAP Incentive Management client.
//!
//! This module provides the configuration consumed at client construction.
//! Nothing is read from the environment; every value is passed in explicitly.
//!
//! # Overview
//!
//! - [`ClientConfig`]: All settings for one tenant connection
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ClientId`], [`ClientSecret`]: Validated OAuth client credentials
//! - [`TenantId`], [`BaseUrl`]: Validated tenant and URL values
//! - [`RetryPolicy`]: Backoff settings for transient failures
//!
//! # Example
//!
//! ```rust
//! use sapim::{BaseUrl, ClientConfig, ClientId, ClientSecret, TenantId};
//!
//! let config = ClientConfig::builder()
//!     .tenant(TenantId::new("cald-prd").unwrap())
//!     .token_url(BaseUrl::new("https://auth.example.com/oauth/token").unwrap())
//!     .client_id(ClientId::new("my-client").unwrap())
//!     .client_secret(ClientSecret::new("my-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://cald-prd.callidusondemand.com");
//! ```

mod newtypes;
mod retry;

use std::time::Duration;

pub use newtypes::{BaseUrl, ClientId, ClientSecret, TenantId};
pub use retry::RetryPolicy;

use crate::clients::PaginationScheme;
use crate::error::ConfigError;

/// Smallest page size the API accepts.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default safety margin before token expiry.
pub const DEFAULT_TOKEN_MARGIN: Duration = Duration::from_secs(30);

/// Default path prefix for API endpoints.
pub const DEFAULT_API_PREFIX: &str = "api";

/// Clamps a requested page size into the range the API accepts.
#[must_use]
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Configuration for one SAP Incentive Management tenant connection.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: BaseUrl,
    token_url: BaseUrl,
    client_id: ClientId,
    client_secret: ClientSecret,
    retry_policy: RetryPolicy,
    token_margin: Duration,
    page_size: u32,
    request_timeout: Duration,
    api_prefix: String,
    pagination: PaginationScheme,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub const fn token_url(&self) -> &BaseUrl {
        &self.token_url
    }

    /// Returns the OAuth client id.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the OAuth client secret.
    #[must_use]
    pub const fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    /// Returns the retry policy for transient failures.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Returns how long before expiry a token is considered stale.
    #[must_use]
    pub const fn token_margin(&self) -> Duration {
        self.token_margin
    }

    /// Returns the default page size for list operations.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the per-request timeout handed to the transport.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the path prefix continuation links are relative to.
    #[must_use]
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// Returns the pagination scheme used by list operations.
    #[must_use]
    pub const fn pagination(&self) -> &PaginationScheme {
        &self.pagination
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Required fields are the base URL (or tenant), `token_url`, `client_id`
/// and `client_secret`.
///
/// # Defaults
///
/// - `retry_policy`: 5 attempts, 1s base delay, factor 2, 25% jitter
/// - `token_margin`: 30 seconds
/// - `page_size`: 10 (clamped to 1..=100)
/// - `request_timeout`: 60 seconds
/// - `api_prefix`: `"api"`
/// - `pagination`: next-link on the `next` field
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<BaseUrl>,
    token_url: Option<BaseUrl>,
    client_id: Option<ClientId>,
    client_secret: Option<ClientSecret>,
    retry_policy: Option<RetryPolicy>,
    token_margin: Option<Duration>,
    page_size: Option<u32>,
    request_timeout: Option<Duration>,
    api_prefix: Option<String>,
    pagination: Option<PaginationScheme>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL from a tenant id.
    #[must_use]
    pub fn tenant(mut self, tenant: TenantId) -> Self {
        self.base_url = Some(BaseUrl::from(&tenant));
        self
    }

    /// Sets the API base URL directly (e.g. for a proxy or a test server).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the token endpoint URL (required).
    #[must_use]
    pub fn token_url(mut self, url: BaseUrl) -> Self {
        self.token_url = Some(url);
        self
    }

    /// Sets the OAuth client id (required).
    #[must_use]
    pub fn client_id(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Sets the OAuth client secret (required).
    #[must_use]
    pub fn client_secret(mut self, secret: ClientSecret) -> Self {
        self.client_secret = Some(secret);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the token expiry safety margin.
    #[must_use]
    pub const fn token_margin(mut self, margin: Duration) -> Self {
        self.token_margin = Some(margin);
        self
    }

    /// Sets the default page size.
    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the path prefix continuation links are relative to.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Sets the pagination scheme.
    #[must_use]
    pub fn pagination(mut self, scheme: PaginationScheme) -> Self {
        self.pagination = Some(scheme);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if a required field is not
    /// set, or [`ConfigError::InvalidRetryPolicy`] if the retry policy is unusable.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;
        let token_url = self
            .token_url
            .ok_or(ConfigError::MissingRequiredField { field: "token_url" })?;
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;
        let client_secret = self
            .client_secret
            .ok_or(ConfigError::MissingRequiredField {
                field: "client_secret",
            })?;

        let retry_policy = self.retry_policy.unwrap_or_default();
        retry_policy.validate()?;

        Ok(ClientConfig {
            base_url,
            token_url,
            client_id,
            client_secret,
            retry_policy,
            token_margin: self.token_margin.unwrap_or(DEFAULT_TOKEN_MARGIN),
            page_size: clamp_page_size(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            api_prefix: self
                .api_prefix
                .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            pagination: self.pagination.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
