//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated OAuth client id.
///
/// # Example
///
/// ```rust
/// use sapim::ClientId;
///
/// let id = ClientId::new("my-client").unwrap();
/// assert_eq!(id.as_ref(), "my-client");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated OAuth client secret.
///
/// The `Debug` implementation masks the secret value, displaying only
/// `ClientSecret(*****)`.
///
/// # Example
///
/// ```rust
/// use sapim::ClientSecret;
///
/// let secret = ClientSecret::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ClientSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Creates a new validated client secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyClientSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(*****)")
    }
}

/// A validated tenant identifier.
///
/// The tenant is the subdomain of the login url. For
/// `https://cald-prd.callidusondemand.com/SalesPortal/#!/` the tenant is
/// `cald-prd`.
///
/// # Example
///
/// ```rust
/// use sapim::TenantId;
///
/// let tenant = TenantId::new("CALD-PRD").unwrap();
/// assert_eq!(tenant.as_ref(), "cald-prd");
/// assert_eq!(tenant.host(), "https://cald-prd.callidusondemand.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantId(String);

impl TenantId {
    const HOST_SUFFIX: &'static str = ".callidusondemand.com";

    /// Creates a new validated tenant id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTenant`] if the tenant is empty or
    /// contains characters other than letters, digits and hyphens.
    pub fn new(tenant: impl Into<String>) -> Result<Self, ConfigError> {
        let tenant = tenant.into().trim().to_lowercase();

        if tenant.is_empty() || tenant.starts_with('-') || tenant.ends_with('-') {
            return Err(ConfigError::InvalidTenant { tenant });
        }
        if !tenant
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::InvalidTenant { tenant });
        }

        Ok(Self(tenant))
    }

    /// Returns the fully qualified host for this tenant.
    #[must_use]
    pub fn host(&self) -> String {
        format!("https://{}{}", self.0, Self::HOST_SUFFIX)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TenantId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated absolute URL (API base or token endpoint).
///
/// Trailing slashes are stripped so paths can be joined with a single `/`.
///
/// # Example
///
/// ```rust
/// use sapim::BaseUrl;
///
/// let url = BaseUrl::new("https://cald-prd.callidusondemand.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://cald-prd.callidusondemand.com");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), Some("cald-prd.callidusondemand.com"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl BaseUrl {
    /// Creates a new validated URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the URL has no scheme or host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        let scheme_end = url
            .find("://")
            .ok_or_else(|| ConfigError::InvalidUrl { url: url.clone() })?;

        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidUrl { url: url.clone() });
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(ConfigError::InvalidUrl { url: url.clone() });
        }

        // Host ends at port, path, query, or end of string
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_end == host_start {
            return Err(ConfigError::InvalidUrl { url: url.clone() });
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        let host = &self.url[self.host_start..self.host_end];
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }

    /// Joins a relative path onto this URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl From<&TenantId> for BaseUrl {
    fn from(tenant: &TenantId) -> Self {
        let url = tenant.host();
        let host_start = "https://".len();
        Self {
            host_end: url.len(),
            url,
            scheme_end: "https".len(),
            host_start,
        }
    }
}
