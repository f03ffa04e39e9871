//! Access token representation.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body returned by the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A bearer token issued by the OAuth token endpoint.
///
/// The token value itself is never exposed; it only leaves the crate as an
/// `Authorization` header. The `Debug` implementation masks it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub(crate) fn new(
        secret: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            secret: secret.into(),
            issued_at,
            expires_at,
        }
    }

    /// Builds a token from an endpoint response received at `issued_at`.
    ///
    /// A missing `expires_in` means the token does not expire on its own.
    pub(crate) fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in
            .and_then(|secs| chrono::Duration::from_std(Duration::from_secs(secs)).ok())
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime));
        Self::new(response.access_token, issued_at, expires_at)
    }

    /// When the token was issued.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the token expires, if the endpoint said so.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns `true` if the token is still usable for at least `margin`.
    #[must_use]
    pub fn is_valid_for(&self, margin: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            return true;
        };
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() + margin < expires_at
    }

    /// Returns `true` if the token has passed its expiry time.
    #[must_use]
    pub fn expired(&self) -> bool {
        !self.is_valid_for(Duration::ZERO)
    }

    pub(crate) fn authorization_header(&self) -> String {
        format!("Bearer {}", self.secret)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"*****")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
