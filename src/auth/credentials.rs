//! OAuth client-credentials token management.
//!
//! [`TokenManager`] obtains bearer tokens from the tenant's OAuth token
//! endpoint with the client-credentials grant, caches the current token and
//! refreshes it before it expires.
//!
//! # Overview
//!
//! - A token is considered usable while `now + margin < expires_at`. A token
//!   without an expiry never goes stale on its own.
//! - Concurrent callers never trigger more than one exchange: the cache is
//!   guarded by an async mutex held for the duration of a refresh, so callers
//!   that arrive mid-refresh wait and then reuse the new token.
//! - Transient failures of the token endpoint (connection errors, 429, 5xx)
//!   are retried with the configured [`RetryPolicy`]. Any other 4xx is an
//!   [`AuthError::Rejected`] and is not retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use sapim::auth::TokenManager;
//!
//! let manager = TokenManager::new(&config, reqwest::Client::new());
//! manager.login().await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::auth::token::{AccessToken, TokenResponse};
use crate::auth::AuthError;
use crate::config::{BaseUrl, ClientConfig, ClientId, ClientSecret, RetryPolicy};

/// Grant type for client credentials.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Form body for the client credentials exchange.
#[derive(Debug, Serialize)]
struct ClientCredentialsRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// Holds the current access token and refreshes it on demand.
#[derive(Debug)]
pub struct TokenManager {
    http: reqwest::Client,
    token_url: BaseUrl,
    client_id: ClientId,
    client_secret: ClientSecret,
    retry_policy: RetryPolicy,
    margin: Duration,
    current: Mutex<Option<AccessToken>>,
    exchanges: AtomicU64,
}

// Verify TokenManager is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenManager>();
};

impl TokenManager {
    /// Creates a manager for the credentials in `config`.
    ///
    /// No request is made until a token is first needed.
    #[must_use]
    pub fn new(config: &ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            token_url: config.token_url().clone(),
            client_id: config.client_id().clone(),
            client_secret: config.client_secret().clone(),
            retry_policy: config.retry_policy().clone(),
            margin: config.token_margin(),
            current: Mutex::new(None),
            exchanges: AtomicU64::new(0),
        }
    }

    /// Returns a token that is valid for at least the configured margin,
    /// exchanging credentials first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if a refresh was needed and failed.
    pub async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref() {
            if token.is_valid_for(self.margin) {
                return Ok(token.clone());
            }
            tracing::debug!("Access token is about to expire, refreshing");
        }

        let token = self.exchange().await?;
        *current = Some(token.clone());
        Ok(token)
    }

    /// Forces a fresh exchange, replacing any cached token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the exchange fails.
    pub async fn login(&self) -> Result<(), AuthError> {
        let mut current = self.current.lock().await;
        let token = self.exchange().await?;
        *current = Some(token);
        Ok(())
    }

    /// Drops the cached token so the next call exchanges credentials again.
    pub async fn invalidate(&self) {
        self.current.lock().await.take();
    }

    /// Drops the cached token only if it is still `rejected`.
    ///
    /// A concurrent caller may already have replaced it with a fresh one.
    pub(crate) async fn invalidate_if_current(&self, rejected: &AccessToken) {
        let mut current = self.current.lock().await;
        if current.as_ref() == Some(rejected) {
            current.take();
        }
    }

    /// Number of credential exchanges performed so far.
    #[must_use]
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    async fn exchange(&self) -> Result<AccessToken, AuthError> {
        let max_attempts = self.retry_policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let failure = match self.request_token().await {
                Ok(token) => return Ok(token),
                Err(Exchange::Fatal(error)) => {
                    tracing::error!(error = %error, "Token request failed");
                    return Err(error);
                }
                Err(Exchange::Transient(message)) => message,
            };

            if attempt >= max_attempts {
                tracing::error!(attempts = attempt, error = %failure, "Token endpoint unavailable");
                return Err(AuthError::Unreachable {
                    attempts: attempt,
                    message: failure,
                });
            }

            let delay = self.retry_policy.delay_for(attempt);
            tracing::warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure,
                "Token request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn request_token(&self) -> Result<AccessToken, Exchange> {
        let body = ClientCredentialsRequest {
            grant_type: CLIENT_CREDENTIALS_GRANT_TYPE,
            client_id: self.client_id.as_ref(),
            client_secret: self.client_secret.as_ref(),
        };

        tracing::debug!(url = self.token_url.as_ref(), "Requesting access token");
        let issued_at = Utc::now();
        let response = self
            .http
            .post(self.token_url.as_ref())
            .header("Accept", "application/json")
            .form(&body)
            .send()
            .await
            .map_err(|e| Exchange::Transient(format!("Network error: {e}")))?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        if status == 429 || status >= 500 {
            return Err(Exchange::Transient(format!("HTTP {status}: {text}")));
        }
        if !(200..300).contains(&status) {
            return Err(Exchange::Fatal(AuthError::Rejected {
                status,
                message: text,
            }));
        }

        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| {
            Exchange::Fatal(AuthError::InvalidResponse {
                message: e.to_string(),
            })
        })?;
        if parsed.access_token.is_empty() {
            return Err(Exchange::Fatal(AuthError::InvalidResponse {
                message: "empty access_token".to_string(),
            }));
        }

        self.exchanges.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            token_type = parsed.token_type.as_deref().unwrap_or("Bearer"),
            expires_in = parsed.expires_in,
            "Obtained access token"
        );
        Ok(AccessToken::from_response(parsed, issued_at))
    }
}

enum Exchange {
    Transient(String),
    Fatal(AuthError),
}
