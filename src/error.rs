//! Error types for client configuration.
//!
//! This module contains the error type returned while building a
//! [`ClientConfig`](crate::ClientConfig) or any of its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use sapim::{ClientId, ConfigError};
//!
//! let result = ClientId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyClientId)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Client id cannot be empty.
    #[error("Client id cannot be empty. Please provide the OAuth client id issued for your tenant.")]
    EmptyClientId,

    /// Client secret cannot be empty.
    #[error("Client secret cannot be empty. Please provide the OAuth client secret issued for your tenant.")]
    EmptyClientSecret,

    /// Tenant id is invalid.
    #[error("Invalid tenant '{tenant}'. Expected the subdomain of your login url, e.g. 'cald-prd'.")]
    InvalidTenant {
        /// The invalid tenant that was provided.
        tenant: String,
    },

    /// A URL is invalid.
    #[error("Invalid URL '{url}'. Please provide an absolute URL with scheme (e.g., 'https://cald-prd.callidusondemand.com').")]
    InvalidUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The retry policy is not usable.
    #[error("Invalid retry policy: {reason}")]
    InvalidRetryPolicy {
        /// Why the policy was rejected.
        reason: String,
    },

    /// The HTTP transport could not be initialized.
    #[error("Could not initialize the HTTP client: {reason}")]
    HttpClient {
        /// The transport's reason.
        reason: String,
    },
}
