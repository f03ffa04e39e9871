//! Error types for token acquisition.
//!
//! [`AuthError`] covers failures of the OAuth client-credentials exchange and
//! the case where the API keeps rejecting a freshly issued token.

use thiserror::Error;

/// Errors raised while obtaining or using an access token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint rejected the client credentials.
    ///
    /// This is not retried; the credentials must be fixed.
    #[error("Token request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The token endpoint could not be reached or kept failing transiently.
    #[error("Token endpoint unavailable after {attempts} attempt(s): {message}")]
    Unreachable {
        /// Number of attempts made.
        attempts: u32,
        /// Last failure observed.
        message: String,
    },

    /// The token endpoint answered with a body that is not a token response.
    #[error("Invalid token response: {message}")]
    InvalidResponse {
        /// Why the body could not be used.
        message: String,
    },

    /// The API answered 401 to a request carrying a freshly issued token.
    #[error("Access token rejected by the API: {message}")]
    TokenRejected {
        /// Response body of the second 401.
        message: String,
    },
}

impl AuthError {
    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::TokenRejected { .. } => Some(401),
            Self::Unreachable { .. } | Self::InvalidResponse { .. } => None,
        }
    }
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_includes_status_and_message() {
        let error = AuthError::Rejected {
            status: 401,
            message: "invalid_client".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid_client"));
        assert_eq!(error.status(), Some(401));
    }

    #[test]
    fn test_unreachable_reports_attempts() {
        let error = AuthError::Unreachable {
            attempts: 3,
            message: "connection refused".to_string(),
        };
        assert!(error.to_string().contains("3 attempt"));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_token_rejected_maps_to_401() {
        let error = AuthError::TokenRejected {
            message: String::new(),
        };
        assert_eq!(error.status(), Some(401));
    }
}
