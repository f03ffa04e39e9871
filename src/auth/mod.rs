//! Authentication for the SAP Incentive Management API.
//!
//! The API is protected by OAuth 2.0 bearer tokens obtained with the
//! client-credentials grant. [`TokenManager`] owns the current token and
//! refreshes it; callers never see the raw token value.

mod credentials;
mod error;
mod token;

pub use credentials::TokenManager;
pub use error::AuthError;
pub use token::AccessToken;
