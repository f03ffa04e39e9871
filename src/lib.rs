//! # SAP Incentive Management REST client
//!
//! An async, typed client for the SAP Incentive Management (Commissions)
//! REST API.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for credentials, tenant and URLs
//! - OAuth 2.0 client-credentials tokens, refreshed before they expire
//!   via [`auth::TokenManager`]
//! - A request executor with retry and backoff on transient failures
//! - Lazy pagination over list endpoints
//! - Schema-checked conversion of JSON payloads into typed entities
//! - CRUD, bulk and pipeline operations via [`ResourceClient`]
//!
//! ## Quick Start
//!
//! ```rust
//! use sapim::{BaseUrl, ClientConfig, ClientId, ClientSecret, RetryPolicy, TenantId};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .tenant(TenantId::new("cald-prd").unwrap())
//!     .token_url(BaseUrl::new("https://auth.example.com/oauth/token").unwrap())
//!     .client_id(ClientId::new("my-client").unwrap())
//!     .client_secret(ClientSecret::new("my-secret").unwrap())
//!     .retry_policy(RetryPolicy::new(5, Duration::from_millis(500)))
//!     .page_size(100)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.page_size(), 100);
//! ```
//!
//! ## Working With Resources
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use sapim::rest::resources::Participant;
//! use sapim::rest::{Filter, ListQuery};
//! use sapim::ResourceClient;
//!
//! let client = ResourceClient::new(&config)?;
//!
//! // Pages are fetched as the stream is consumed
//! let query = ListQuery::new()
//!     .filter(Filter::eq("lastName", "Smith"))
//!     .order_by("payeeId");
//! let mut participants = client.list::<Participant>(&query);
//! while let Some(participant) = participants.try_next().await? {
//!     println!("{}", participant.payee_id);
//! }
//!
//! // Create, then update
//! let mut created = client.create(&participant).await?;
//! created.first_name = Some("Ada".to_string());
//! let seq = created.payee_seq.clone().unwrap_or_default();
//! let updated = client.update(&seq, &created).await?;
//! ```
//!
//! ## Errors
//!
//! Failures are layered: [`ConfigError`] at construction, [`AuthError`] for
//! token problems, [`HttpError`] for transport and status failures, and
//! [`ResourceError`] for business failures such as an already existing
//! record or a payload that does not match its schema.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes validate on construction and payloads
//!   are validated before any request is sent
//! - **Thread-safe**: All client types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthError, TokenManager};
pub use config::{
    BaseUrl, ClientConfig, ClientConfigBuilder, ClientId, ClientSecret, RetryPolicy, TenantId,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse, HttpResponseError,
    InvalidHttpRequestError, PaginationScheme, RequestExecutor, TransientRequestError,
};

// Re-export resource types
pub use rest::{ListQuery, Resource, ResourceClient, ResourceError};
