//! Typed resource operations for the Incentive Management REST API.
//!
//! This module sits on top of [`crate::clients`] and adds resource
//! semantics:
//!
//! - **[`Schema`]**: static description of a resource's endpoint and fields
//! - **[`codec`]**: schema-checked conversion between JSON and typed entities
//! - **[`Resource`]**: the trait every entity implements
//! - **[`ResourceClient`]**: get, list, create, update, delete, upsert and
//!   bulk operations over any [`Resource`]
//! - **[`Filter`]**: builder for `$filter` expressions
//! - **Pipelines**: [`ResourceClient::run_pipeline`] and
//!   [`ResourceClient::cancel_pipeline`]
//! - **[`ResourceError`]**: business failures recognised from `TCMP_` codes
//!
//! Concrete entities live in [`resources`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sapim::rest::{Filter, ListQuery, ResourceClient};
//! use sapim::rest::resources::Participant;
//!
//! let client = ResourceClient::new(&config)?;
//! let smiths: Vec<Participant> = client
//!     .list_all(&ListQuery::new().filter(Filter::eq("lastName", "Smith")))
//!     .await?;
//! ```

mod bulk;
mod client;
pub mod codec;
mod errors;
mod filter;
mod pipeline;
mod resource;
pub mod resources;
mod schema;

pub use bulk::{BulkFailure, BulkOperation, BulkResult};
pub use client::{Deleted, ListQuery, ResourceClient};
pub use codec::{FieldIssue, Problem, RecordRef, ValidationError};
pub use errors::{ResourceError, ALREADY_EXISTS_CODE, ERROR_KEY, MISSING_FIELD_CODE, NOT_FOUND_CODE};
pub use filter::{Filter, FilterValue, Operator};
pub use pipeline::{
    ImportJob, ImportRunMode, ImportStage, PipelineJob, PipelineRunJob, PipelineStage, RunMode,
    StageTable, XmlImportJob, CANCEL_PIPELINE_CODE,
};
pub use resource::Resource;
pub use schema::{FieldKind, FieldSpec, Schema};
