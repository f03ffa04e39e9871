//! Typed operations on API resources.
//!
//! [`ResourceClient`] is the entry point of the crate. It owns one
//! [`RequestExecutor`] (and through it the token manager) and exposes the
//! generic resource operations: get, list, create, update, delete, plus the
//! helpers built on them.
//!
//! # Wire conventions
//!
//! - a collection lives at `api/v2/<plural>` and one record at
//!   `api/v2/<plural>(<seq>)`
//! - writes send a JSON array of records; responses wrap records under the
//!   collection key, e.g. `{"participants": [...]}`
//! - deletes answer with `{"<plural>": {"<seq>": "<message>"}}`
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use sapim::rest::{Filter, ListQuery, ResourceClient};
//! use sapim::rest::resources::Participant;
//!
//! let client = ResourceClient::new(&config)?;
//!
//! let query = ListQuery::new().filter(Filter::eq("lastName", "Smith"));
//! let mut participants = client.list::<Participant>(&query);
//! while let Some(participant) = participants.try_next().await? {
//!     println!("{}", participant.payee_id);
//! }
//! ```

use std::collections::HashMap;

use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;

use crate::clients::{
    HttpError, HttpMethod, HttpRequest, PageWalker, PaginationScheme, RequestExecutor,
};
use crate::config::{clamp_page_size, ClientConfig};
use crate::error::ConfigError;
use crate::rest::codec::{self, raw_seq, ValidationError};
use crate::rest::errors::{
    ApiErrorEntry, ResourceError, ALREADY_EXISTS_CODE, MISSING_FIELD_CODE, NOT_FOUND_CODE,
};
use crate::rest::filter::Filter;
use crate::rest::resource::Resource;

/// Options for listing a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    filter: Option<String>,
    order_by: Vec<String>,
    expand: Vec<String>,
    page_size: Option<u32>,
}

impl ListQuery {
    /// An unfiltered query with the client's default page size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the results with `filter`.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    /// Restricts the results with a pre-rendered `$filter` expression.
    #[must_use]
    pub fn raw_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sorts by a wire field, e.g. `"effectiveStartDate desc"`.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by.push(field.into());
        self
    }

    /// Asks the server to expand a reference field inline.
    #[must_use]
    pub fn expand(mut self, field: impl Into<String>) -> Self {
        self.expand.push(field.into());
        self
    }

    /// Sets the page size, clamped to `1..=100`.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(clamp_page_size(page_size));
        self
    }

    /// The rendered filter, if any.
    #[must_use]
    pub fn filter_expression(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    fn to_query(&self, default_page_size: u32) -> HashMap<String, String> {
        let mut query = HashMap::new();
        query.insert(
            "top".to_string(),
            self.page_size.unwrap_or(default_page_size).to_string(),
        );
        if let Some(filter) = &self.filter {
            query.insert("$filter".to_string(), filter.clone());
        }
        if !self.order_by.is_empty() {
            query.insert("orderBy".to_string(), self.order_by.join(","));
        }
        if !self.expand.is_empty() {
            query.insert("expand".to_string(), self.expand.join(","));
        }
        query
    }
}

/// Acknowledgement of a successful delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deleted {
    /// The deleted record's identifier.
    pub seq: String,
    /// The server's message.
    pub message: String,
}

/// Client for typed resource operations.
#[derive(Debug)]
pub struct ResourceClient {
    executor: RequestExecutor,
    page_size: u32,
    pagination: PaginationScheme,
    api_prefix: String,
}

// Verify ResourceClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceClient>();
};

impl ResourceClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP transport cannot be
    /// initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_executor(config, RequestExecutor::new(config)?))
    }

    /// Creates a client around an existing executor.
    #[must_use]
    pub fn with_executor(config: &ClientConfig, executor: RequestExecutor) -> Self {
        Self {
            executor,
            page_size: config.page_size(),
            pagination: config.pagination().clone(),
            api_prefix: config.api_prefix().to_string(),
        }
    }

    /// Returns the underlying executor.
    #[must_use]
    pub const fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Obtains a fresh access token now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] wrapping the authentication failure.
    pub async fn login(&self) -> Result<(), ResourceError> {
        self.executor
            .credentials()
            .login()
            .await
            .map_err(|e| ResourceError::Http(e.into()))
    }

    /// Fetches one record by its system identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the record does not exist,
    /// [`ResourceError::Validation`] if the payload does not match the
    /// schema, or [`ResourceError::Http`] for other failures.
    pub async fn get<R: Resource>(&self, seq: &str) -> Result<R, ResourceError> {
        let schema = R::SCHEMA;
        let mut builder = HttpRequest::builder(HttpMethod::Get, schema.record_path(seq));
        if !schema.expand.is_empty() {
            builder = builder.query_param("expand", schema.expand.join(","));
        }
        let request = builder.build().map_err(HttpError::from)?;
        let response = self
            .executor
            .execute(&request)
            .await
            .map_err(|e| ResourceError::from_record_failure(schema.name, seq, e))?;

        let record = match response.body.get(schema.records_key()) {
            Some(Value::Array(records)) => records.first().ok_or_else(|| ResourceError::NotFound {
                resource: schema.name,
                id: seq.to_string(),
            })?,
            _ => &response.body,
        };
        Ok(decode_logged(record)?)
    }

    /// Returns a page walker over the collection of `R`.
    #[must_use]
    pub fn walker<R: Resource>(&self, query: &ListQuery) -> PageWalker<'_> {
        let first = HttpRequest {
            http_method: HttpMethod::Get,
            path: R::SCHEMA.endpoint.to_string(),
            body: None,
            query: self.collection_query::<R>(query),
            extra_headers: HashMap::new(),
        };
        PageWalker::new(
            &self.executor,
            &self.pagination,
            &self.api_prefix,
            R::SCHEMA.records_key(),
            first,
        )
    }

    /// Query of the first list request: the schema's expandable references
    /// unless the caller chose some, and the page size capped for `R`.
    fn collection_query<R: Resource>(&self, query: &ListQuery) -> HashMap<String, String> {
        let mut params = query.to_query(self.page_size);
        if query.expand.is_empty() && !R::SCHEMA.expand.is_empty() {
            params.insert("expand".to_string(), R::SCHEMA.expand.join(","));
        }
        if let Some(limit) = R::PAGE_SIZE_LIMIT {
            let requested = query.page_size.unwrap_or(self.page_size);
            if requested > limit {
                tracing::warn!(
                    resource = R::SCHEMA.name,
                    requested,
                    limit,
                    "Reducing page size"
                );
                params.insert("top".to_string(), limit.to_string());
            }
        }
        params
    }

    /// Lists the collection of `R` as a lazy stream.
    ///
    /// Pages are fetched as the stream is consumed. The stream ends after
    /// the first error; a page that fails validation yields no records.
    pub fn list<R: Resource>(
        &self,
        query: &ListQuery,
    ) -> impl Stream<Item = Result<R, ResourceError>> + '_ {
        let walker = self.walker::<R>(query);
        stream::try_unfold((walker, 0_usize), |(mut walker, offset)| async move {
            let Some(raw) = walker.next_page().await? else {
                return Ok(None);
            };
            let page = codec::decode_page::<R>(&raw).map_err(|mut e| {
                if let Some(record) = e.record.as_mut() {
                    record.index += offset;
                }
                tracing::error!(error = %e, "Malformed record in page");
                e
            })?;
            let next_offset = offset + raw.len();
            Ok::<_, ResourceError>(Some((
                stream::iter(page.into_iter().map(Ok::<R, ResourceError>)),
                (walker, next_offset),
            )))
        })
        .try_flatten()
    }

    /// Lists the whole collection of `R` into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error met while walking the pages.
    pub async fn list_all<R: Resource>(&self, query: &ListQuery) -> Result<Vec<R>, ResourceError> {
        self.list::<R>(query).try_collect().await
    }

    /// Returns the first record matching `query`, fetching a single record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if nothing matches.
    pub async fn read_first<R: Resource>(&self, query: &ListQuery) -> Result<R, ResourceError> {
        let query = query.clone().page_size(1);
        let mut walker = self.walker::<R>(&query);
        let records = walker.next_page().await?.unwrap_or_default();
        let Some(raw) = records.first() else {
            return Err(ResourceError::NotFound {
                resource: R::SCHEMA.name,
                id: query.filter_expression().unwrap_or("<any>").to_string(),
            });
        };
        Ok(decode_logged(raw)?)
    }

    /// Fetches the current server state of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingIdentifier`] if `entity` has no
    /// identifier, otherwise as [`get`](Self::get).
    pub async fn reload<R: Resource>(&self, entity: &R) -> Result<R, ResourceError> {
        let seq = entity.seq().ok_or(ResourceError::MissingIdentifier {
            resource: R::SCHEMA.name,
            operation: "reload",
        })?;
        self.get(seq).await
    }

    /// Creates `entity` and returns the server's representation of it.
    ///
    /// The entity is validated before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for an invalid entity,
    /// [`ResourceError::AlreadyExists`] or [`ResourceError::MissingField`]
    /// when the server rejects it for those reasons, or
    /// [`ResourceError::Http`] otherwise.
    pub async fn create<R: Resource>(&self, entity: &R) -> Result<R, ResourceError> {
        let body = codec::encode(entity)?;
        let response = self.write::<R>(HttpMethod::Post, vec![body]).await?;
        single_result(&response, R::SCHEMA.name, R::SCHEMA.records_key())
    }

    /// Replaces the record `seq` with `entity`.
    ///
    /// A 304 answer means the record already matched; `entity` is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create).
    pub async fn update<R: Resource>(&self, seq: &str, entity: &R) -> Result<R, ResourceError> {
        let mut body = codec::encode(entity)?;
        set_seq::<R>(&mut body, seq, "update")?;
        match self.write::<R>(HttpMethod::Put, vec![body]).await {
            Ok(response) => single_result(&response, R::SCHEMA.name, R::SCHEMA.records_key()),
            Err(ResourceError::Http(HttpError::NotModified)) => {
                tracing::debug!(resource = R::SCHEMA.name, seq, "Update left record unchanged");
                Ok(entity.clone())
            }
            Err(e) => Err(e),
        }
    }

    /// Creates `entity`, or updates the existing record if it already exists.
    ///
    /// The existing record is located by its identifier, or failing that by
    /// the schema's business key.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create) and [`update`](Self::update).
    pub async fn upsert<R: Resource>(&self, entity: &R) -> Result<R, ResourceError> {
        if let Some(seq) = entity.seq() {
            return self.update(seq, entity).await;
        }

        match self.create(entity).await {
            Err(ResourceError::AlreadyExists { message, .. }) => {
                tracing::debug!(resource = R::SCHEMA.name, %message, "Record exists, updating");
                let seq = self.find_existing_seq(entity).await?;
                self.update(&seq, entity).await
            }
            other => other,
        }
    }

    /// Deletes the record `seq`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the record does not exist
    /// (including when it was already deleted), or
    /// [`ResourceError::DeleteFailed`] if the server refuses.
    pub async fn delete<R: Resource>(&self, seq: &str) -> Result<Deleted, ResourceError> {
        let schema = R::SCHEMA;
        let request = HttpRequest::builder(HttpMethod::Delete, schema.record_path(seq))
            .build()
            .map_err(HttpError::from)?;

        let response = match self.executor.execute(&request).await {
            Ok(response) => response,
            Err(error) => {
                let message = error
                    .body()
                    .and_then(|body| delete_message(body, schema.records_key(), seq));
                return Err(match message {
                    Some(message) if !message.contains(NOT_FOUND_CODE) => {
                        ResourceError::DeleteFailed {
                            resource: schema.name,
                            id: seq.to_string(),
                            message,
                        }
                    }
                    _ => ResourceError::from_record_failure(schema.name, seq, error),
                });
            }
        };

        let message = delete_message(&response.body, schema.records_key(), seq).ok_or_else(|| {
            ResourceError::UnexpectedPayload {
                resource: schema.name,
                message: format!("delete response does not mention {seq}"),
            }
        })?;
        tracing::debug!(resource = schema.name, seq, "Deleted record");
        Ok(Deleted {
            seq: seq.to_string(),
            message,
        })
    }

    /// Sends records to the collection endpoint, mapping write failures.
    async fn write<R: Resource>(
        &self,
        method: HttpMethod,
        records: Vec<Value>,
    ) -> Result<Value, ResourceError> {
        self.write_raw::<R>(method, records)
            .await
            .map_err(|e| ResourceError::from_write_failure(R::SCHEMA.name, e))
    }

    /// Sends records to the collection endpoint.
    pub(crate) async fn write_raw<R: Resource>(
        &self,
        method: HttpMethod,
        records: Vec<Value>,
    ) -> Result<Value, HttpError> {
        let request = HttpRequest::builder(method, R::SCHEMA.endpoint)
            .body(Value::Array(records))
            .build()?;
        self.executor
            .execute(&request)
            .await
            .map(|response| response.body)
    }

    async fn find_existing_seq<R: Resource>(&self, entity: &R) -> Result<String, ResourceError> {
        let schema = R::SCHEMA;
        let missing = || ResourceError::MissingIdentifier {
            resource: schema.name,
            operation: "upsert",
        };
        let id_field = schema.id_field.ok_or_else(missing)?;
        let encoded = codec::encode(entity)?;
        let id = encoded
            .get(id_field)
            .and_then(Value::as_str)
            .ok_or_else(missing)?;

        let existing: R = self
            .read_first(&ListQuery::new().filter(Filter::eq(id_field, id)))
            .await?;
        existing.seq().map(ToString::to_string).ok_or_else(missing)
    }
}

/// Decodes one record, logging a malformed payload.
fn decode_logged<R: Resource>(raw: &Value) -> Result<R, ValidationError> {
    codec::decode(raw).map_err(|e| {
        tracing::error!(error = %e, "Malformed record");
        e
    })
}

/// Writes `seq` into the identifier field of an encoded record.
pub(crate) fn set_seq<R: Resource>(
    body: &mut Value,
    seq: &str,
    operation: &'static str,
) -> Result<(), ResourceError> {
    let field = R::SCHEMA.seq_field.ok_or(ResourceError::MissingIdentifier {
        resource: R::SCHEMA.name,
        operation,
    })?;
    if let Value::Object(map) = body {
        map.insert(field.to_string(), Value::String(seq.to_string()));
    }
    Ok(())
}

/// Extracts the single record echoed by a create or update.
fn single_result<R: Resource>(
    body: &Value,
    resource: &'static str,
    records_key: &str,
) -> Result<R, ResourceError> {
    let record = body
        .get(records_key)
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .ok_or_else(|| ResourceError::UnexpectedPayload {
            resource,
            message: format!("expected a list of records under '{records_key}'"),
        })?;

    if let Some(entry) = ApiErrorEntry::from_record(record) {
        return Err(record_error(resource, entry));
    }
    Ok(decode_logged(record)?)
}

/// Turns an echoed record error into a resource error.
pub(crate) fn record_error(resource: &'static str, entry: ApiErrorEntry) -> ResourceError {
    if entry.mentions(ALREADY_EXISTS_CODE) {
        ResourceError::AlreadyExists {
            resource,
            message: entry.summary(),
        }
    } else if entry.mentions(MISSING_FIELD_CODE) {
        ResourceError::MissingField {
            resource,
            fields: entry.fields,
        }
    } else {
        ResourceError::UnexpectedPayload {
            resource,
            message: entry.summary(),
        }
    }
}

/// Reads the per-record message of a delete response.
fn delete_message(body: &Value, records_key: &str, seq: &str) -> Option<String> {
    let value = body.get(records_key)?.get(seq)?;
    Some(value.as_str().map_or_else(|| value.to_string(), ToString::to_string))
}

/// Reads the identifier of a raw record for `R`.
pub(crate) fn record_seq<R: Resource>(raw: &Value) -> Option<String> {
    raw_seq(raw, R::SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_query_defaults_to_client_page_size() {
        let query = ListQuery::new().to_query(10);
        assert_eq!(query.get("top").map(String::as_str), Some("10"));
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_list_query_renders_all_parameters() {
        let query = ListQuery::new()
            .filter(Filter::eq("lastName", "Smith"))
            .order_by("lastName")
            .order_by("firstName desc")
            .expand("salary")
            .page_size(250)
            .to_query(10);
        assert_eq!(query.get("top").map(String::as_str), Some("100"));
        assert_eq!(query.get("$filter").map(String::as_str), Some("lastName eq 'Smith'"));
        assert_eq!(query.get("orderBy").map(String::as_str), Some("lastName,firstName desc"));
        assert_eq!(query.get("expand").map(String::as_str), Some("salary"));
    }

    #[test]
    fn test_page_size_is_clamped_to_minimum() {
        let query = ListQuery::new().page_size(0).to_query(10);
        assert_eq!(query.get("top").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_delete_message_extraction() {
        let body = json!({"titles": {"42": "Successfully deleted"}});
        assert_eq!(
            delete_message(&body, "titles", "42").as_deref(),
            Some("Successfully deleted")
        );
        assert!(delete_message(&body, "titles", "43").is_none());
    }
}
