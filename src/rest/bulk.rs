//! Batch create, update and delete.
//!
//! [`ResourceClient::bulk`] submits many records in one call and reports an
//! outcome per record, in submission order. The API accepts a whole array
//! for create and update and echoes it back, marking rejected records with
//! an `_ERROR_` entry; a batch with some rejected records comes back as a
//! client error whose body still lists every record. Deletes address one
//! record per request and are issued in order.
//!
//! Validation of the submitted entities happens before anything is sent: one
//! invalid entity fails the whole call with its position.

use serde_json::Value;

use crate::clients::{HttpError, HttpMethod};
use crate::rest::client::{record_error, record_seq, set_seq, ResourceClient};
use crate::rest::codec;
use crate::rest::errors::{tcmp_code, ApiErrorEntry, ResourceError};
use crate::rest::resource::Resource;

/// What a batch does to each record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkOperation {
    /// Create every record.
    Create,
    /// Update every record; each must carry its identifier.
    Update,
    /// Delete every record; each must carry its identifier.
    Delete,
}

/// Why one record of a batch failed.
#[derive(Clone, Debug, PartialEq)]
pub struct BulkFailure {
    /// The API error code, e.g. `TCMP_35004`, when one was given.
    pub code: Option<String>,
    /// The server's message.
    pub message: String,
    /// The resource error this failure maps to for a single-record call.
    pub error: ResourceError,
}

/// Outcome for one submitted record.
#[derive(Clone, Debug, PartialEq)]
pub struct BulkResult<R> {
    /// Position in the submitted batch.
    pub index: usize,
    /// The server's record (or, for deletes, the submitted one) or the failure.
    pub outcome: Result<R, BulkFailure>,
}

impl<R> BulkResult<R> {
    /// Returns `true` if the record succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl ResourceClient {
    /// Applies `operation` to every entity and reports per-record outcomes.
    ///
    /// Records the API rejects are reported as failures in the result; the
    /// call itself only fails for problems that affect the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] if any entity is invalid (no
    /// request is made), [`ResourceError::MissingIdentifier`] if an update
    /// lacks an identifier, or [`ResourceError::Http`] for transport,
    /// authentication or unrecognised failures.
    pub async fn bulk<R: Resource>(
        &self,
        entities: &[R],
        operation: BulkOperation,
    ) -> Result<Vec<BulkResult<R>>, ResourceError> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            resource = R::SCHEMA.name,
            ?operation,
            records = entities.len(),
            "Submitting batch"
        );

        match operation {
            BulkOperation::Create => self.bulk_write(entities, HttpMethod::Post).await,
            BulkOperation::Update => self.bulk_write(entities, HttpMethod::Put).await,
            BulkOperation::Delete => self.bulk_delete(entities).await,
        }
    }

    async fn bulk_write<R: Resource>(
        &self,
        entities: &[R],
        method: HttpMethod,
    ) -> Result<Vec<BulkResult<R>>, ResourceError> {
        let mut records = Vec::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            let mut body = codec::encode(entity)
                .map_err(|e| e.at(index, entity.seq().map(ToString::to_string)))?;
            if method == HttpMethod::Put {
                let seq = entity.seq().ok_or(ResourceError::MissingIdentifier {
                    resource: R::SCHEMA.name,
                    operation: "update",
                })?;
                set_seq::<R>(&mut body, seq, "update")?;
            }
            records.push(body);
        }

        let body = match self.write_raw::<R>(method, records).await {
            Ok(body) => body,
            Err(HttpError::NotModified) => {
                return Ok(entities
                    .iter()
                    .enumerate()
                    .map(|(index, entity)| BulkResult {
                        index,
                        outcome: Ok(entity.clone()),
                    })
                    .collect());
            }
            Err(error) => match echoed_records(&error, R::SCHEMA.records_key(), entities.len()) {
                Some(body) => {
                    tracing::debug!(resource = R::SCHEMA.name, "Batch partially rejected");
                    body
                }
                None => return Err(ResourceError::from_write_failure(R::SCHEMA.name, error)),
            },
        };

        let echoed = body
            .get(R::SCHEMA.records_key())
            .and_then(Value::as_array)
            .filter(|records| records.len() == entities.len())
            .ok_or_else(|| ResourceError::UnexpectedPayload {
                resource: R::SCHEMA.name,
                message: format!(
                    "expected {} records under '{}'",
                    entities.len(),
                    R::SCHEMA.records_key()
                ),
            })?;

        echoed
            .iter()
            .enumerate()
            .map(|(index, raw)| -> Result<BulkResult<R>, ResourceError> {
                let outcome = match ApiErrorEntry::from_record(raw) {
                    Some(entry) => Err(BulkFailure {
                        code: entry.code(),
                        message: entry.summary(),
                        error: record_error(R::SCHEMA.name, entry),
                    }),
                    None => Ok(codec::decode::<R>(raw)
                        .map_err(|e| e.at(index, record_seq::<R>(raw)))?),
                };
                Ok(BulkResult { index, outcome })
            })
            .collect()
    }

    async fn bulk_delete<R: Resource>(
        &self,
        entities: &[R],
    ) -> Result<Vec<BulkResult<R>>, ResourceError> {
        let mut results = Vec::with_capacity(entities.len());

        for (index, entity) in entities.iter().enumerate() {
            let outcome = match entity.seq() {
                None => {
                    let error = ResourceError::MissingIdentifier {
                        resource: R::SCHEMA.name,
                        operation: "delete",
                    };
                    Err(BulkFailure {
                        code: None,
                        message: error.to_string(),
                        error,
                    })
                }
                Some(seq) => match self.delete::<R>(seq).await {
                    Ok(_) => Ok(entity.clone()),
                    Err(error @ ResourceError::NotFound { .. }) => Err(BulkFailure {
                        code: None,
                        message: error.to_string(),
                        error,
                    }),
                    Err(ResourceError::DeleteFailed {
                        resource,
                        id,
                        message,
                    }) => Err(BulkFailure {
                        code: tcmp_code(&message),
                        message: message.clone(),
                        error: ResourceError::DeleteFailed {
                            resource,
                            id,
                            message,
                        },
                    }),
                    Err(error) => return Err(error),
                },
            };
            results.push(BulkResult { index, outcome });
        }

        Ok(results)
    }
}

/// The body of a partially rejected batch, if it still lists every record.
fn echoed_records(error: &HttpError, records_key: &str, expected: usize) -> Option<Value> {
    let HttpError::ClientRequest(response) = error else {
        return None;
    };
    let records = response.body.get(records_key)?.as_array()?;
    (records.len() == expected).then(|| response.body.clone())
}
