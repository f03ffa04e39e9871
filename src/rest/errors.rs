//! Resource-level error types.
//!
//! [`ResourceError`] adds resource semantics on top of [`HttpError`]: the
//! API reports most business failures with a 4xx and a body that echoes the
//! submitted records, each carrying an `_ERROR_` message with a `TCMP_` code.
//! This module recognises the codes that matter:
//!
//! - `TCMP_35004`: [`ResourceError::AlreadyExists`]
//! - `TCMP_1002`: [`ResourceError::MissingField`]
//! - `TCMP_09007`: [`ResourceError::NotFound`]
//!
//! Anything else is passed through as [`ResourceError::Http`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sapim::rest::ResourceError;
//!
//! match client.create(&participant).await {
//!     Ok(created) => println!("created {:?}", created.payee_seq),
//!     Err(ResourceError::AlreadyExists { message, .. }) => println!("exists: {message}"),
//!     Err(ResourceError::Validation(e)) => println!("bad fields: {:?}", e.fields()),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::clients::HttpError;
use crate::rest::codec::ValidationError;

/// Key the API uses for a record-level error message.
pub const ERROR_KEY: &str = "_ERROR_";

/// Code for a record that already exists.
pub const ALREADY_EXISTS_CODE: &str = "TCMP_35004";

/// Code for a required field the server found missing.
pub const MISSING_FIELD_CODE: &str = "TCMP_1002";

/// Code for a record that does not exist.
pub const NOT_FOUND_CODE: &str = "TCMP_09007";

/// Error type for resource operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResourceError {
    /// The resource does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The resource name.
        resource: &'static str,
        /// The identifier or filter that was requested.
        id: String,
    },

    /// Creating the resource failed because it already exists.
    #[error("{resource} already exists: {message}")]
    AlreadyExists {
        /// The resource name.
        resource: &'static str,
        /// The server's message.
        message: String,
    },

    /// The server reported required fields as missing.
    #[error("{resource} is missing required fields: {fields:?}")]
    MissingField {
        /// The resource name.
        resource: &'static str,
        /// Field name to server message.
        fields: HashMap<String, String>,
    },

    /// The server refused to delete the resource.
    #[error("Failed to delete {resource} {id}: {message}")]
    DeleteFailed {
        /// The resource name.
        resource: &'static str,
        /// The identifier.
        id: String,
        /// The server's message.
        message: String,
    },

    /// The response body does not have the expected shape.
    #[error("Unexpected {resource} payload: {message}")]
    UnexpectedPayload {
        /// The resource name.
        resource: &'static str,
        /// What was wrong.
        message: String,
    },

    /// The operation needs the resource's system identifier, which it lacks.
    #[error("Cannot {operation} {resource} without an identifier")]
    MissingIdentifier {
        /// The resource name.
        resource: &'static str,
        /// The operation attempted.
        operation: &'static str,
    },

    /// A payload failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An HTTP-level error that has no resource-specific meaning.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Returns `true` if the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Http(HttpError::NotFound(_)))
    }

    /// Returns `true` if the failure was transient and retries ran out.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(HttpError::Transient(_)))
    }

    /// Returns the HTTP status behind this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Http(e) => e.request_id(),
            _ => None,
        }
    }

    /// Maps a failed create or update to a resource error.
    pub(crate) fn from_write_failure(resource: &'static str, error: HttpError) -> Self {
        let Some(body) = error.body() else {
            return Self::Http(error);
        };

        for entry in error_entries(body) {
            if entry.mentions(ALREADY_EXISTS_CODE) {
                return Self::AlreadyExists {
                    resource,
                    message: entry.summary(),
                };
            }
            if entry.mentions(MISSING_FIELD_CODE) {
                return Self::MissingField {
                    resource,
                    fields: entry.fields,
                };
            }
        }
        Self::Http(error)
    }

    /// Maps a failed read or delete of one record to a resource error.
    pub(crate) fn from_record_failure(resource: &'static str, id: &str, error: HttpError) -> Self {
        if error.is_not_found() {
            return Self::NotFound {
                resource,
                id: id.to_string(),
            };
        }
        if let Some(body) = error.body() {
            if collect_strings(body).iter().any(|s| s.contains(NOT_FOUND_CODE)) {
                return Self::NotFound {
                    resource,
                    id: id.to_string(),
                };
            }
        }
        Self::Http(error)
    }
}

/// One record-level error reported by the API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ApiErrorEntry {
    /// The `_ERROR_` message, if any.
    pub message: Option<String>,
    /// Other string members carrying a `TCMP_` code, by field name.
    pub fields: HashMap<String, String>,
}

impl ApiErrorEntry {
    /// Reads an error entry from one echoed record, if it carries one.
    pub fn from_record(record: &Value) -> Option<Self> {
        let map = record.as_object()?;
        let message = map
            .get(ERROR_KEY)
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let fields: HashMap<String, String> = map
            .iter()
            .filter(|(key, _)| key.as_str() != ERROR_KEY)
            .filter_map(|(key, value)| {
                value
                    .as_str()
                    .filter(|s| s.contains("TCMP_"))
                    .map(|s| (key.clone(), s.to_string()))
            })
            .collect();

        if message.is_none() && fields.is_empty() {
            None
        } else {
            Some(Self { message, fields })
        }
    }

    pub fn mentions(&self, code: &str) -> bool {
        self.message.as_deref().is_some_and(|m| m.contains(code))
            || self.fields.values().any(|m| m.contains(code))
    }

    /// The first `TCMP_` code in the entry.
    pub fn code(&self) -> Option<String> {
        self.message
            .iter()
            .chain(self.fields.values())
            .find_map(|m| tcmp_code(m))
    }

    pub fn summary(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        parts.sort();
        parts.join("; ")
    }
}

/// Every error entry in a response body, wherever the records sit.
fn error_entries(body: &Value) -> Vec<ApiErrorEntry> {
    let mut entries = Vec::new();
    let mut visit = |value: &Value| {
        if let Some(entry) = ApiErrorEntry::from_record(value) {
            entries.push(entry);
        }
    };
    match body {
        Value::Object(map) => {
            visit(body);
            for value in map.values() {
                match value {
                    Value::Array(items) => items.iter().for_each(&mut visit),
                    Value::Object(_) => visit(value),
                    _ => {}
                }
            }
        }
        Value::Array(items) => items.iter().for_each(visit),
        _ => {}
    }
    entries
}

pub(crate) fn collect_strings(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().flat_map(collect_strings).collect(),
        Value::Object(map) => map.values().flat_map(collect_strings).collect(),
        _ => Vec::new(),
    }
}

/// Extracts a code such as `TCMP_35004` from a message.
pub(crate) fn tcmp_code(message: &str) -> Option<String> {
    let start = message.find("TCMP_")?;
    let code: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    Some(code)
}
