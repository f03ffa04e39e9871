//! Walking paginated collections.
//!
//! List endpoints return one page of records under the collection key (e.g.
//! `participants`) together with a continuation marker. [`PageWalker`]
//! follows the markers until the collection is exhausted, either page by page
//! with [`PageWalker::next_page`] or as a lazy stream of records with
//! [`PageWalker::into_records`].
//!
//! # Continuation
//!
//! The marker format is pluggable through [`PaginationScheme`]:
//!
//! - [`PaginationScheme::NextLink`] (the default): the body carries a relative
//!   link such as `"/v2/participants?skip=10&top=10"` in a `next` field. The
//!   following request is a GET to the API prefix joined with that link.
//! - [`PaginationScheme::Offset`]: the walker increments a skip parameter by
//!   the page size for as long as full pages come back.
//!
//! The walk stops on a missing marker or an empty page. A failing page ends
//! the walk with that error; records already yielded stay yielded.

use std::borrow::Cow;
use std::collections::HashMap;

use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;

use crate::clients::errors::HttpError;
use crate::clients::executor::RequestExecutor;
use crate::clients::http_request::{HttpMethod, HttpRequest};

/// How the next page of a collection is located.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaginationScheme {
    /// Follow a relative link found in the response body.
    NextLink {
        /// Body field holding the link.
        field: String,
    },
    /// Advance a skip parameter by the page size.
    Offset {
        /// Name of the skip parameter.
        skip_param: String,
        /// Name of the page size parameter.
        top_param: String,
    },
}

impl Default for PaginationScheme {
    fn default() -> Self {
        Self::NextLink {
            field: "next".to_string(),
        }
    }
}

impl PaginationScheme {
    /// An offset scheme using `skip` and `top`.
    #[must_use]
    pub fn offset() -> Self {
        Self::Offset {
            skip_param: "skip".to_string(),
            top_param: "top".to_string(),
        }
    }

    /// Works out the request for the page after `current`, if any.
    fn next_request(
        &self,
        current: &HttpRequest,
        body: &Value,
        page_len: usize,
        api_prefix: &str,
    ) -> Option<HttpRequest> {
        if page_len == 0 {
            return None;
        }

        match self {
            Self::NextLink { field } => {
                let link = body.get(field)?.as_str()?.trim();
                if link.is_empty() {
                    return None;
                }
                let (path, query) = resolve_link(link, api_prefix);
                Some(HttpRequest {
                    http_method: HttpMethod::Get,
                    path,
                    body: None,
                    query,
                    extra_headers: current.extra_headers.clone(),
                })
            }
            Self::Offset {
                skip_param,
                top_param,
            } => {
                let top: usize = current.query.get(top_param)?.parse().ok()?;
                if page_len < top {
                    return None;
                }
                let skip: usize = current
                    .query
                    .get(skip_param)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                let mut next = current.clone();
                next.query
                    .insert(skip_param.clone(), (skip + page_len).to_string());
                Some(next)
            }
        }
    }
}

/// Turns a continuation link into a path under `api_prefix` and its decoded
/// query parameters.
///
/// Absolute links are reduced to their path. A path that already starts
/// with the prefix is kept as is.
fn resolve_link(link: &str, api_prefix: &str) -> (String, HashMap<String, String>) {
    let without_host = link
        .find("://")
        .map_or(link, |scheme_end| {
            let rest = &link[scheme_end + 3..];
            rest.find('/').map_or("", |i| &rest[i..])
        });

    let (path, query) = without_host
        .split_once('?')
        .unwrap_or((without_host, ""));
    let path = path.trim_start_matches('/');
    let prefix = api_prefix.trim_matches('/');
    let path = if prefix.is_empty() || path.starts_with(&format!("{prefix}/")) {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    };

    let query = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect();

    (path, query)
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).ok().map(Cow::into_owned);
    decoded.unwrap_or(spaced)
}

/// Fetches the pages of one collection in order.
#[derive(Debug)]
pub struct PageWalker<'a> {
    executor: &'a RequestExecutor,
    scheme: &'a PaginationScheme,
    api_prefix: &'a str,
    records_key: &'a str,
    next: Option<HttpRequest>,
    requests_sent: u32,
}

impl<'a> PageWalker<'a> {
    /// Creates a walker starting at `first`.
    ///
    /// `records_key` names the body field holding each page's records.
    #[must_use]
    pub const fn new(
        executor: &'a RequestExecutor,
        scheme: &'a PaginationScheme,
        api_prefix: &'a str,
        records_key: &'a str,
        first: HttpRequest,
    ) -> Self {
        Self {
            executor,
            scheme,
            api_prefix,
            records_key,
            next: Some(first),
            requests_sent: 0,
        }
    }

    /// Number of page requests issued so far.
    #[must_use]
    pub const fn requests_sent(&self) -> u32 {
        self.requests_sent
    }

    /// Fetches the next page, or `None` once the collection is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the [`HttpError`] of the failing page request, or
    /// [`HttpError::UnexpectedResponse`] if the body has no record array
    /// under the collection key. The walk ends after an error.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>, HttpError> {
        let Some(request) = self.next.take() else {
            return Ok(None);
        };

        self.requests_sent += 1;
        let response = self.executor.execute(&request).await?;

        let records = match response.body.get(self.records_key) {
            Some(Value::Array(records)) => records.clone(),
            None | Some(Value::Null) => Vec::new(),
            Some(_) => {
                return Err(HttpError::UnexpectedResponse {
                    code: response.code,
                    message: format!("'{}' is not a list of records", self.records_key),
                })
            }
        };

        self.next =
            self.scheme
                .next_request(&request, &response.body, records.len(), self.api_prefix);
        tracing::debug!(
            path = %request.path,
            records = records.len(),
            more = self.next.is_some(),
            "Fetched page"
        );
        Ok(Some(records))
    }

    /// Streams every record of the collection, fetching pages lazily.
    pub fn into_records(self) -> impl Stream<Item = Result<Value, HttpError>> + 'a {
        stream::try_unfold(self, |mut walker| async move {
            let page = walker.next_page().await?;
            Ok::<_, HttpError>(page.map(|records| {
                let records = records.into_iter().map(Ok::<Value, HttpError>);
                (stream::iter(records), walker)
            }))
        })
        .try_flatten()
    }
}
