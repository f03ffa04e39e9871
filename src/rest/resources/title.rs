//! Title resource.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const TITLE_SCHEMA: Schema = Schema {
    name: "Title",
    endpoint: "api/v2/titles",
    seq_field: Some("ruleElementOwnerSeq"),
    id_field: Some("name"),
    fields: &[
        FieldSpec::optional("ruleElementOwnerSeq", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::required("effectiveStartDate", FieldKind::Date),
        FieldSpec::required("effectiveEndDate", FieldKind::Date),
        FieldSpec::optional("genericAttribute1", FieldKind::Text),
    ],
    expand: &[],
};

/// A job title positions are assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_element_owner_seq: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub effective_start_date: NaiveDate,
    pub effective_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_attribute1: Option<String>,
}

impl Title {
    /// A new title effective over `[start, end)`.
    #[must_use]
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            rule_element_owner_seq: None,
            name: name.into(),
            description: None,
            effective_start_date: start,
            effective_end_date: end,
            generic_attribute1: None,
        }
    }
}

impl Resource for Title {
    const SCHEMA: &'static Schema = &TITLE_SCHEMA;

    fn seq(&self) -> Option<&str> {
        self.rule_element_owner_seq.as_deref()
    }
}
