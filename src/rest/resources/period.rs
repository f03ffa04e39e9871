//! Period resource.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::resources::common::Reference;
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const PERIOD_SCHEMA: Schema = Schema {
    name: "Period",
    endpoint: "api/v2/periods",
    seq_field: Some("periodSeq"),
    id_field: Some("name"),
    fields: &[
        FieldSpec::optional("periodSeq", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("shortName", FieldKind::Text),
        FieldSpec::required("startDate", FieldKind::Date),
        FieldSpec::required("endDate", FieldKind::Date),
        FieldSpec::optional("calendar", FieldKind::Any),
        FieldSpec::optional("periodType", FieldKind::Any),
        FieldSpec::optional("parent", FieldKind::Any),
    ],
    expand: &["calendar", "periodType", "parent"],
};

/// A calendar period pipelines run against, e.g. a month or quarter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seq: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub start_date: NaiveDate,
    /// Day after the last day of the period.
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_type: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Reference>,
}

impl Period {
    /// A new period covering `[start, end)`.
    #[must_use]
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            period_seq: None,
            name: name.into(),
            short_name: None,
            start_date: start,
            end_date: end,
            calendar: None,
            period_type: None,
            parent: None,
        }
    }

    /// Whether `date` falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }
}

impl Resource for Period {
    const SCHEMA: &'static Schema = &PERIOD_SCHEMA;

    fn seq(&self) -> Option<&str> {
        self.period_seq.as_deref()
    }
}
