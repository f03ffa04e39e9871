//! Position resource.
//!
//! A position is a seat in the sales organisation, held by a participant
//! and carrying a title. Positions are effective-dated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::resources::common::{Amount, Reference, AMOUNT_SCHEMA};
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const POSITION_SCHEMA: Schema = Schema {
    name: "Position",
    endpoint: "api/v2/positions",
    seq_field: Some("ruleElementOwnerSeq"),
    id_field: Some("name"),
    fields: &[
        FieldSpec::optional("ruleElementOwnerSeq", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::optional("payee", FieldKind::Any),
        FieldSpec::optional("manager", FieldKind::Any),
        FieldSpec::optional("title", FieldKind::Any),
        FieldSpec::optional("positionGroup", FieldKind::Any),
        FieldSpec::optional("targetCompensation", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::required("effectiveStartDate", FieldKind::Date),
        FieldSpec::required("effectiveEndDate", FieldKind::Date),
        FieldSpec::optional("creditStartDate", FieldKind::Date),
        FieldSpec::optional("creditEndDate", FieldKind::Date),
        FieldSpec::optional("processingStartDate", FieldKind::Date),
        FieldSpec::optional("processingEndDate", FieldKind::Date),
        FieldSpec::optional("genericAttribute1", FieldKind::Text),
    ],
    expand: &["payee", "manager", "title", "positionGroup"],
};

/// A seat in the sales organisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// System identifier, assigned by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_element_owner_seq: Option<String>,
    /// Business key.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The participant holding the position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<Reference>,
    /// The managing position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_group: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_compensation: Option<Amount>,
    pub effective_start_date: NaiveDate,
    pub effective_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_attribute1: Option<String>,
}

impl Position {
    /// A new position effective over `[start, end)`.
    #[must_use]
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            rule_element_owner_seq: None,
            name: name.into(),
            description: None,
            payee: None,
            manager: None,
            title: None,
            position_group: None,
            target_compensation: None,
            effective_start_date: start,
            effective_end_date: end,
            credit_start_date: None,
            credit_end_date: None,
            processing_start_date: None,
            processing_end_date: None,
            generic_attribute1: None,
        }
    }
}

impl Resource for Position {
    const SCHEMA: &'static Schema = &POSITION_SCHEMA;

    fn seq(&self) -> Option<&str> {
        self.rule_element_owner_seq.as_deref()
    }
}
