//! Participant resource.
//!
//! A participant is a payee: a person or entity that earns compensation.
//! Participants are effective-dated; `payeeId` is the business key.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::resources::common::{Amount, AMOUNT_SCHEMA};
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const PARTICIPANT_SCHEMA: Schema = Schema {
    name: "Participant",
    endpoint: "api/v2/participants",
    seq_field: Some("payeeSeq"),
    id_field: Some("payeeId"),
    fields: &[
        FieldSpec::optional("payeeSeq", FieldKind::Text),
        FieldSpec::required("payeeId", FieldKind::Text),
        FieldSpec::optional("prefix", FieldKind::Text),
        FieldSpec::optional("firstName", FieldKind::Text),
        FieldSpec::optional("middleName", FieldKind::Text),
        FieldSpec::optional("lastName", FieldKind::Text),
        FieldSpec::optional("suffix", FieldKind::Text),
        FieldSpec::optional("taxId", FieldKind::Text),
        FieldSpec::optional("userId", FieldKind::Text),
        FieldSpec::optional("preferredLanguage", FieldKind::Text),
        FieldSpec::optional("salary", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::optional("hireDate", FieldKind::Date),
        FieldSpec::optional("terminationDate", FieldKind::Date),
        FieldSpec::required("effectiveStartDate", FieldKind::Date),
        FieldSpec::required("effectiveEndDate", FieldKind::Date),
        FieldSpec::optional("genericAttribute1", FieldKind::Text),
        FieldSpec::optional("genericAttribute2", FieldKind::Text),
        FieldSpec::optional("genericNumber1", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::optional("genericDate1", FieldKind::Date),
        FieldSpec::optional("genericBoolean1", FieldKind::Boolean),
        FieldSpec::optional("createDate", FieldKind::DateTime),
    ],
    expand: &[],
};

/// A payee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// System identifier, assigned by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_seq: Option<String>,
    /// Business key.
    pub payee_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Login of the participant, if they have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<NaiveDate>,
    /// First day this version is in effect.
    pub effective_start_date: NaiveDate,
    /// Day after the last day this version is in effect.
    pub effective_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_attribute1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_attribute2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_number1: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_date1: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_boolean1: Option<bool>,
    /// Read-only creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_date: Option<DateTime<FixedOffset>>,
}

impl Participant {
    /// A new participant effective over `[start, end)`.
    #[must_use]
    pub fn new(payee_id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            payee_seq: None,
            payee_id: payee_id.into(),
            prefix: None,
            first_name: None,
            middle_name: None,
            last_name: None,
            suffix: None,
            tax_id: None,
            user_id: None,
            preferred_language: None,
            salary: None,
            hire_date: None,
            termination_date: None,
            effective_start_date: start,
            effective_end_date: end,
            generic_attribute1: None,
            generic_attribute2: None,
            generic_number1: None,
            generic_date1: None,
            generic_boolean1: None,
            create_date: None,
        }
    }
}

impl Resource for Participant {
    const SCHEMA: &'static Schema = &PARTICIPANT_SCHEMA;

    fn seq(&self) -> Option<&str> {
        self.payee_seq.as_deref()
    }
}
