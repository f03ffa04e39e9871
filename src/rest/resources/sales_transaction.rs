//! Sales transaction resource.
//!
//! Transactions are the raw events compensation is calculated from. Each
//! belongs to a sales order and is keyed by its line and sub-line numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::resources::common::{Amount, Reference, AMOUNT_SCHEMA};
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const SALES_TRANSACTION_SCHEMA: Schema = Schema {
    name: "SalesTransaction",
    endpoint: "api/v2/salesTransactions",
    seq_field: Some("salesTransactionSeq"),
    id_field: None,
    fields: &[
        FieldSpec::optional("salesTransactionSeq", FieldKind::Text),
        FieldSpec::required("salesOrder", FieldKind::Any),
        FieldSpec::required("lineNumber", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::required("subLineNumber", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::required("eventType", FieldKind::Any),
        FieldSpec::required("compensationDate", FieldKind::Date),
        FieldSpec::optional("value", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::optional("numberOfUnits", FieldKind::Object(&AMOUNT_SCHEMA)),
        FieldSpec::optional("productId", FieldKind::Text),
        FieldSpec::optional("productName", FieldKind::Text),
        FieldSpec::optional("productDescription", FieldKind::Text),
        FieldSpec::optional("accountingDate", FieldKind::Date),
        FieldSpec::optional("isRunnable", FieldKind::Boolean),
        FieldSpec::optional("reason", FieldKind::Any),
        FieldSpec::optional("businessUnits", FieldKind::List(&FieldKind::Any)),
        FieldSpec::optional("genericAttribute1", FieldKind::Text),
    ],
    expand: &["salesOrder", "eventType", "reason", "businessUnits"],
};

/// A single sales event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_transaction_seq: Option<String>,
    /// The order the transaction belongs to.
    pub sales_order: Reference,
    pub line_number: Amount,
    pub sub_line_number: Amount,
    pub event_type: Reference,
    /// Date the transaction counts towards.
    pub compensation_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_units: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounting_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_runnable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_units: Option<Vec<Reference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_attribute1: Option<String>,
}

impl SalesTransaction {
    /// A new transaction on line `line.sub_line` of the given order.
    #[must_use]
    pub fn new(
        sales_order: impl Into<Reference>,
        line: f64,
        sub_line: f64,
        event_type: impl Into<Reference>,
        compensation_date: NaiveDate,
    ) -> Self {
        Self {
            sales_transaction_seq: None,
            sales_order: sales_order.into(),
            line_number: Amount::new(line, "integer"),
            sub_line_number: Amount::new(sub_line, "integer"),
            event_type: event_type.into(),
            compensation_date,
            value: None,
            number_of_units: None,
            product_id: None,
            product_name: None,
            product_description: None,
            accounting_date: None,
            is_runnable: None,
            reason: None,
            business_units: None,
            generic_attribute1: None,
        }
    }
}

impl Resource for SalesTransaction {
    const SCHEMA: &'static Schema = &SALES_TRANSACTION_SCHEMA;
    // Larger pages repeat or drop transactions on some tenants.
    const PAGE_SIZE_LIMIT: Option<u32> = Some(1);

    fn seq(&self) -> Option<&str> {
        self.sales_transaction_seq.as_deref()
    }
}
