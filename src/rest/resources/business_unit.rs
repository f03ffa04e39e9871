//! Business unit resource.

use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::resources::common::Reference;
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

const BUSINESS_UNIT_SCHEMA: Schema = Schema {
    name: "BusinessUnit",
    endpoint: "api/v2/businessUnits",
    seq_field: Some("businessUnitSeq"),
    id_field: Some("name"),
    fields: &[
        FieldSpec::optional("businessUnitSeq", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::optional("processingUnit", FieldKind::Any),
    ],
    expand: &["processingUnit"],
};

/// A business unit, used to partition data and access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit_seq: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_unit: Option<Reference>,
}

impl BusinessUnit {
    /// A new business unit.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            business_unit_seq: None,
            name: name.into(),
            description: None,
            processing_unit: None,
        }
    }
}

impl Resource for BusinessUnit {
    const SCHEMA: &'static Schema = &BUSINESS_UNIT_SCHEMA;

    fn seq(&self) -> Option<&str> {
        self.business_unit_seq.as_deref()
    }
}
