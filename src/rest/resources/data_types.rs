//! Classification data types: event types, credit types and reasons.
//!
//! The three share one shape and one identifier field, `dataTypeSeq`;
//! only the business-key field name differs.

use serde::{Deserialize, Serialize};

use crate::rest::resource::Resource;
use crate::rest::schema::{FieldKind, FieldSpec, Schema};

macro_rules! data_type {
    ($(#[$meta:meta])* $name:ident, $schema:ident, $endpoint:literal, $id_field:ident, $id_wire:literal) => {
        const $schema: Schema = Schema {
            name: stringify!($name),
            endpoint: $endpoint,
            seq_field: Some("dataTypeSeq"),
            id_field: Some($id_wire),
            fields: &[
                FieldSpec::optional("dataTypeSeq", FieldKind::Text),
                FieldSpec::required($id_wire, FieldKind::Text),
                FieldSpec::optional("description", FieldKind::Text),
            ],
            expand: &[],
        };

        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(skip_serializing_if = "Option::is_none")]
            pub data_type_seq: Option<String>,
            /// Business key.
            pub $id_field: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            pub description: Option<String>,
        }

        impl $name {
            /// A new record with the given business key.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self {
                    data_type_seq: None,
                    $id_field: id.into(),
                    description: None,
                }
            }
        }

        impl Resource for $name {
            const SCHEMA: &'static Schema = &$schema;

            fn seq(&self) -> Option<&str> {
                self.data_type_seq.as_deref()
            }
        }
    };
}

data_type!(
    /// The kind of event a sales transaction records, e.g. `SALE`.
    EventType,
    EVENT_TYPE_SCHEMA,
    "api/v2/eventTypes",
    event_type_id,
    "eventTypeId"
);

data_type!(
    /// The kind of credit a rule produces.
    CreditType,
    CREDIT_TYPE_SCHEMA,
    "api/v2/creditTypes",
    credit_type_id,
    "creditTypeId"
);

data_type!(
    /// A reason code attached to transactions and adjustments.
    Reason,
    REASON_SCHEMA,
    "api/v2/reasons",
    reason_id,
    "reasonId"
);
