//! Value types shared by several resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rest::schema::{FieldKind, FieldSpec, Schema};

/// Schema of [`UnitType`].
pub const UNIT_TYPE_SCHEMA: Schema = Schema::nested(
    "UnitType",
    &[
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("unitTypeSeq", FieldKind::Text),
    ],
);

/// Schema of [`Amount`].
pub const AMOUNT_SCHEMA: Schema = Schema::nested(
    "Value",
    &[
        FieldSpec::required("value", FieldKind::Decimal),
        FieldSpec::required("unitType", FieldKind::Object(&UNIT_TYPE_SCHEMA)),
    ],
);

/// The unit of an [`Amount`], e.g. a currency or `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    /// Unit name, e.g. `USD`.
    pub name: String,
    /// System identifier of the unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type_seq: Option<String>,
}

/// A number with a unit, the API's `Value` object.
///
/// `value` is an `f64`, so decimals with more than about 15 significant
/// digits are rounded when decoded. Amounts that must survive a round trip
/// exactly should stay within that precision.
///
/// ```rust
/// use sapim::rest::resources::Amount;
///
/// let salary = Amount::new(50_000.0, "USD");
/// assert_eq!(salary.unit_type.name, "USD");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    /// The number.
    pub value: f64,
    /// Its unit.
    pub unit_type: UnitType,
}

impl Amount {
    /// An amount in the named unit.
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit_type: UnitType {
                name: unit.into(),
                unit_type_seq: None,
            },
        }
    }
}

/// A reference to another record.
///
/// Unexpanded references are the target's system identifier; expanded ones
/// are objects with at least a `key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Reference {
    /// The target's system identifier.
    Seq(String),
    /// The expanded target.
    Expanded(Value),
}

impl Reference {
    /// The target's system identifier, if known.
    #[must_use]
    pub fn seq(&self) -> Option<&str> {
        match self {
            Self::Seq(seq) => Some(seq),
            Self::Expanded(value) => value.get("key").and_then(Value::as_str),
        }
    }

    /// The display name of an expanded reference.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Seq(_) => None,
            Self::Expanded(value) => value.get("displayName").and_then(Value::as_str),
        }
    }
}

impl From<&str> for Reference {
    fn from(seq: &str) -> Self {
        Self::Seq(seq.to_string())
    }
}

impl From<String> for Reference {
    fn from(seq: String) -> Self {
        Self::Seq(seq)
    }
}
