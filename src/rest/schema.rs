//! Static descriptions of resource payloads.
//!
//! Every resource type carries a [`Schema`]: its endpoint, identifier field,
//! and for each field the wire name, kind, and whether it is required or
//! nullable. The codec validates payloads against it in both directions.

use std::fmt;

/// The kind of value a field holds on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    /// A string.
    Text,
    /// An integral number. Numeric strings are accepted.
    Integer,
    /// A decimal number. Numeric strings are accepted.
    Decimal,
    /// A boolean. `"true"` and `"false"` strings are accepted.
    Boolean,
    /// A calendar date, `YYYY-MM-DD` or an RFC 3339 timestamp.
    Date,
    /// An RFC 3339 timestamp.
    DateTime,
    /// A nested object described by its own schema.
    Object(&'static Schema),
    /// A list whose elements are all of one kind.
    List(&'static FieldKind),
    /// Anything; passed through untouched.
    Any,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Integer => f.write_str("integer"),
            Self::Decimal => f.write_str("decimal"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("datetime"),
            Self::Object(schema) => write!(f, "{} object", schema.name),
            Self::List(kind) => write!(f, "list of {kind}"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// One field of a schema.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSpec {
    /// Name on the wire, e.g. `payeeId`.
    pub wire_name: &'static str,
    /// Expected kind.
    pub kind: FieldKind,
    /// Must be present and, for text, not blank when sent.
    pub required: bool,
    /// May be `null`.
    pub nullable: bool,
}

impl FieldSpec {
    /// A required, non-nullable field.
    #[must_use]
    pub const fn required(wire_name: &'static str, kind: FieldKind) -> Self {
        Self {
            wire_name,
            kind,
            required: true,
            nullable: false,
        }
    }

    /// An optional, nullable field.
    #[must_use]
    pub const fn optional(wire_name: &'static str, kind: FieldKind) -> Self {
        Self {
            wire_name,
            kind,
            required: false,
            nullable: true,
        }
    }
}

/// Description of one resource payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schema {
    /// Resource name used in errors, e.g. `Participant`.
    pub name: &'static str,
    /// Collection endpoint relative to the base URL, e.g.
    /// `api/v2/participants`. Empty for nested value types.
    pub endpoint: &'static str,
    /// Wire name of the system identifier, e.g. `payeeSeq`.
    pub seq_field: Option<&'static str>,
    /// Wire name of the business key users search by, e.g. `payeeId`.
    pub id_field: Option<&'static str>,
    /// Field descriptions.
    pub fields: &'static [FieldSpec],
    /// Reference fields the API can expand inline.
    pub expand: &'static [&'static str],
}

impl Schema {
    /// A schema for a nested value type with no endpoint of its own.
    #[must_use]
    pub const fn nested(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            name,
            endpoint: "",
            seq_field: None,
            id_field: None,
            fields,
            expand: &[],
        }
    }

    /// Body key holding the records, the last endpoint segment.
    ///
    /// ```rust
    /// use sapim::rest::resources::Participant;
    /// use sapim::rest::Resource;
    ///
    /// assert_eq!(Participant::SCHEMA.records_key(), "participants");
    /// ```
    #[must_use]
    pub fn records_key(&self) -> &'static str {
        self.endpoint
            .rsplit('/')
            .next()
            .unwrap_or(self.endpoint)
    }

    /// Path addressing one record, e.g. `api/v2/participants(123)`.
    #[must_use]
    pub fn record_path(&self, seq: &str) -> String {
        format!("{}({seq})", self.endpoint)
    }

    /// Looks up a field by wire name.
    #[must_use]
    pub fn field(&self, wire_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    /// Wire names of all required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.wire_name)
    }
}
