//! Validating conversion between resources and wire payloads.
//!
//! [`encode`] turns a resource into the JSON object sent to the API and
//! [`decode`] turns a raw record into a resource. Both check the payload
//! against the resource's [`Schema`] and report every problem found as a
//! single [`ValidationError`] naming the offending fields.
//!
//! # Encoding
//!
//! - unset optional fields (`null`) are omitted
//! - required fields must be present, non-null, and not blank text
//! - nothing is sent when validation fails
//!
//! # Decoding
//!
//! - required fields must be present
//! - compatible wire types are coerced: numeric strings to numbers, `"true"`
//!   and `"false"` to booleans, numbers to text, timestamps to dates
//! - fields the schema does not describe are ignored
//! - decoding a page stops at the first bad record, reporting its position

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::rest::resource::Resource;
use crate::rest::schema::{FieldKind, Schema};

/// Field name used for problems with the record as a whole.
pub const RECORD_FIELD: &str = "<record>";

/// What is wrong with a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Problem {
    /// A required field is absent or blank.
    Missing,
    /// A non-nullable field is `null`.
    Null,
    /// The value has the wrong JSON type.
    WrongType {
        /// The kind the schema expects.
        expected: String,
        /// The JSON type found.
        found: &'static str,
    },
    /// The value has the right type but cannot be used.
    Invalid {
        /// Why.
        reason: String,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is required"),
            Self::Null => f.write_str("must not be null"),
            Self::WrongType { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::Invalid { reason } => f.write_str(reason),
        }
    }
}

/// A problem with one field, addressed by its wire path (e.g. `salary.unitType.name`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    /// Wire path of the field.
    pub field: String,
    /// What is wrong.
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// Position of a failing record within a page or batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordRef {
    /// Zero-based index.
    pub index: usize,
    /// System identifier of the record, when it has one.
    pub seq: Option<String>,
}

/// A payload that does not match its schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{schema}{} failed validation: {}", describe_record(.record), describe_issues(.issues))]
pub struct ValidationError {
    /// Resource name.
    pub schema: &'static str,
    /// The failing record, when validating a page or batch.
    pub record: Option<RecordRef>,
    /// Every problem found.
    pub issues: Vec<FieldIssue>,
}

fn describe_record(record: &Option<RecordRef>) -> String {
    match record {
        Some(RecordRef {
            index,
            seq: Some(seq),
        }) => format!(" record {index} ({seq})"),
        Some(RecordRef { index, seq: None }) => format!(" record {index}"),
        None => String::new(),
    }
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    fn whole_record(schema: &'static str, reason: impl Into<String>) -> Self {
        Self {
            schema,
            record: None,
            issues: vec![FieldIssue {
                field: RECORD_FIELD.to_string(),
                problem: Problem::Invalid {
                    reason: reason.into(),
                },
            }],
        }
    }

    /// Wire paths of every field with a problem.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    /// Returns `true` if `field` has a problem.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }

    #[must_use]
    pub(crate) fn at(mut self, index: usize, seq: Option<String>) -> Self {
        self.record = Some(RecordRef { index, seq });
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

/// Encodes `entity` into the JSON object sent to the API.
///
/// # Errors
///
/// Returns [`ValidationError`] if a required field is missing or blank, or a
/// field does not match its declared kind.
pub fn encode<R: Resource>(entity: &R) -> Result<Value, ValidationError> {
    encode_with(entity, R::SCHEMA)
}

/// Encodes any serializable value against an explicit schema.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_with<T: Serialize>(
    entity: &T,
    schema: &'static Schema,
) -> Result<Value, ValidationError> {
    let value = serde_json::to_value(entity)
        .map_err(|e| ValidationError::whole_record(schema.name, e.to_string()))?;
    let value = strip_nulls(value);

    let Value::Object(map) = &value else {
        return Err(ValidationError::whole_record(schema.name, "not a JSON object"));
    };
    check(map, schema, Mode::Encode)?;
    Ok(value)
}

/// Decodes one raw record into a resource.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every field that is missing or cannot
/// be coerced to its declared kind.
pub fn decode<R: Resource>(raw: &Value) -> Result<R, ValidationError> {
    decode_with(raw, R::SCHEMA)
}

/// Decodes a raw record against an explicit schema.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with<T: DeserializeOwned>(
    raw: &Value,
    schema: &'static Schema,
) -> Result<T, ValidationError> {
    let Value::Object(map) = raw else {
        return Err(ValidationError::whole_record(
            schema.name,
            format!("expected an object, found {}", json_type(raw)),
        ));
    };
    let normalized = check(map, schema, Mode::Decode)?;
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| ValidationError::whole_record(schema.name, e.to_string()))
}

/// Decodes a page of raw records, all or nothing.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first bad record, with its
/// position and identifier filled in.
pub fn decode_page<R: Resource>(records: &[Value]) -> Result<Vec<R>, ValidationError> {
    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            decode::<R>(raw).map_err(|e| e.at(index, raw_seq(raw, R::SCHEMA)))
        })
        .collect()
}

/// Reads the identifier of a raw record, if the schema has one.
pub(crate) fn raw_seq(raw: &Value, schema: &Schema) -> Option<String> {
    let value = raw.get(schema.seq_field?)?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Validates a raw object and returns it with values coerced.
fn check(
    map: &Map<String, Value>,
    schema: &'static Schema,
    mode: Mode,
) -> Result<Map<String, Value>, ValidationError> {
    let mut issues = Vec::new();
    let normalized = check_object(map, schema, "", mode, &mut issues);
    if issues.is_empty() {
        Ok(normalized)
    } else {
        Err(ValidationError {
            schema: schema.name,
            record: None,
            issues,
        })
    }
}

fn check_object(
    map: &Map<String, Value>,
    schema: &Schema,
    prefix: &str,
    mode: Mode,
    issues: &mut Vec<FieldIssue>,
) -> Map<String, Value> {
    let mut out = map.clone();

    for spec in schema.fields {
        let path = if prefix.is_empty() {
            spec.wire_name.to_string()
        } else {
            format!("{prefix}.{}", spec.wire_name)
        };

        match map.get(spec.wire_name) {
            None => {
                if spec.required {
                    issues.push(issue(path, Problem::Missing));
                }
            }
            Some(Value::Null) => {
                if spec.required {
                    issues.push(issue(path, Problem::Missing));
                } else if !spec.nullable {
                    issues.push(issue(path, Problem::Null));
                }
            }
            Some(Value::String(s))
                if mode == Mode::Encode
                    && spec.required
                    && matches!(spec.kind, FieldKind::Text)
                    && s.trim().is_empty() =>
            {
                issues.push(issue(path, Problem::Missing));
            }
            Some(value) => {
                if let Some(coerced) = coerce(spec.kind, value, &path, mode, issues) {
                    out.insert(spec.wire_name.to_string(), coerced);
                }
            }
        }
    }

    out
}

#[allow(clippy::cast_possible_truncation)]
fn coerce(
    kind: FieldKind,
    value: &Value,
    path: &str,
    mode: Mode,
    issues: &mut Vec<FieldIssue>,
) -> Option<Value> {
    let wrong_type = |issues: &mut Vec<FieldIssue>| -> Option<Value> {
        issues.push(issue(
            path.to_string(),
            Problem::WrongType {
                expected: kind.to_string(),
                found: json_type(value),
            },
        ));
        None
    };

    match (kind, value) {
        (FieldKind::Any, _)
        | (FieldKind::Text, Value::String(_))
        | (FieldKind::Decimal, Value::Number(_))
        | (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),

        (FieldKind::Text, Value::Number(n)) => Some(Value::String(n.to_string())),

        (FieldKind::Integer, Value::Number(n)) => {
            if n.is_i64() || n.is_u64() {
                return Some(value.clone());
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(Value::from(f as i64)),
                _ => wrong_type(issues),
            }
        }
        (FieldKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Some(Value::from(i)),
            Err(_) => wrong_type(issues),
        },

        (FieldKind::Decimal, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) => Number::from_f64(f).map_or_else(|| wrong_type(issues), |n| Some(Value::Number(n))),
            Err(_) => wrong_type(issues),
        },

        (FieldKind::Boolean, Value::String(s)) => {
            if s.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                wrong_type(issues)
            }
        }

        (FieldKind::Date, Value::String(s)) => {
            if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
                Some(Value::String(date.format("%Y-%m-%d").to_string()))
            } else if let Ok(timestamp) = DateTime::parse_from_rfc3339(s.trim()) {
                Some(Value::String(
                    timestamp.date_naive().format("%Y-%m-%d").to_string(),
                ))
            } else {
                issues.push(issue(
                    path.to_string(),
                    Problem::Invalid {
                        reason: format!("'{s}' is not a date"),
                    },
                ));
                None
            }
        }

        (FieldKind::DateTime, Value::String(s)) => {
            if DateTime::parse_from_rfc3339(s.trim()).is_ok() {
                Some(Value::String(s.trim().to_string()))
            } else {
                issues.push(issue(
                    path.to_string(),
                    Problem::Invalid {
                        reason: format!("'{s}' is not an RFC 3339 timestamp"),
                    },
                ));
                None
            }
        }

        (FieldKind::Object(schema), Value::Object(map)) => {
            Some(Value::Object(check_object(map, schema, path, mode, issues)))
        }

        (FieldKind::List(element), Value::Array(items)) => {
            let coerced: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| coerce(*element, item, &format!("{path}[{i}]"), mode, issues))
                .collect();
            Some(Value::Array(coerced))
        }

        _ => wrong_type(issues),
    }
}

fn issue(field: String, problem: Problem) -> FieldIssue {
    FieldIssue { field, problem }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Removes `null` members from objects, recursively.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::schema::FieldSpec;
    use serde::Deserialize;
    use serde_json::json;

    const AMOUNT: Schema = Schema::nested(
        "Amount",
        &[
            FieldSpec::required("value", FieldKind::Decimal),
            FieldSpec::required("currency", FieldKind::Text),
        ],
    );

    const WIDGET: Schema = Schema {
        name: "Widget",
        endpoint: "api/v2/widgets",
        seq_field: Some("widgetSeq"),
        id_field: Some("name"),
        fields: &[
            FieldSpec::optional("widgetSeq", FieldKind::Text),
            FieldSpec::required("name", FieldKind::Text),
            FieldSpec::optional("count", FieldKind::Integer),
            FieldSpec::optional("active", FieldKind::Boolean),
            FieldSpec::optional("startDate", FieldKind::Date),
            FieldSpec::optional("price", FieldKind::Object(&AMOUNT)),
            FieldSpec::optional("tags", FieldKind::List(&FieldKind::Text)),
        ],
        expand: &[],
    };

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Amount {
        value: f64,
        currency: String,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Widget {
        widget_seq: Option<String>,
        name: String,
        count: Option<i64>,
        active: Option<bool>,
        start_date: Option<NaiveDate>,
        price: Option<Amount>,
        tags: Option<Vec<String>>,
    }

    impl Resource for Widget {
        const SCHEMA: &'static Schema = &WIDGET;

        fn seq(&self) -> Option<&str> {
            self.widget_seq.as_deref()
        }
    }

    #[test]
    fn test_encode_omits_unset_optionals() {
        let widget = Widget {
            name: "Gear".to_string(),
            ..Widget::default()
        };
        assert_eq!(encode(&widget).unwrap(), json!({"name": "Gear"}));
    }

    #[test]
    fn test_encode_rejects_blank_required_text() {
        let widget = Widget {
            name: "  ".to_string(),
            ..Widget::default()
        };
        let error = encode(&widget).unwrap_err();
        assert!(error.mentions("name"));
        assert_eq!(error.issues[0].problem, Problem::Missing);
        assert!(error.to_string().contains("name is required"));
    }

    #[test]
    fn test_encode_checks_nested_required_fields() {
        let widget = Widget {
            name: "Gear".to_string(),
            price: Some(Amount {
                value: 1.0,
                currency: String::new(),
            }),
            ..Widget::default()
        };
        let error = encode(&widget).unwrap_err();
        assert_eq!(error.fields(), vec!["price.currency"]);
    }

    #[test]
    fn test_decode_coerces_compatible_wire_types() {
        let raw = json!({
            "widgetSeq": 14355223812243623_u64,
            "name": "Gear",
            "count": "12",
            "active": "TRUE",
            "startDate": "2024-01-01T00:00:00.000-08:00",
            "price": {"value": "10.50", "currency": "USD"},
            "unknownField": "ignored"
        });
        let widget: Widget = decode(&raw).unwrap();
        assert_eq!(widget.widget_seq.as_deref(), Some("14355223812243623"));
        assert_eq!(widget.count, Some(12));
        assert_eq!(widget.active, Some(true));
        assert_eq!(widget.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(widget.price.unwrap().value, 10.5);
    }

    #[test]
    fn test_decode_reports_every_bad_field() {
        let raw = json!({"count": "twelve", "startDate": "soon", "tags": ["a", 1, true]});
        let error = decode::<Widget>(&raw).unwrap_err();
        assert!(error.mentions("name"));
        assert!(error.mentions("count"));
        assert!(error.mentions("startDate"));
        assert!(error.mentions("tags[2]"));
        assert!(!error.mentions("tags[1]"));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let error = decode::<Widget>(&json!(["a"])).unwrap_err();
        assert_eq!(error.fields(), vec![RECORD_FIELD]);
    }

    #[test]
    fn test_decode_page_reports_failing_position() {
        let records = vec![
            json!({"widgetSeq": "1", "name": "A"}),
            json!({"widgetSeq": "2", "name": "B"}),
            json!({"widgetSeq": "3"}),
        ];
        let error = decode_page::<Widget>(&records).unwrap_err();
        assert_eq!(
            error.record,
            Some(RecordRef {
                index: 2,
                seq: Some("3".to_string())
            })
        );
        assert!(error.to_string().contains("record 2 (3)"));
    }

    #[test]
    fn test_decode_of_encoded_entity_is_identity() {
        let widget = Widget {
            widget_seq: Some("99".to_string()),
            name: "Gear".to_string(),
            count: Some(3),
            active: Some(false),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            price: Some(Amount {
                value: 99.95,
                currency: "EUR".to_string(),
            }),
            tags: Some(vec!["x".to_string(), "y".to_string()]),
        };
        let encoded = encode(&widget).unwrap();
        let decoded: Widget = decode(&encoded).unwrap();
        assert_eq!(decoded, widget);
    }
}
