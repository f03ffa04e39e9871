//! Filter expressions for list queries.
//!
//! The API filters collections with an OData-like `$filter` parameter, e.g.
//! `payeeId eq 'P-1' and effectiveStartDate ge '2024-01-01'`. [`Filter`]
//! builds such expressions without hand-quoting values.
//!
//! # Example
//!
//! ```rust
//! use sapim::rest::Filter;
//!
//! let filter = Filter::eq("lastName", "O'Brien").and(Filter::ge("salary", 1000));
//! assert_eq!(filter.to_string(), "lastName eq 'O''Brien' and salary ge 1000");
//! ```

use std::fmt;

use chrono::NaiveDate;

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        })
    }
}

/// A literal on the right-hand side of a comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    /// Quoted text. `*` acts as a wildcard on the server.
    Text(String),
    /// Unquoted integer.
    Integer(i64),
    /// Unquoted decimal.
    Decimal(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// Quoted `YYYY-MM-DD` date.
    Date(NaiveDate),
    /// `null`.
    Null,
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// A filter expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// `field op value`.
    Compare {
        /// Wire name of the field.
        field: String,
        /// Operator.
        op: Operator,
        /// Literal.
        value: FilterValue,
    },
    /// All of the inner filters.
    And(Vec<Filter>),
    /// Any of the inner filters.
    Or(Vec<Filter>),
}

macro_rules! comparison {
    ($name:ident, $op:ident, $doc:literal) => {
        #[doc = $doc]
        #[must_use]
        pub fn $name(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
            Self::Compare {
                field: field.into(),
                op: Operator::$op,
                value: value.into(),
            }
        }
    };
}

impl Filter {
    comparison!(eq, Eq, "`field eq value`.");
    comparison!(ne, Ne, "`field ne value`.");
    comparison!(gt, Gt, "`field gt value`.");
    comparison!(ge, Ge, "`field ge value`.");
    comparison!(lt, Lt, "`field lt value`.");
    comparison!(le, Le, "`field le value`.");

    /// Combines with `other`; both must hold.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Combines with `other`; either may hold.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    fn write_group(f: &mut fmt::Formatter<'_>, parts: &[Self], joiner: &str) -> fmt::Result {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                write!(f, " {joiner} ")?;
            }
            match part {
                Self::Compare { .. } => write!(f, "{part}")?,
                Self::And(_) | Self::Or(_) => write!(f, "({part})")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { field, op, value } => write!(f, "{field} {op} {value}"),
            Self::And(parts) => Self::write_group(f, parts, "and"),
            Self::Or(parts) => Self::write_group(f, parts, "or"),
        }
    }
}
