use std::{cmp::Ordering, fmt};

use crate::compare;

/// Owned scalar supplied as the right-hand side of a filter.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    /// Represents SQL `NULL`.
    Null,
    /// Signed 64-bit integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl ScalarValue {
    /// Returns true when the literal is the `Null` variant.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Returns a borrowed view over this scalar value.
    #[must_use]
    pub fn as_ref(&self) -> ScalarValueRef<'_> {
        match self {
            ScalarValue::Null => ScalarValueRef::Null,
            ScalarValue::Int64(value) => ScalarValueRef::Int64(*value),
            ScalarValue::Float64(value) => ScalarValueRef::Float64(*value),
            ScalarValue::Utf8(value) => ScalarValueRef::Utf8(value.as_str()),
        }
    }

    /// Compares this scalar with another, returning the ordering when both sides are comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        self.as_ref().compare(other.as_ref())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int64(i64::from(value))
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::Int64(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_owned())
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}

impl<'a> From<ScalarValueRef<'a>> for ScalarValue {
    fn from(value: ScalarValueRef<'a>) -> Self {
        match value {
            ScalarValueRef::Null => ScalarValue::Null,
            ScalarValueRef::Int64(value) => ScalarValue::Int64(value),
            ScalarValueRef::Float64(value) => ScalarValue::Float64(value),
            ScalarValueRef::Utf8(value) => ScalarValue::Utf8(value.to_owned()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

/// Borrowed view over a scalar value.
///
/// This is the form the column engine consumes; string payloads are never
/// copied while filtering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarValueRef<'a> {
    /// Represents SQL `NULL`.
    Null,
    /// Signed 64-bit integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string slice.
    Utf8(&'a str),
}

impl<'a> ScalarValueRef<'a> {
    /// Returns true when the literal is the `Null` variant.
    #[must_use]
    pub fn is_null(self) -> bool {
        matches!(self, ScalarValueRef::Null)
    }

    /// Short name of the value kind, used in logs and panic messages.
    #[must_use]
    pub fn kind_name(self) -> &'static str {
        match self {
            ScalarValueRef::Null => "null",
            ScalarValueRef::Int64(_) => "int64",
            ScalarValueRef::Float64(_) => "float64",
            ScalarValueRef::Utf8(_) => "utf8",
        }
    }

    /// Extract as a signed integer.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            ScalarValueRef::Int64(value) => Some(value),
            _ => None,
        }
    }

    /// Extract as a double.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            ScalarValueRef::Float64(value) => Some(value),
            _ => None,
        }
    }

    /// Extract as a string slice.
    pub fn as_utf8(self) -> Option<&'a str> {
        match self {
            ScalarValueRef::Utf8(value) => Some(value),
            _ => None,
        }
    }

    /// Compares this scalar with another, returning the ordering when both sides are comparable.
    ///
    /// Integers and doubles compare across kinds without truncation; strings
    /// only compare with strings; `Null` compares with nothing.
    pub fn compare(self, other: ScalarValueRef<'_>) -> Option<Ordering> {
        use ScalarValueRef::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Int64(lhs), Int64(rhs)) => Some(lhs.cmp(&rhs)),
            (Float64(lhs), Float64(rhs)) => lhs.partial_cmp(&rhs),
            (Int64(lhs), Float64(rhs)) => {
                (!rhs.is_nan()).then(|| compare::long_to_double(lhs, rhs))
            }
            (Float64(lhs), Int64(rhs)) => {
                (!lhs.is_nan()).then(|| compare::double_to_long(lhs, rhs))
            }
            (Utf8(lhs), Utf8(rhs)) => Some(compare::string(lhs, rhs)),
            _ => None,
        }
    }
}

impl<'a> From<&'a ScalarValue> for ScalarValueRef<'a> {
    fn from(value: &'a ScalarValue) -> Self {
        value.as_ref()
    }
}

impl From<i64> for ScalarValueRef<'_> {
    fn from(value: i64) -> Self {
        ScalarValueRef::Int64(value)
    }
}

impl From<f64> for ScalarValueRef<'_> {
    fn from(value: f64) -> Self {
        ScalarValueRef::Float64(value)
    }
}

impl<'a> From<&'a str> for ScalarValueRef<'a> {
    fn from(value: &'a str) -> Self {
        ScalarValueRef::Utf8(value)
    }
}

impl fmt::Display for ScalarValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValueRef::Null => f.write_str("NULL"),
            ScalarValueRef::Int64(value) => write!(f, "{value}"),
            ScalarValueRef::Float64(value) => write!(f, "{value}"),
            ScalarValueRef::Utf8(value) => write!(f, "'{value}'"),
        }
    }
}
