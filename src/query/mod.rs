//! Operators, scalars and table-level constraint/order descriptors.
//!
//! The column engine only ever sees a [`FilterOp`] plus a [`ScalarValueRef`];
//! [`Constraint`] and [`Order`] bind those to a column name for table-level
//! filtering and sorting.

mod value;

use std::{cmp::Ordering, fmt};

pub use value::{ScalarValue, ScalarValueRef};

/// Filter operator applied by [`crate::Column::filter_into`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// Less than (`<`).
    LessThan,
    /// Equals (`=`).
    Equal,
    /// Greater than (`>`).
    GreaterThan,
    /// Not equals (`!=`).
    NotEqual,
    /// Less than or equal to (`<=`).
    LessOrEqual,
    /// Greater than or equal to (`>=`).
    GreaterOrEqual,
    /// `IS NULL`; the scalar must be `Null`.
    IsNull,
    /// `IS NOT NULL`; the scalar must be `Null`.
    IsNotNull,
}

impl FilterOp {
    /// All operators, in declaration order.
    pub const ALL: [FilterOp; 8] = [
        FilterOp::LessThan,
        FilterOp::Equal,
        FilterOp::GreaterThan,
        FilterOp::NotEqual,
        FilterOp::LessOrEqual,
        FilterOp::GreaterOrEqual,
        FilterOp::IsNull,
        FilterOp::IsNotNull,
    ];

    /// Returns a textual representation of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::LessThan => "<",
            FilterOp::Equal => "=",
            FilterOp::GreaterThan => ">",
            FilterOp::NotEqual => "!=",
            FilterOp::LessOrEqual => "<=",
            FilterOp::GreaterOrEqual => ">=",
            FilterOp::IsNull => "IS NULL",
            FilterOp::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns the ordering operator this filter applies, or `None` for the
    /// null checks.
    #[must_use]
    pub fn comparison(self) -> Option<ComparisonOp> {
        match self {
            FilterOp::LessThan => Some(ComparisonOp::LessThan),
            FilterOp::Equal => Some(ComparisonOp::Equal),
            FilterOp::GreaterThan => Some(ComparisonOp::GreaterThan),
            FilterOp::NotEqual => Some(ComparisonOp::NotEqual),
            FilterOp::LessOrEqual => Some(ComparisonOp::LessThanOrEqual),
            FilterOp::GreaterOrEqual => Some(ComparisonOp::GreaterThanOrEqual),
            FilterOp::IsNull | FilterOp::IsNotNull => None,
        }
    }

    /// Returns true for `IsNull` and `IsNotNull`.
    #[must_use]
    pub fn is_null_check(self) -> bool {
        self.comparison().is_none()
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering operator: the subset of [`FilterOp`] that compares values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equals (`=`).
    Equal,
    /// Not equals (`!=`).
    NotEqual,
    /// Less than (`<`).
    LessThan,
    /// Less than or equal to (`<=`).
    LessThanOrEqual,
    /// Greater than (`>`).
    GreaterThan,
    /// Greater than or equal to (`>=`).
    GreaterThanOrEqual,
}

impl ComparisonOp {
    /// Evaluates the operator against the ordering of `value` relative to the
    /// filter scalar.
    #[must_use]
    #[inline]
    pub fn test_ordering(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

/// A single filter applied to a named column of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    /// Column name.
    pub column: String,
    /// Operator.
    pub op: FilterOp,
    /// Right-hand side; `Null` for the null checks.
    pub value: ScalarValue,
}

impl Constraint {
    /// Creates a constraint from its parts.
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<ScalarValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// `column IS NULL`.
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::IsNull, ScalarValue::Null)
    }

    /// `column IS NOT NULL`.
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::IsNotNull, ScalarValue::Null)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.is_null_check() {
            write!(f, "{} {}", self.column, self.op)
        } else {
            write!(f, "{} {} {}", self.column, self.op, self.value)
        }
    }
}

/// Sort key for table-level ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Column name.
    pub column: String,
    /// True for descending order.
    pub descending: bool,
}

impl Order {
    /// Ascending order on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending order on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}
