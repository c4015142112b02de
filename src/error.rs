use arrow::datatypes::DataType;
use thiserror::Error;

/// Errors raised while building column storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// A sparse vector's packed values disagree with its validity bitmap.
    #[error("sparse storage holds {values} values but its validity marks {present} rows present")]
    LengthMismatch {
        /// Number of packed values supplied.
        values: usize,
        /// Number of rows marked present.
        present: usize,
    },
    /// Nulls were supplied for a non-null layout.
    #[error("non-null storage received {0} null rows")]
    UnexpectedNulls(usize),
}

/// Errors raised by table construction and table-level filter/sort.
#[derive(Debug, Error)]
pub enum TableError {
    /// A constraint or order references a column the table does not have.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// Two columns share a name.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
    /// A column's row count differs from the table's.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        /// Offending column.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of the column.
        actual: usize,
    },
    /// An Arrow column type has no storage counterpart.
    #[error("column '{column}' has unsupported type {data_type:?}")]
    UnsupportedType {
        /// Offending column.
        column: String,
        /// Arrow type of the column.
        data_type: DataType,
    },
    /// A column declared sorted is not non-decreasing.
    #[error("column '{0}' is declared sorted but its values are not non-decreasing")]
    NotSorted(String),
    /// Storage construction failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
