#![deny(missing_docs)]
//! In-memory columnar tables with a typed filter and sort engine.
//!
//! A [`Table`] owns typed [`Column`]s that read their rows through shared
//! [`RowMap`]s. Values live in Arrow-backed [`NullableVector`]s; strings are
//! interned in a [`StringPool`]. Filtering narrows a row map in place with
//! [`Column::filter_into`], and sorting reorders row positions with
//! [`Column::stable_sort`]. Neither touches storage.
//!
//! Tables are built from Arrow `RecordBatch` values:
//!
//! ```
//! use std::sync::Arc;
//!
//! use arrow::{
//!     array::{Int64Array, StringArray},
//!     datatypes::{DataType, Field, Schema},
//!     record_batch::RecordBatch,
//! };
//! use coldb::{Constraint, FilterOp, Order, ScalarValue, Table, TableOptions};
//!
//! let schema = Schema::new(vec![
//!     Field::new("dur", DataType::Int64, true),
//!     Field::new("name", DataType::Utf8, false),
//! ]);
//! let batch = RecordBatch::try_new(
//!     Arc::new(schema),
//!     vec![
//!         Arc::new(Int64Array::from(vec![Some(30), None, Some(10)])),
//!         Arc::new(StringArray::from(vec!["a", "b", "c"])),
//!     ],
//! )
//! .unwrap();
//!
//! let table = Table::from_record_batch("slice", &batch, TableOptions::default()).unwrap();
//! let long = table
//!     .filter(&[Constraint::new("dur", FilterOp::GreaterThan, 5i64)])
//!     .unwrap()
//!     .sort(&[Order::asc("dur")])
//!     .unwrap();
//! assert_eq!(long.row_count(), 2);
//! assert_eq!(long.get(0, "name").unwrap(), ScalarValue::from("c"));
//! ```

mod logging;

pub mod compare;
mod column;
mod error;
mod option;
mod query;
mod row_map;
mod storage;
mod string_pool;
mod table;

pub use crate::{
    column::{Column, ColumnData, ColumnFlags, ColumnType},
    error::{StorageError, TableError},
    option::TableOptions,
    query::{ComparisonOp, Constraint, FilterOp, Order, ScalarValue, ScalarValueRef},
    row_map::{RowId, RowIdIter, RowMap},
    storage::{NullableVector, StorageLayout},
    string_pool::{StringId, StringPool},
    table::{Table, TableBuilder, TableContext},
};
