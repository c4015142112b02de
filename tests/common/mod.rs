//! Common helpers for integration tests.
#![allow(dead_code)]

use std::{cmp::Ordering, sync::Arc};

use arrow::datatypes::{ArrowPrimitiveType, UInt32Type};
use coldb::{
    Column, ColumnData, ColumnFlags, NullableVector, RowMap, ScalarValueRef, StorageLayout,
    StringPool, TableContext,
};

/// Context with a single identity row map over `rows` rows.
pub fn context(pool: StringPool, rows: u32) -> Arc<TableContext> {
    TableContext::new(Arc::new(pool), vec![RowMap::all(rows)])
}

/// Flags matching a storage layout.
pub fn flags_for(layout: StorageLayout) -> ColumnFlags {
    match layout {
        StorageLayout::NonNull => ColumnFlags::NON_NULL,
        StorageLayout::Sparse => ColumnFlags::NONE,
        StorageLayout::Dense => ColumnFlags::DENSE,
    }
}

/// Numeric column over `values` in its own single-row-map table.
pub fn primitive<T>(values: Vec<Option<T::Native>>, layout: StorageLayout) -> Column
where
    T: ArrowPrimitiveType,
    NullableVector<T>: Into<ColumnData>,
{
    let ctx = context(StringPool::new(), values.len() as u32);
    let storage = NullableVector::<T>::from_options(values, layout).expect("storage");
    Column::new("v", storage.into(), flags_for(layout), &ctx, 0, 0)
}

/// String column. With `NonNull`, absent strings are stored as null handles;
/// with `Sparse`, as accessor nulls.
pub fn strings(values: &[Option<&str>], layout: StorageLayout) -> Column {
    let mut pool = StringPool::new();
    let ids: Vec<Option<u32>> = values
        .iter()
        .map(|value| match layout {
            StorageLayout::NonNull => Some(pool.intern_opt(*value).raw()),
            _ => value.map(|value| pool.intern(value).raw()),
        })
        .collect();
    let ctx = context(pool, values.len() as u32);
    let storage = NullableVector::<UInt32Type>::from_options(ids, layout).expect("storage");
    Column::new(
        "s",
        ColumnData::String(Arc::new(storage)),
        flags_for(layout),
        &ctx,
        0,
        0,
    )
}

/// Runs a filter over every position of the column.
pub fn filter_all(column: &Column, op: coldb::FilterOp, value: ScalarValueRef<'_>) -> Vec<u32> {
    let mut rm = RowMap::all(column.row_map().size());
    column.filter_into(op, value, &mut rm);
    rm.to_vec()
}

/// Reference ordering used by sort assertions: null first, then values.
pub fn model_cmp(lhs: ScalarValueRef<'_>, rhs: ScalarValueRef<'_>) -> Ordering {
    match (lhs.is_null(), rhs.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => lhs.compare(rhs).expect("comparable, NaN-free values"),
    }
}
