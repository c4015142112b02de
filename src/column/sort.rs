//! Stable sorting of row positions by column value.

use std::cmp::Ordering;

use arrow::datatypes::ArrowPrimitiveType;
use log::Level;

use super::{Column, ColumnData, ColumnType};
use crate::{
    compare::{self, NumericCompare},
    logging::coldb_log,
    storage::NullableVector,
};

impl Column {
    /// Stable-sorts `out`, positions into this column's row map, by value.
    ///
    /// Nulls compare below every value, and `descending` reverses the whole
    /// comparison: nulls lead an ascending sort and trail a descending one.
    /// Ties keep their input order in both directions.
    ///
    /// # Panics
    ///
    /// Panics on dummy columns and when a position is out of bounds.
    pub fn stable_sort(&self, descending: bool, out: &mut [u32]) {
        assert!(
            self.column_type() != ColumnType::Dummy,
            "column '{}': dummy columns cannot be sorted",
            self.name
        );
        let row_map = self.row_map();
        match &self.data {
            ColumnData::Int32(nv) => self.sort_numeric(nv, descending, out),
            ColumnData::UInt32(nv) => self.sort_numeric(nv, descending, out),
            ColumnData::Int64(nv) => self.sort_numeric(nv, descending, out),
            ColumnData::Double(nv) => self.sort_numeric(nv, descending, out),
            ColumnData::String(ids) => row_map.stable_sort(out, |lhs, rhs| {
                directed(
                    descending,
                    compare::nullable_string(self.string_at(ids, lhs), self.string_at(ids, rhs)),
                )
            }),
            ColumnData::Id => {
                row_map.stable_sort(out, |lhs, rhs| {
                    directed(descending, compare::numeric(lhs, rhs))
                })
            }
            ColumnData::Dummy => panic!("column '{}': dummy columns cannot be sorted", self.name),
        }
        coldb_log!(
            Level::Trace,
            "column_sort",
            "column={} type={} descending={} rows={}",
            self.name,
            self.column_type(),
            descending,
            out.len()
        );
    }

    fn sort_numeric<T>(&self, nv: &NullableVector<T>, descending: bool, out: &mut [u32])
    where
        T: ArrowPrimitiveType,
        T::Native: NumericCompare,
    {
        let row_map = self.row_map();
        if self.is_nullable() {
            row_map.stable_sort(out, |lhs, rhs| {
                directed(descending, compare::nullable_numeric(nv.get(lhs), nv.get(rhs)))
            });
        } else {
            row_map.stable_sort(out, |lhs, rhs| {
                directed(
                    descending,
                    nv.get_non_null(lhs).cmp_total(nv.get_non_null(rhs)),
                )
            });
        }
    }
}

#[inline]
fn directed(descending: bool, ordering: Ordering) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        column::test_support::*, row_map::RowMap, storage::StorageLayout,
        string_pool::StringPool, table::TableContext,
    };

    fn sorted(column: &Column, descending: bool) -> Vec<u32> {
        let mut out: Vec<u32> = (0..column.row_map().size()).collect();
        column.stable_sort(descending, &mut out);
        out
    }

    #[test]
    fn strings_sort_absent_first() {
        let column = string(&[Some("b"), None, Some("a")]);
        assert_eq!(sorted(&column, false), vec![1, 2, 0]);
        assert_eq!(sorted(&column, true), vec![0, 2, 1]);
    }

    #[test]
    fn nullable_numbers_sort_nulls_first_ascending() {
        for layout in [StorageLayout::Sparse, StorageLayout::Dense] {
            let column = int32(&[Some(2), None, Some(-1), None, Some(2)], layout);
            assert_eq!(sorted(&column, false), vec![1, 3, 2, 0, 4]);
            assert_eq!(sorted(&column, true), vec![0, 4, 2, 1, 3]);
        }
    }

    #[test]
    fn non_null_numbers_keep_ties_stable() {
        let column = uint32(&[Some(3), Some(1), Some(3), Some(1)], StorageLayout::NonNull);
        assert_eq!(sorted(&column, false), vec![1, 3, 0, 2]);
        assert_eq!(sorted(&column, true), vec![0, 2, 1, 3]);
    }

    #[test]
    fn doubles_place_nan_after_numbers() {
        let column = double(
            &[Some(f64::NAN), Some(1.5), Some(f64::NEG_INFINITY), Some(-0.0), Some(0.0)],
            StorageLayout::NonNull,
        );
        assert_eq!(sorted(&column, false), vec![2, 3, 4, 1, 0]);
    }

    #[test]
    fn id_sorts_by_mapped_row() {
        let ctx = TableContext::new(
            Arc::new(StringPool::new()),
            vec![RowMap::IndexVector(vec![4, 0, 2])],
        );
        let column = Column::id(&ctx, 0, 0);
        assert_eq!(sorted(&column, false), vec![1, 2, 0]);
        assert_eq!(sorted(&column, true), vec![0, 2, 1]);
    }

    #[test]
    fn sorts_a_subset_of_positions() {
        let column = int64(&[Some(9), Some(8), Some(7), Some(6)], StorageLayout::NonNull);
        let mut out = vec![3, 0, 2];
        column.stable_sort(true, &mut out);
        assert_eq!(out, vec![0, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "dummy columns")]
    fn sorting_dummy_panics() {
        let ctx = context(StringPool::new(), 1);
        Column::dummy("d", &ctx, 0).stable_sort(false, &mut [0u32]);
    }
}
