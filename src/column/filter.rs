//! Row filtering.
//!
//! `filter_into` first tries the index-free fast paths (identity lookups and
//! binary search over sorted columns) and falls back to a scan that tests
//! every position of the target set. Both paths produce the same set.

use std::{cmp::Ordering, ops::Range};

use arrow::datatypes::{ArrowPrimitiveType, UInt32Type};
use log::Level;

use super::{Column, ColumnData, ColumnType};
use crate::{
    compare::{self, NumericCompare},
    logging::coldb_log,
    query::{FilterOp, ScalarValueRef},
    row_map::RowMap,
    storage::NullableVector,
};

type Probe<'a> = Box<dyn Fn(u32) -> Option<Ordering> + 'a>;

impl Column {
    /// Narrows `rm`, a set of positions into this column's row map, to the
    /// positions whose value satisfies `op` against `value`.
    ///
    /// Positions not already in `rm` are never added and the relative order of
    /// the survivors is kept. A scalar whose kind cannot be compared with the
    /// column empties `rm`.
    ///
    /// # Panics
    ///
    /// Panics on dummy columns and when `IsNull`/`IsNotNull` is given a
    /// non-null scalar.
    pub fn filter_into(&self, op: FilterOp, value: ScalarValueRef<'_>, rm: &mut RowMap) {
        self.check_filter_args(op, value);
        let rows_in = rm.size();
        let path = if self.filter_fast(op, value, rm) {
            "fast"
        } else {
            self.filter_into_slow(op, value, rm);
            "scan"
        };
        coldb_log!(
            Level::Trace,
            "column_filter",
            "column={} type={} op={} value={} path={} rows_in={} rows_out={}",
            self.name,
            self.column_type(),
            op,
            value,
            path,
            rows_in,
            rm.size()
        );
    }

    fn check_filter_args(&self, op: FilterOp, value: ScalarValueRef<'_>) {
        assert!(
            self.column_type() != ColumnType::Dummy,
            "column '{}': dummy columns cannot be filtered",
            self.name
        );
        assert!(
            !op.is_null_check() || value.is_null(),
            "column '{}': {op} takes a null scalar, got {}",
            self.name,
            value.kind_name()
        );
    }

    /// Scan that tests every position of `rm`.
    pub(crate) fn filter_into_slow(
        &self,
        op: FilterOp,
        value: ScalarValueRef<'_>,
        rm: &mut RowMap,
    ) {
        match &self.data {
            ColumnData::Int32(nv) => self.filter_numeric(nv, op, value, rm),
            ColumnData::UInt32(nv) => self.filter_numeric(nv, op, value, rm),
            ColumnData::Int64(nv) => self.filter_numeric(nv, op, value, rm),
            ColumnData::Double(nv) => self.filter_numeric(nv, op, value, rm),
            ColumnData::String(ids) => self.filter_string(ids, op, value, rm),
            ColumnData::Id => self.filter_id(op, value, rm),
            ColumnData::Dummy => panic!("column '{}': dummy columns cannot be filtered", self.name),
        }
    }

    fn filter_numeric<T>(
        &self,
        nv: &NullableVector<T>,
        op: FilterOp,
        value: ScalarValueRef<'_>,
        rm: &mut RowMap,
    ) where
        T: ArrowPrimitiveType,
        T::Native: NumericCompare,
    {
        let Some(cmp_op) = op.comparison() else {
            if !self.is_nullable() {
                if op == FilterOp::IsNull {
                    rm.clear();
                }
                return;
            }
            let want_null = op == FilterOp::IsNull;
            self.row_map()
                .filter_into(rm, |row| nv.get(row).is_none() == want_null);
            return;
        };

        match value {
            ScalarValueRef::Int64(scalar) => {
                self.filter_values(nv, rm, |v| cmp_op.test_ordering(v.cmp_long(scalar)))
            }
            ScalarValueRef::Float64(scalar) => {
                self.filter_values(nv, rm, |v| cmp_op.test_ordering(v.cmp_double(scalar)))
            }
            ScalarValueRef::Null | ScalarValueRef::Utf8(_) => rm.clear(),
        }
    }

    fn filter_values<T, P>(&self, nv: &NullableVector<T>, rm: &mut RowMap, mut predicate: P)
    where
        T: ArrowPrimitiveType,
        P: FnMut(T::Native) -> bool,
    {
        let row_map = self.row_map();
        if self.is_nullable() {
            row_map.filter_into(rm, |row| nv.get(row).map_or(false, &mut predicate));
        } else {
            row_map.filter_into(rm, |row| predicate(nv.get_non_null(row)));
        }
    }

    fn filter_string(
        &self,
        ids: &NullableVector<UInt32Type>,
        op: FilterOp,
        value: ScalarValueRef<'_>,
        rm: &mut RowMap,
    ) {
        let row_map = self.row_map();
        let Some(cmp_op) = op.comparison() else {
            let want_null = op == FilterOp::IsNull;
            row_map.filter_into(rm, |row| self.string_at(ids, row).is_none() == want_null);
            return;
        };
        let Some(needle) = value.as_utf8() else {
            rm.clear();
            return;
        };
        row_map.filter_into(rm, |row| {
            self.string_at(ids, row)
                .map_or(false, |s| cmp_op.test_ordering(compare::string(s, needle)))
        });
    }

    fn filter_id(&self, op: FilterOp, value: ScalarValueRef<'_>, rm: &mut RowMap) {
        let Some(cmp_op) = op.comparison() else {
            if op == FilterOp::IsNull {
                rm.clear();
            }
            return;
        };
        let Some(scalar) = value.as_i64() else {
            rm.clear();
            return;
        };
        self.row_map().filter_into(rm, |row| {
            cmp_op.test_ordering(compare::numeric(i64::from(row), scalar))
        });
    }

    /// Returns true when `rm` was filtered without a scan.
    fn filter_fast(&self, op: FilterOp, value: ScalarValueRef<'_>, rm: &mut RowMap) -> bool {
        if self.column_type() == ColumnType::Id && op == FilterOp::Equal {
            let row_map = self.row_map();
            if let (Some(scalar), RowMap::Range(_) | RowMap::BitVector(_)) =
                (value.as_i64(), row_map)
            {
                match u32::try_from(scalar)
                    .ok()
                    .and_then(|row| row_map.index_of(row))
                {
                    Some(pos) => rm.intersect_range(pos..pos + 1),
                    None => rm.clear(),
                }
                return true;
            }
        }

        if !self.is_sorted() {
            return false;
        }
        match self.sorted_bounds(op, value) {
            Some(bounds) => {
                rm.intersect_range(bounds);
                true
            }
            None => false,
        }
    }

    /// Positions matching `op` on a sorted column, found by binary search.
    /// Nulls sit before every value.
    fn sorted_bounds<'a>(&'a self, op: FilterOp, value: ScalarValueRef<'a>) -> Option<Range<u32>> {
        if matches!(
            op,
            FilterOp::NotEqual | FilterOp::IsNull | FilterOp::IsNotNull
        ) {
            return None;
        }
        let row_map = self.row_map();
        let probe: Probe<'a> = match (&self.data, value) {
            (ColumnData::Int32(nv), _) => numeric_probe(nv, row_map, value)?,
            (ColumnData::UInt32(nv), _) => numeric_probe(nv, row_map, value)?,
            (ColumnData::Int64(nv), _) => numeric_probe(nv, row_map, value)?,
            (ColumnData::Double(nv), _) => numeric_probe(nv, row_map, value)?,
            (ColumnData::String(ids), ScalarValueRef::Utf8(needle)) => Box::new(move |pos| {
                self.string_at(ids, row_map.get(pos))
                    .map(|s| compare::string(s, needle))
            }),
            (ColumnData::Id, ScalarValueRef::Int64(scalar)) => Box::new(move |pos| {
                Some(compare::numeric(i64::from(row_map.get(pos)), scalar))
            }),
            _ => return None,
        };

        let len = row_map.size();
        let null_end = partition_point(len, |pos| probe(pos).is_none());
        let lower = partition_point(len, |pos| {
            matches!(probe(pos), None | Some(Ordering::Less))
        });
        let upper = partition_point(len, |pos| probe(pos) != Some(Ordering::Greater));

        Some(match op {
            FilterOp::Equal => lower..upper,
            FilterOp::LessThan => null_end..lower,
            FilterOp::LessOrEqual => null_end..upper,
            FilterOp::GreaterThan => upper..len,
            FilterOp::GreaterOrEqual => lower..len,
            FilterOp::NotEqual | FilterOp::IsNull | FilterOp::IsNotNull => return None,
        })
    }
}

fn numeric_probe<'a, T>(
    nv: &'a NullableVector<T>,
    row_map: &'a RowMap,
    value: ScalarValueRef<'_>,
) -> Option<Probe<'a>>
where
    T: ArrowPrimitiveType,
    T::Native: NumericCompare,
{
    match value {
        ScalarValueRef::Int64(scalar) => Some(Box::new(move |pos| {
            nv.get(row_map.get(pos)).map(|v| v.cmp_long(scalar))
        })),
        ScalarValueRef::Float64(scalar) if !scalar.is_nan() => Some(Box::new(move |pos| {
            nv.get(row_map.get(pos)).map(|v| v.cmp_double(scalar))
        })),
        _ => None,
    }
}

/// First position in `0..len` for which `pred` is false; `pred` must be true
/// on a prefix and false after it.
fn partition_point(len: u32, mut pred: impl FnMut(u32) -> bool) -> u32 {
    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}
