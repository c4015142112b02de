//! Typed columns and their construction invariants.
//!
//! A [`Column`] pairs a storage variant ([`ColumnData`]) with flags, a name
//! and a row map slot in its table's [`TableContext`]. It never owns row
//! positions: every read goes through the row map first, then through the
//! storage accessor (and, for strings, the table's string pool).
//!
//! The filter and sort engines live in the `filter` and `sort` submodules.

mod filter;
mod flags;
mod sort;

use std::{fmt, sync::Arc};

use arrow::datatypes::{Float64Type, Int32Type, Int64Type, UInt32Type};

pub use flags::ColumnFlags;

use crate::{
    query::ScalarValueRef,
    row_map::{RowId, RowMap},
    storage::NullableVector,
    string_pool::{StringId, StringPool},
    table::TableContext,
};

/// Row map slot used by columns that have no rows to read.
const DUMMY_ROW_MAP_IDX: u32 = u32::MAX;

/// Storage type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 32-bit signed integers.
    Int32,
    /// 32-bit unsigned integers.
    UInt32,
    /// 64-bit signed integers.
    Int64,
    /// Doubles.
    Double,
    /// Interned strings.
    String,
    /// Synthetic column whose value is the storage row itself.
    Id,
    /// Placeholder column supporting no operations.
    Dummy,
}

impl ColumnType {
    /// Lower-case type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int32 => "int32",
            ColumnType::UInt32 => "uint32",
            ColumnType::Int64 => "int64",
            ColumnType::Double => "double",
            ColumnType::String => "string",
            ColumnType::Id => "id",
            ColumnType::Dummy => "dummy",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage of a column, one variant per [`ColumnType`].
///
/// String columns store [`StringId`] handles as raw `u32`s.
#[derive(Clone, Debug)]
pub enum ColumnData {
    /// 32-bit signed integers.
    Int32(Arc<NullableVector<Int32Type>>),
    /// 32-bit unsigned integers.
    UInt32(Arc<NullableVector<UInt32Type>>),
    /// 64-bit signed integers.
    Int64(Arc<NullableVector<Int64Type>>),
    /// Doubles.
    Double(Arc<NullableVector<Float64Type>>),
    /// String pool handles.
    String(Arc<NullableVector<UInt32Type>>),
    /// No storage; the value is the row itself.
    Id,
    /// No storage.
    Dummy,
}

impl ColumnData {
    /// Storage type of this variant.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Int32(_) => ColumnType::Int32,
            ColumnData::UInt32(_) => ColumnType::UInt32,
            ColumnData::Int64(_) => ColumnType::Int64,
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::String(_) => ColumnType::String,
            ColumnData::Id => ColumnType::Id,
            ColumnData::Dummy => ColumnType::Dummy,
        }
    }

    /// `(is_nullable, is_dense)` of the storage accessor, if there is one.
    #[must_use]
    pub fn storage_shape(&self) -> Option<(bool, bool)> {
        match self {
            ColumnData::Int32(nv) => Some((nv.is_nullable(), nv.is_dense())),
            ColumnData::UInt32(nv) => Some((nv.is_nullable(), nv.is_dense())),
            ColumnData::Int64(nv) => Some((nv.is_nullable(), nv.is_dense())),
            ColumnData::Double(nv) => Some((nv.is_nullable(), nv.is_dense())),
            ColumnData::String(nv) => Some((nv.is_nullable(), nv.is_dense())),
            ColumnData::Id | ColumnData::Dummy => None,
        }
    }

    /// Number of storage rows, if there is storage.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            ColumnData::Int32(nv) => Some(nv.len()),
            ColumnData::UInt32(nv) => Some(nv.len()),
            ColumnData::Int64(nv) => Some(nv.len()),
            ColumnData::Double(nv) => Some(nv.len()),
            ColumnData::String(nv) => Some(nv.len()),
            ColumnData::Id | ColumnData::Dummy => None,
        }
    }
}

impl From<NullableVector<Int32Type>> for ColumnData {
    fn from(value: NullableVector<Int32Type>) -> Self {
        ColumnData::Int32(Arc::new(value))
    }
}

impl From<NullableVector<UInt32Type>> for ColumnData {
    fn from(value: NullableVector<UInt32Type>) -> Self {
        ColumnData::UInt32(Arc::new(value))
    }
}

impl From<NullableVector<Int64Type>> for ColumnData {
    fn from(value: NullableVector<Int64Type>) -> Self {
        ColumnData::Int64(Arc::new(value))
    }
}

impl From<NullableVector<Float64Type>> for ColumnData {
    fn from(value: NullableVector<Float64Type>) -> Self {
        ColumnData::Double(Arc::new(value))
    }
}

/// One typed attribute of a table.
#[derive(Clone)]
pub struct Column {
    name: Arc<str>,
    data: ColumnData,
    flags: ColumnFlags,
    table: Arc<TableContext>,
    col_idx_in_table: u32,
    row_map_idx: u32,
}

impl Column {
    /// Binds storage to a table's row map slot.
    ///
    /// # Panics
    ///
    /// Panics when the flags are illegal for the storage type, when the
    /// storage accessor's nullability or density disagrees with the flags, or
    /// when a non-dummy column names a row map slot the table does not have.
    pub fn new(
        name: impl Into<Arc<str>>,
        data: ColumnData,
        flags: ColumnFlags,
        table: &Arc<TableContext>,
        col_idx_in_table: u32,
        row_map_idx: u32,
    ) -> Self {
        let column = Self {
            name: name.into(),
            data,
            flags,
            table: Arc::clone(table),
            col_idx_in_table,
            row_map_idx,
        };
        column.check_invariants();
        column
    }

    /// Copies `column` into another table, reusing its storage.
    ///
    /// The copy keeps the type and storage, takes `name` when given, and drops
    /// [`ColumnFlags::NO_CROSS_TABLE_INHERIT`].
    pub fn rebind(
        column: &Column,
        table: &Arc<TableContext>,
        col_idx_in_table: u32,
        row_map_idx: u32,
        name: Option<&str>,
    ) -> Self {
        let row_map_idx = if column.column_type() == ColumnType::Dummy {
            DUMMY_ROW_MAP_IDX
        } else {
            row_map_idx
        };
        Self::new(
            name.map_or_else(|| Arc::clone(&column.name), Arc::from),
            column.data.clone(),
            column.flags - ColumnFlags::NO_CROSS_TABLE_INHERIT,
            table,
            col_idx_in_table,
            row_map_idx,
        )
    }

    /// Placeholder column with no storage and no row map.
    pub fn dummy(
        name: impl Into<Arc<str>>,
        table: &Arc<TableContext>,
        col_idx_in_table: u32,
    ) -> Self {
        Self::new(
            name,
            ColumnData::Dummy,
            ColumnFlags::NONE,
            table,
            col_idx_in_table,
            DUMMY_ROW_MAP_IDX,
        )
    }

    /// Identity column named `id` whose value is the storage row.
    pub fn id(table: &Arc<TableContext>, col_idx_in_table: u32, row_map_idx: u32) -> Self {
        Self::new(
            "id",
            ColumnData::Id,
            ColumnFlags::ID_FLAGS,
            table,
            col_idx_in_table,
            row_map_idx,
        )
    }

    fn check_invariants(&self) {
        let ty = self.column_type();
        assert!(
            self.flags.is_valid_for(ty),
            "column '{}': flags {:?} are not valid for type {ty}",
            self.name,
            self.flags
        );
        if let Some((nullable, dense)) = self.data.storage_shape() {
            assert_eq!(
                nullable,
                self.is_nullable(),
                "column '{}': storage nullability does not match flags {:?}",
                self.name,
                self.flags
            );
            assert_eq!(
                dense,
                self.is_dense(),
                "column '{}': storage density does not match flags {:?}",
                self.name,
                self.flags
            );
        }
        if ty != ColumnType::Dummy {
            assert!(
                (self.row_map_idx as usize) < self.table.row_maps().len(),
                "column '{}': row map slot {} does not exist",
                self.name,
                self.row_map_idx
            );
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage type.
    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Storage variant.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Flags.
    pub fn flags(&self) -> ColumnFlags {
        self.flags
    }

    /// Index of the column within its table.
    pub fn index_in_table(&self) -> u32 {
        self.col_idx_in_table
    }

    /// Row map slot the column reads through.
    pub fn row_map_idx(&self) -> u32 {
        self.row_map_idx
    }

    /// Returns true unless the column is flagged non-null.
    pub fn is_nullable(&self) -> bool {
        !self.flags.contains(ColumnFlags::NON_NULL)
    }

    /// Returns true when the storage keeps a slot for null rows.
    pub fn is_dense(&self) -> bool {
        self.flags.contains(ColumnFlags::DENSE)
    }

    /// Returns true when values are non-decreasing in row order.
    pub fn is_sorted(&self) -> bool {
        self.flags.contains(ColumnFlags::SORTED)
    }

    /// Returns true when the column is hidden.
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ColumnFlags::HIDDEN)
    }

    /// Table state this column reads through.
    pub fn table_context(&self) -> &Arc<TableContext> {
        &self.table
    }

    /// The row map this column reads through.
    ///
    /// # Panics
    ///
    /// Panics on dummy columns.
    pub fn row_map(&self) -> &RowMap {
        assert!(
            self.column_type() != ColumnType::Dummy,
            "column '{}': dummy columns have no row map",
            self.name
        );
        self.table.row_map(self.row_map_idx)
    }

    /// Value at table position `pos`.
    ///
    /// # Panics
    ///
    /// Panics on dummy columns or when `pos` is out of bounds.
    pub fn get(&self, pos: u32) -> ScalarValueRef<'_> {
        let row = self.row_map().get(pos);
        match &self.data {
            ColumnData::Int32(nv) => nv
                .get(row)
                .map_or(ScalarValueRef::Null, |v| ScalarValueRef::Int64(i64::from(v))),
            ColumnData::UInt32(nv) => nv
                .get(row)
                .map_or(ScalarValueRef::Null, |v| ScalarValueRef::Int64(i64::from(v))),
            ColumnData::Int64(nv) => nv
                .get(row)
                .map_or(ScalarValueRef::Null, ScalarValueRef::Int64),
            ColumnData::Double(nv) => nv
                .get(row)
                .map_or(ScalarValueRef::Null, ScalarValueRef::Float64),
            ColumnData::String(ids) => self
                .string_at(ids, row)
                .map_or(ScalarValueRef::Null, ScalarValueRef::Utf8),
            ColumnData::Id => ScalarValueRef::Int64(i64::from(row)),
            ColumnData::Dummy => unreachable!("row_map() rejects dummy columns"),
        }
    }

    pub(crate) fn set_sorted(&mut self, sorted: bool) {
        self.flags.set(ColumnFlags::SORTED, sorted);
        self.check_invariants();
    }

    /// Returns true when a Double column stores a NaN anywhere in its storage.
    pub(crate) fn contains_nan(&self) -> bool {
        match &self.data {
            ColumnData::Double(nv) => nv.iter().any(|v| v.is_some_and(f64::is_nan)),
            _ => false,
        }
    }

    pub(crate) fn string_pool(&self) -> &StringPool {
        self.table.string_pool()
    }

    /// String stored at storage row `row`; `None` for accessor nulls and
    /// null handles alike.
    #[inline]
    pub(crate) fn string_at<'a>(
        &'a self,
        ids: &NullableVector<UInt32Type>,
        row: RowId,
    ) -> Option<&'a str> {
        ids.get(row)
            .and_then(|raw| self.string_pool().get(StringId::from_raw(raw)))
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("type", &self.column_type())
            .field("flags", &self.flags)
            .field("col_idx_in_table", &self.col_idx_in_table)
            .field("row_map_idx", &self.row_map_idx)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use arrow::datatypes::Int64Type;

    use super::{test_support::*, *};
    use crate::storage::StorageLayout;

    #[test]
    fn get_reads_through_row_map() {
        let ctx = TableContext::new(
            Arc::new(StringPool::new()),
            vec![RowMap::IndexVector(vec![2, 0])],
        );
        let nv = NullableVector::<Int64Type>::non_null(vec![10, 20, 30]);
        let column = Column::new("v", nv.into(), ColumnFlags::NON_NULL, &ctx, 0, 0);
        assert_eq!(column.get(0), ScalarValueRef::Int64(30));
        assert_eq!(column.get(1), ScalarValueRef::Int64(10));

        let id = Column::id(&ctx, 1, 0);
        assert_eq!(id.get(0), ScalarValueRef::Int64(2));
        assert_eq!(id.name(), "id");
        assert_eq!(id.flags(), ColumnFlags::ID_FLAGS);
    }

    #[test]
    fn get_maps_nulls_and_strings() {
        let column = int32(&[Some(1), None], StorageLayout::Dense);
        assert_eq!(column.get(1), ScalarValueRef::Null);
        assert!(column.is_dense());
        assert!(column.is_nullable());

        let strings = string(&[Some("a"), None, Some("")]);
        assert_eq!(strings.get(0), ScalarValueRef::Utf8("a"));
        assert_eq!(strings.get(1), ScalarValueRef::Null);
        assert_eq!(strings.get(2), ScalarValueRef::Utf8(""));
    }

    #[test]
    fn rebind_strips_non_inheritable_flags() {
        let ctx = context(StringPool::new(), 3);
        let nv = NullableVector::<UInt32Type>::non_null(vec![0, 0, 2]);
        let flags = ColumnFlags::SET_ID | ColumnFlags::SORTED | ColumnFlags::NON_NULL;
        let column = Column::new("parent", nv.into(), flags, &ctx, 0, 0);

        let other = TableContext::new(Arc::clone(ctx.string_pool()), vec![RowMap::all(1); 2]);
        let copy = Column::rebind(&column, &other, 4, 1, Some("renamed"));
        assert_eq!(copy.name(), "renamed");
        assert_eq!(copy.flags(), ColumnFlags::SORTED | ColumnFlags::NON_NULL);
        assert_eq!(copy.index_in_table(), 4);
        assert_eq!(copy.row_map_idx(), 1);
        assert_eq!(copy.column_type(), ColumnType::UInt32);

        let same_name = Column::rebind(&column, &other, 0, 0, None);
        assert_eq!(same_name.name(), "parent");
    }

    #[test]
    fn dummy_column_has_no_row_map() {
        let ctx = context(StringPool::new(), 0);
        let dummy = Column::dummy("placeholder", &ctx, 3);
        assert_eq!(dummy.column_type(), ColumnType::Dummy);
        assert_eq!(dummy.row_map_idx(), DUMMY_ROW_MAP_IDX);
        let copy = Column::rebind(&dummy, &ctx, 0, 0, None);
        assert_eq!(copy.row_map_idx(), DUMMY_ROW_MAP_IDX);
    }

    #[test]
    #[should_panic(expected = "storage nullability does not match")]
    fn nullable_storage_with_non_null_flag_panics() {
        let ctx = context(StringPool::new(), 1);
        let nv = NullableVector::<Int64Type>::from_options([Some(1)], StorageLayout::Sparse)
            .unwrap();
        Column::new("v", nv.into(), ColumnFlags::NON_NULL, &ctx, 0, 0);
    }

    #[test]
    #[should_panic(expected = "storage density does not match")]
    fn dense_storage_without_dense_flag_panics() {
        let ctx = context(StringPool::new(), 1);
        let nv =
            NullableVector::<Int64Type>::from_options([Some(1)], StorageLayout::Dense).unwrap();
        Column::new("v", nv.into(), ColumnFlags::NONE, &ctx, 0, 0);
    }

    #[test]
    #[should_panic(expected = "are not valid for type")]
    fn set_id_on_signed_column_panics() {
        let ctx = context(StringPool::new(), 1);
        let nv = NullableVector::<Int64Type>::non_null(vec![0]);
        let flags = ColumnFlags::SET_ID | ColumnFlags::SORTED | ColumnFlags::NON_NULL;
        Column::new("v", nv.into(), flags, &ctx, 0, 0);
    }

    #[test]
    #[should_panic(expected = "row map slot 3 does not exist")]
    fn missing_row_map_slot_panics() {
        let ctx = context(StringPool::new(), 1);
        let nv = NullableVector::<Int64Type>::non_null(vec![0]);
        Column::new("v", nv.into(), ColumnFlags::NON_NULL, &ctx, 0, 3);
    }

    #[test]
    #[should_panic(expected = "dummy columns have no row map")]
    fn dummy_get_panics() {
        let ctx = context(StringPool::new(), 1);
        Column::dummy("d", &ctx, 0).get(0);
    }
}
