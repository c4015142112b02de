use std::{cmp::Ordering, sync::Arc};

use arrow::{
    array::{ArrayRef, AsArray},
    datatypes::{DataType, Field, Float64Type, Int32Type, Int64Type, UInt32Type},
    record_batch::RecordBatch,
};
use log::Level;

use super::{Table, TableContext};
use crate::{
    column::{Column, ColumnData, ColumnFlags},
    compare,
    error::TableError,
    logging::{coldb_log, LogContext},
    option::TableOptions,
    row_map::RowMap,
    storage::{NullableVector, StorageLayout},
    string_pool::{StringId, StringPool},
};

enum PendingColumn {
    Data {
        name: String,
        data: ColumnData,
        flags: ColumnFlags,
    },
    Dummy(String),
}

impl PendingColumn {
    fn name(&self) -> &str {
        match self {
            PendingColumn::Data { name, .. } | PendingColumn::Dummy(name) => name,
        }
    }
}

/// Collects column storage and interned strings, then binds everything to a
/// single identity row map in [`TableBuilder::build`].
pub struct TableBuilder {
    name: String,
    options: TableOptions,
    pool: StringPool,
    columns: Vec<PendingColumn>,
    row_count: Option<usize>,
}

impl TableBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>, options: TableOptions) -> Self {
        Self::with_string_pool(name, options, StringPool::new())
    }

    /// Creates an empty builder that interns into an existing `pool`.
    ///
    /// The pool is fixed for the builder's lifetime: handles stored in added
    /// columns always resolve against it.
    pub fn with_string_pool(
        name: impl Into<String>,
        options: TableOptions,
        pool: StringPool,
    ) -> Self {
        Self {
            name: name.into(),
            options,
            pool,
            columns: Vec::new(),
            row_count: None,
        }
    }

    /// Pool to intern into before adding a [`ColumnData::String`] column.
    pub fn string_pool_mut(&mut self) -> &mut StringPool {
        &mut self.pool
    }

    /// Adds a column backed by `data`.
    ///
    /// `NON_NULL` and `DENSE` are derived from the storage, so callers only
    /// pass the remaining flags. `SORTED` columns, including those named in
    /// [`TableOptions::sorted_columns`], are checked to be non-decreasing with
    /// nulls first and no NaN.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`], [`TableError::RowCountMismatch`]
    /// or [`TableError::NotSorted`].
    ///
    /// # Panics
    ///
    /// Panics when `data` is an identity or dummy variant.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        data: ColumnData,
        flags: ColumnFlags,
    ) -> Result<&mut Self, TableError> {
        let name = name.into();
        let (Some((nullable, dense)), Some(len)) = (data.storage_shape(), data.len()) else {
            panic!("column '{name}': identity and dummy columns have no storage to add");
        };
        self.check_name(&name)?;
        match self.row_count {
            Some(expected) if expected != len => {
                return Err(TableError::RowCountMismatch {
                    column: name,
                    expected,
                    actual: len,
                })
            }
            _ => self.row_count = Some(len),
        }

        let mut flags = flags - ColumnFlags::NON_NULL - ColumnFlags::DENSE;
        flags.set(ColumnFlags::NON_NULL, !nullable);
        flags.set(ColumnFlags::DENSE, dense);
        if self.options.is_sorted_column(&name) {
            flags |= ColumnFlags::SORTED;
        }
        if flags.contains(ColumnFlags::SORTED) && !is_non_decreasing(&data, &self.pool) {
            return Err(TableError::NotSorted(name));
        }

        self.columns.push(PendingColumn::Data { name, data, flags });
        Ok(self)
    }

    /// Adds a placeholder column with no storage.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`].
    pub fn add_dummy_column(&mut self, name: impl Into<String>) -> Result<&mut Self, TableError> {
        let name = name.into();
        self.check_name(&name)?;
        self.columns.push(PendingColumn::Dummy(name));
        Ok(self)
    }

    /// Adds every column of `batch`.
    ///
    /// Int32, UInt32, Int64 and Float64 columns keep their type. Utf8 and
    /// LargeUtf8 columns are interned into the builder's pool. Nullable
    /// fields use [`TableOptions::nullable_layout`], except strings which are
    /// always sparse.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnsupportedType`] for any other Arrow type, plus
    /// the errors of [`TableBuilder::add_column`].
    pub fn add_record_batch(&mut self, batch: &RecordBatch) -> Result<&mut Self, TableError> {
        let schema = batch.schema();
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            let data = self.column_data(field, array)?;
            self.add_column(field.name().as_str(), data, ColumnFlags::NONE)?;
        }
        coldb_log!(
            Level::Debug,
            "table_ingest",
            "table={} columns={} rows={}",
            self.name,
            batch.num_columns(),
            batch.num_rows()
        );
        Ok(self)
    }

    /// Binds every column to one identity row map and assembles the table.
    ///
    /// When [`TableOptions::id_column`] is set, an identity column with that
    /// name comes first.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] when a sorted column named in the
    /// options was never added, [`TableError::DuplicateColumn`] when the
    /// identity column's name is taken, and [`TableError::RowCountMismatch`]
    /// when the table would exceed `u32::MAX` rows.
    pub fn build(self) -> Result<Table, TableError> {
        if let Some(missing) = self
            .options
            .sorted_columns
            .iter()
            .find(|sorted| !self.columns.iter().any(|c| c.name() == sorted.as_str()))
        {
            return Err(TableError::UnknownColumn(missing.clone()));
        }
        let rows = self.row_count.unwrap_or(0);
        let row_count = u32::try_from(rows).map_err(|_| TableError::RowCountMismatch {
            column: self.name.clone(),
            expected: u32::MAX as usize,
            actual: rows,
        })?;

        let context = TableContext::new(Arc::new(self.pool), vec![RowMap::all(row_count)]);
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        if let Some(id_name) = &self.options.id_column {
            if self.columns.iter().any(|c| c.name() == id_name.as_str()) {
                return Err(TableError::DuplicateColumn(id_name.clone()));
            }
            let id = Column::id(&context, 0, 0);
            columns.push(if id.name() == id_name.as_str() {
                id
            } else {
                Column::rebind(&id, &context, 0, 0, Some(id_name.as_str()))
            });
        }
        for pending in self.columns {
            let idx = columns.len() as u32;
            columns.push(match pending {
                PendingColumn::Data { name, data, flags } => {
                    Column::new(name, data, flags, &context, idx, 0)
                }
                PendingColumn::Dummy(name) => Column::dummy(name, &context, idx),
            });
        }

        let table = Table::new(self.name, context, columns)?;
        coldb_log!(
            Level::Debug,
            ctx: LogContext::for_table(table.name()),
            "table_ingest",
            "columns={} rows={} built=true",
            table.columns().len(),
            table.row_count()
        );
        Ok(table)
    }

    fn check_name(&self, name: &str) -> Result<(), TableError> {
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(TableError::DuplicateColumn(name.to_owned()));
        }
        Ok(())
    }

    fn column_data(&mut self, field: &Field, array: &ArrayRef) -> Result<ColumnData, TableError> {
        let layout = if field.is_nullable() {
            self.options.nullable_layout
        } else {
            StorageLayout::NonNull
        };
        let data = match array.data_type() {
            DataType::Int32 => {
                NullableVector::from_array(array.as_primitive::<Int32Type>(), layout)?.into()
            }
            DataType::UInt32 => {
                NullableVector::from_array(array.as_primitive::<UInt32Type>(), layout)?.into()
            }
            DataType::Int64 => {
                NullableVector::from_array(array.as_primitive::<Int64Type>(), layout)?.into()
            }
            DataType::Float64 => {
                NullableVector::from_array(array.as_primitive::<Float64Type>(), layout)?.into()
            }
            DataType::Utf8 => self.intern_strings(array.as_string::<i32>().iter(), field)?,
            DataType::LargeUtf8 => self.intern_strings(array.as_string::<i64>().iter(), field)?,
            other => {
                return Err(TableError::UnsupportedType {
                    column: field.name().clone(),
                    data_type: other.clone(),
                })
            }
        };
        Ok(data)
    }

    fn intern_strings<'a>(
        &mut self,
        values: impl Iterator<Item = Option<&'a str>>,
        field: &Field,
    ) -> Result<ColumnData, TableError> {
        let layout = if field.is_nullable() {
            StorageLayout::Sparse
        } else {
            StorageLayout::NonNull
        };
        let ids = values.map(|value| value.map(|value| self.pool.intern(value).raw()));
        let storage = NullableVector::<UInt32Type>::from_options(ids, layout)?;
        Ok(ColumnData::String(Arc::new(storage)))
    }
}

fn is_non_decreasing(data: &ColumnData, pool: &StringPool) -> bool {
    match data {
        ColumnData::Int32(nv) => ordered_by(nv.iter(), compare::nullable_numeric),
        ColumnData::UInt32(nv) => ordered_by(nv.iter(), compare::nullable_numeric),
        ColumnData::Int64(nv) => ordered_by(nv.iter(), compare::nullable_numeric),
        ColumnData::Double(nv) => {
            !nv.iter().any(|v| v.is_some_and(f64::is_nan))
                && ordered_by(nv.iter(), compare::nullable_numeric)
        }
        ColumnData::String(ids) => ordered_by(
            ids.iter()
                .map(|raw| raw.and_then(|raw| pool.get(StringId::from_raw(raw)))),
            compare::nullable_string,
        ),
        ColumnData::Id => true,
        ColumnData::Dummy => false,
    }
}

fn ordered_by<V: Copy>(
    mut values: impl Iterator<Item = V>,
    cmp: impl Fn(V, V) -> Ordering,
) -> bool {
    let Some(mut prev) = values.next() else {
        return true;
    };
    for value in values {
        if cmp(prev, value) == Ordering::Greater {
            return false;
        }
        prev = value;
    }
    true
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Float64Array, Int32Array, LargeStringArray, StringArray, UInt32Array},
        datatypes::Schema,
    };

    use super::*;
    use crate::{column::ColumnType, query::ScalarValueRef};

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("ts", DataType::UInt32, false),
            Field::new("depth", DataType::Int32, true),
            Field::new("name", DataType::Utf8, true),
            Field::new("cat", DataType::LargeUtf8, false),
            Field::new("dur", DataType::Float64, false),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(UInt32Array::from(vec![1, 2, 2])),
                Arc::new(Int32Array::from(vec![Some(0), None, Some(1)])),
                Arc::new(StringArray::from(vec![Some("a"), None, Some("")])),
                Arc::new(LargeStringArray::from(vec!["x", "y", "x"])),
                Arc::new(Float64Array::from(vec![0.5, 1.5, 2.5])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn record_batch_ingestion() {
        let options = TableOptions::default()
            .nullable_layout(StorageLayout::Dense)
            .sorted_columns(["ts"]);
        let table = Table::from_record_batch("slice", &batch(), options).unwrap();

        let names: Vec<_> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["id", "ts", "depth", "name", "cat", "dur"]);
        assert_eq!(table.row_count(), 3);

        let ts = table.column("ts").unwrap();
        assert!(ts.is_sorted());
        assert!(!ts.is_nullable());
        let depth = table.column("depth").unwrap();
        assert!(depth.is_dense());
        assert_eq!(depth.get(1), ScalarValueRef::Null);
        let name = table.column("name").unwrap();
        assert!(name.is_nullable() && !name.is_dense());
        assert_eq!(name.get(1), ScalarValueRef::Null);
        assert_eq!(name.get(2), ScalarValueRef::Utf8(""));
        assert_eq!(table.column("cat").unwrap().get(2), ScalarValueRef::Utf8("x"));
        assert_eq!(table.string_pool().len(), 4);
    }

    #[test]
    fn sorted_claims_are_verified() {
        let options = TableOptions::default().sorted_columns(["dur", "depth"]);
        let err = Table::from_record_batch("slice", &batch(), options).unwrap_err();
        // depth is [0, null, 1]: the null is not first.
        assert!(matches!(err, TableError::NotSorted(name) if name == "depth"));

        let options = TableOptions::default().sorted_columns(["missing"]);
        let err = Table::from_record_batch("slice", &batch(), options).unwrap_err();
        assert!(matches!(err, TableError::UnknownColumn(name) if name == "missing"));

        let mut builder = TableBuilder::new("t", TableOptions::default());
        let nan = NullableVector::<Float64Type>::non_null(vec![1.0, f64::NAN]);
        let err = builder
            .add_column("v", nan.into(), ColumnFlags::SORTED)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, TableError::NotSorted(_)));
    }

    #[test]
    fn builder_rejects_bad_shapes() {
        let mut builder = TableBuilder::new("t", TableOptions::default());
        builder
            .add_column(
                "a",
                NullableVector::<Int64Type>::non_null(vec![1, 2]).into(),
                ColumnFlags::NONE,
            )
            .unwrap();
        let err = builder
            .add_column(
                "b",
                NullableVector::<Int64Type>::non_null(vec![1]).into(),
                ColumnFlags::NONE,
            )
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::RowCountMismatch { expected: 2, actual: 1, .. }
        ));
        let err = builder.add_dummy_column("a").map(|_| ()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));

        builder.add_column(
            "id",
            NullableVector::<Int64Type>::non_null(vec![5, 6]).into(),
            ColumnFlags::NONE,
        )
        .unwrap();
        assert!(matches!(builder.build(), Err(TableError::DuplicateColumn(name)) if name == "id"));
    }

    #[test]
    fn unsupported_types_are_errors() {
        let schema = Schema::new(vec![Field::new("flag", DataType::Boolean, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(arrow::array::BooleanArray::from(vec![true]))],
        )
        .unwrap();
        let err = Table::from_record_batch("t", &batch, TableOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            TableError::UnsupportedType { data_type: DataType::Boolean, .. }
        ));
    }

    #[test]
    fn custom_id_name_and_dummy_columns() {
        let mut builder = TableBuilder::new("t", TableOptions::default().id_column(Some("row")));
        let handle = builder.string_pool_mut().intern("z");
        builder
            .add_column(
                "s",
                ColumnData::String(Arc::new(NullableVector::<UInt32Type>::non_null(vec![
                    handle.raw(),
                    StringId::NULL.raw(),
                ]))),
                ColumnFlags::HIDDEN,
            )
            .unwrap()
            .add_dummy_column("later")
            .unwrap();
        let table = builder.build().unwrap();
        let row = table.column("row").unwrap();
        assert_eq!(row.column_type(), ColumnType::Id);
        assert_eq!(row.get(1), ScalarValueRef::Int64(1));
        let s = table.column("s").unwrap();
        assert!(s.is_hidden());
        assert_eq!(s.get(0), ScalarValueRef::Utf8("z"));
        assert_eq!(s.get(1), ScalarValueRef::Null);
        assert_eq!(table.column("later").unwrap().column_type(), ColumnType::Dummy);
    }

    #[test]
    fn seeded_pool_backs_ingested_strings() {
        let mut pool = StringPool::new();
        let render = pool.intern("render");
        let schema = Schema::new(vec![Field::new("name", DataType::Utf8, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec!["main", "render"]))],
        )
        .unwrap();

        let mut builder = TableBuilder::with_string_pool(
            "t",
            TableOptions::default().sorted_columns(["name"]),
            pool,
        );
        builder.add_record_batch(&batch).unwrap();
        let table = builder.build().unwrap();

        assert_eq!(table.string_pool().find("render"), Some(render));
        assert_eq!(table.string_pool().len(), 2);
        let name = table.column("name").unwrap();
        assert!(name.is_sorted());
        assert_eq!(name.get(0), ScalarValueRef::Utf8("main"));
        assert_eq!(name.get(1), ScalarValueRef::Utf8("render"));
    }
}
