//! Tables: named collections of columns sharing row maps and a string pool.
//!
//! Filtering and sorting a table never touch its storage. Both compute a
//! selector over the table's positions, compose it with every row map, and
//! rebind the columns to the composed maps in a new table.

mod builder;
mod context;

use std::{collections::HashSet, sync::Arc};

use arrow::record_batch::RecordBatch;
use log::Level;

pub use builder::TableBuilder;
pub use context::TableContext;

use crate::{
    column::{Column, ColumnType},
    error::TableError,
    logging::{coldb_log, LogContext},
    option::TableOptions,
    query::{Constraint, Order, ScalarValue},
    row_map::RowMap,
    string_pool::StringPool,
};

/// A set of equally long columns.
#[derive(Clone, Debug)]
pub struct Table {
    name: Arc<str>,
    context: Arc<TableContext>,
    columns: Vec<Column>,
    row_count: u32,
    log_ctx: LogContext,
}

impl Table {
    /// Assembles a table from columns already bound to `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] when two columns share a name
    /// and [`TableError::RowCountMismatch`] when a column's row map is not as
    /// long as the table's first row map.
    ///
    /// # Panics
    ///
    /// Panics when a column is bound to another context or when its index in
    /// the table disagrees with its position in `columns`.
    pub fn new(
        name: impl Into<Arc<str>>,
        context: Arc<TableContext>,
        columns: Vec<Column>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        let row_count = context.row_maps().first().map_or(0, RowMap::size);
        let mut seen = HashSet::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            assert!(
                Arc::ptr_eq(column.table_context(), &context),
                "column '{}' is bound to another table",
                column.name()
            );
            assert_eq!(
                column.index_in_table() as usize,
                idx,
                "column '{}' is out of place",
                column.name()
            );
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_owned()));
            }
            if column.column_type() != ColumnType::Dummy && column.row_map().size() != row_count {
                return Err(TableError::RowCountMismatch {
                    column: column.name().to_owned(),
                    expected: row_count as usize,
                    actual: column.row_map().size() as usize,
                });
            }
        }
        let log_ctx = LogContext::for_table(&name);
        Ok(Self {
            name,
            context,
            columns,
            row_count,
            log_ctx,
        })
    }

    /// Starts building a table named `name`.
    pub fn builder(name: impl Into<String>, options: TableOptions) -> TableBuilder {
        TableBuilder::new(name, options)
    }

    /// Builds a table holding the columns of `batch`.
    ///
    /// # Errors
    ///
    /// See [`TableBuilder::add_record_batch`] and [`TableBuilder::build`].
    pub fn from_record_batch(
        name: impl Into<String>,
        batch: &RecordBatch,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        let mut builder = TableBuilder::new(name, options);
        builder.add_record_batch(batch)?;
        builder.build()
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Shared state the columns read through.
    pub fn context(&self) -> &Arc<TableContext> {
        &self.context
    }

    /// String pool shared by the string columns.
    pub fn string_pool(&self) -> &Arc<StringPool> {
        self.context.string_pool()
    }

    /// Index of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<u32> {
        self.columns
            .iter()
            .position(|column| column.name() == name)
            .map(|idx| idx as u32)
    }

    /// Column named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] when no column has that name.
    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_owned()))
    }

    /// Value of column `column` at row `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] when no column has that name.
    ///
    /// # Panics
    ///
    /// Panics when `pos` is out of bounds or the column is a dummy.
    pub fn get(&self, pos: u32, column: &str) -> Result<ScalarValue, TableError> {
        Ok(self.column(column)?.get(pos).into())
    }

    /// Rows satisfying every constraint, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] when a constraint names a column
    /// the table does not have. No filtering happens in that case.
    pub fn filter(&self, constraints: &[Constraint]) -> Result<Table, TableError> {
        let columns = constraints
            .iter()
            .map(|constraint| self.column(&constraint.column))
            .collect::<Result<Vec<_>, _>>()?;

        let mut selector = RowMap::all(self.row_count);
        for (column, constraint) in columns.into_iter().zip(constraints) {
            if selector.is_empty() {
                break;
            }
            column.filter_into(constraint.op, constraint.value.as_ref(), &mut selector);
        }
        coldb_log!(
            Level::Debug,
            ctx: self.log_ctx,
            "table_filter",
            "constraints={} rows_in={} rows_out={}",
            constraints.len(),
            self.row_count,
            selector.size()
        );
        Ok(self.select(&selector))
    }

    /// Rows reordered by `orders`, the first order being the primary key.
    ///
    /// The result keeps `SORTED` only on the leading key, and only when it is
    /// ascending and free of NaN. An empty `orders` keeps row order and flags.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] when an order names a column the
    /// table does not have.
    pub fn sort(&self, orders: &[Order]) -> Result<Table, TableError> {
        let keys = orders
            .iter()
            .map(|order| {
                self.column_index(&order.column)
                    .map(|idx| (idx as usize, order.descending))
                    .ok_or_else(|| TableError::UnknownColumn(order.column.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if keys.is_empty() {
            return Ok(self.select(&RowMap::all(self.row_count)));
        }

        let mut positions: Vec<u32> = (0..self.row_count).collect();
        for &(idx, descending) in keys.iter().rev() {
            self.columns[idx].stable_sort(descending, &mut positions);
        }

        let mut sorted = self.select(&RowMap::IndexVector(positions));
        for column in &mut sorted.columns {
            column.set_sorted(false);
        }
        if let Some(&(idx, false)) = keys.first() {
            let leading = &mut sorted.columns[idx];
            if !leading.contains_nan() {
                leading.set_sorted(true);
            }
        }
        coldb_log!(
            Level::Debug,
            ctx: self.log_ctx,
            "table_sort",
            "keys={} rows={}",
            orders.len(),
            self.row_count
        );
        Ok(sorted)
    }

    fn select(&self, selector: &RowMap) -> Table {
        let row_maps = self
            .context
            .row_maps()
            .iter()
            .map(|row_map| row_map.select_rows(selector))
            .collect();
        let context = TableContext::new(Arc::clone(self.context.string_pool()), row_maps);
        let columns = self
            .columns
            .iter()
            .map(|column| {
                Column::rebind(
                    column,
                    &context,
                    column.index_in_table(),
                    column.row_map_idx(),
                    None,
                )
            })
            .collect();
        Table {
            name: Arc::clone(&self.name),
            context,
            columns,
            row_count: selector.size(),
            log_ctx: self.log_ctx.clone(),
        }
    }
}
