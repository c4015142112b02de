use std::sync::Arc;

use crate::{row_map::RowMap, string_pool::StringPool};

/// State shared between a table and its columns: the string pool and the row
/// maps columns read their rows through.
///
/// Columns hold an `Arc<TableContext>` rather than a reference to the table
/// itself, so a table can own its columns without a reference cycle.
#[derive(Debug)]
pub struct TableContext {
    string_pool: Arc<StringPool>,
    row_maps: Vec<RowMap>,
}

impl TableContext {
    /// Creates a context from a pool and its row maps.
    pub fn new(string_pool: Arc<StringPool>, row_maps: Vec<RowMap>) -> Arc<Self> {
        Arc::new(Self {
            string_pool,
            row_maps,
        })
    }

    /// The string pool shared by every string column of the table.
    pub fn string_pool(&self) -> &Arc<StringPool> {
        &self.string_pool
    }

    /// Row map stored in slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if the slot does not exist.
    pub fn row_map(&self, idx: u32) -> &RowMap {
        self.row_maps
            .get(idx as usize)
            .unwrap_or_else(|| panic!("row map slot {idx} does not exist"))
    }

    /// All row maps, indexed by slot.
    pub fn row_maps(&self) -> &[RowMap] {
        &self.row_maps
    }
}
