use crate::storage::StorageLayout;

/// Options applied when a table is built from Arrow data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub(crate) nullable_layout: StorageLayout,
    pub(crate) id_column: Option<String>,
    pub(crate) sorted_columns: Vec<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            nullable_layout: StorageLayout::Sparse,
            id_column: Some("id".to_owned()),
            sorted_columns: Vec::new(),
        }
    }
}

impl TableOptions {
    /// Layout for nullable numeric columns: `Sparse` (default) or `Dense`.
    ///
    /// # Panics
    ///
    /// Panics when given `NonNull`, which cannot hold nulls.
    pub fn nullable_layout(self, nullable_layout: StorageLayout) -> Self {
        assert!(
            nullable_layout != StorageLayout::NonNull,
            "nullable columns need a Sparse or Dense layout"
        );
        TableOptions {
            nullable_layout,
            ..self
        }
    }

    /// Name of the identity column prepended on ingestion; `None` skips it.
    pub fn id_column(self, id_column: Option<impl Into<String>>) -> Self {
        TableOptions {
            id_column: id_column.map(Into::into),
            ..self
        }
    }

    /// Columns to flag as sorted. Ingestion verifies each claim.
    pub fn sorted_columns<I, S>(self, sorted_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableOptions {
            sorted_columns: sorted_columns.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub(crate) fn is_sorted_column(&self, name: &str) -> bool {
        self.sorted_columns.iter().any(|sorted| sorted == name)
    }
}
