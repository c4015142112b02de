//! Nullable value storage backed by Arrow buffers.
//!
//! A [`NullableVector`] holds one column's values in one of three layouts:
//!
//! * `NonNull`: one slot per row and no validity bitmap.
//! * `Dense`: one slot per row plus a validity bitmap. Null rows keep an
//!   unspecified value in their slot.
//! * `Sparse`: a validity bitmap plus packed slots for present rows only. A
//!   per-block rank table maps a row to its packed slot.

use arrow::{
    array::{Array, PrimitiveArray},
    buffer::{BooleanBuffer, NullBuffer, ScalarBuffer},
    datatypes::ArrowPrimitiveType,
};

use crate::error::StorageError;

const RANK_BLOCK: usize = 64;

/// Physical layout of a [`NullableVector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageLayout {
    /// Every row is present; no validity bitmap.
    NonNull,
    /// Null rows occupy no slot.
    Sparse,
    /// Every row occupies a slot, null or not.
    Dense,
}

/// Per-type value container with optional nulls.
#[derive(Debug)]
pub struct NullableVector<T: ArrowPrimitiveType> {
    layout: StorageLayout,
    len: usize,
    values: ScalarBuffer<T::Native>,
    validity: Option<NullBuffer>,
    ranks: Vec<u32>,
}

impl<T: ArrowPrimitiveType> NullableVector<T> {
    /// Builds a vector with no nulls.
    pub fn non_null(values: impl Into<ScalarBuffer<T::Native>>) -> Self {
        let values = values.into();
        Self {
            layout: StorageLayout::NonNull,
            len: values.len(),
            values,
            validity: None,
            ranks: Vec::new(),
        }
    }

    /// Builds a sparse vector from its packed present values and validity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LengthMismatch`] when the number of values
    /// differs from the number of rows marked present.
    pub fn sparse(
        values: impl Into<ScalarBuffer<T::Native>>,
        validity: BooleanBuffer,
    ) -> Result<Self, StorageError> {
        let values = values.into();
        let present = validity.count_set_bits();
        if present != values.len() {
            return Err(StorageError::LengthMismatch {
                values: values.len(),
                present,
            });
        }
        let ranks = build_ranks(&validity);
        Ok(Self {
            layout: StorageLayout::Sparse,
            len: validity.len(),
            values,
            validity: Some(NullBuffer::new(validity)),
            ranks,
        })
    }

    /// Converts an Arrow array into the requested layout.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnexpectedNulls`] when `layout` is `NonNull`
    /// and the array contains nulls.
    pub fn from_array(
        array: &PrimitiveArray<T>,
        layout: StorageLayout,
    ) -> Result<Self, StorageError> {
        let len = array.len();
        match layout {
            StorageLayout::NonNull => {
                if array.null_count() > 0 {
                    return Err(StorageError::UnexpectedNulls(array.null_count()));
                }
                Ok(Self::non_null(array.values().clone()))
            }
            StorageLayout::Dense => {
                let validity = array
                    .nulls()
                    .cloned()
                    .unwrap_or_else(|| NullBuffer::new_valid(len));
                Ok(Self {
                    layout,
                    len,
                    values: array.values().clone(),
                    validity: Some(validity),
                    ranks: Vec::new(),
                })
            }
            StorageLayout::Sparse => {
                let validity = array
                    .nulls()
                    .map(|nulls| nulls.inner().clone())
                    .unwrap_or_else(|| BooleanBuffer::new_set(len));
                let packed: Vec<T::Native> = array.iter().flatten().collect();
                Self::sparse(packed, validity)
            }
        }
    }

    /// Builds a vector from optional values in the requested layout.
    ///
    /// # Errors
    ///
    /// See [`NullableVector::from_array`].
    pub fn from_options<I>(values: I, layout: StorageLayout) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = Option<T::Native>>,
    {
        let array: PrimitiveArray<T> = values.into_iter().collect();
        Self::from_array(&array, layout)
    }

    /// Value at `row`, or `None` when the row is null.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[inline]
    pub fn get(&self, row: u32) -> Option<T::Native> {
        let row = row as usize;
        assert!(row < self.len, "row {row} out of bounds (len {})", self.len);
        match self.layout {
            StorageLayout::NonNull => Some(self.values[row]),
            StorageLayout::Dense => self.is_valid(row).then(|| self.values[row]),
            StorageLayout::Sparse => self.is_valid(row).then(|| self.values[self.rank(row)]),
        }
    }

    /// Value at `row`; the caller guarantees the row is not null.
    #[inline]
    pub fn get_non_null(&self, row: u32) -> T::Native {
        let row = row as usize;
        debug_assert!(self.is_valid(row), "get_non_null on null row {row}");
        match self.layout {
            StorageLayout::NonNull | StorageLayout::Dense => self.values[row],
            StorageLayout::Sparse => self.values[self.rank(row)],
        }
    }

    /// Iterates over every row in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<T::Native>> + '_ {
        (0..self.len as u32).map(move |row| self.get(row))
    }

    /// Physical layout.
    pub fn layout(&self) -> StorageLayout {
        self.layout
    }

    /// Returns true when every logical row owns a slot and nulls are possible.
    pub fn is_dense(&self) -> bool {
        self.layout == StorageLayout::Dense
    }

    /// Returns true unless the layout is `NonNull`.
    pub fn is_nullable(&self) -> bool {
        self.layout != StorageLayout::NonNull
    }

    /// Number of logical rows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the vector has no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of null rows.
    pub fn null_count(&self) -> usize {
        self.validity.as_ref().map_or(0, NullBuffer::null_count)
    }

    #[inline]
    fn is_valid(&self, row: usize) -> bool {
        self.validity
            .as_ref()
            .map_or(true, |validity| validity.is_valid(row))
    }

    fn rank(&self, row: usize) -> usize {
        let Some(validity) = &self.validity else {
            return row;
        };
        let block = row / RANK_BLOCK;
        let block_start = block * RANK_BLOCK;
        let within = validity
            .inner()
            .slice(block_start, row - block_start)
            .count_set_bits();
        self.ranks[block] as usize + within
    }
}

fn build_ranks(validity: &BooleanBuffer) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(validity.len().div_ceil(RANK_BLOCK));
    let mut acc = 0u32;
    let mut start = 0;
    while start < validity.len() {
        ranks.push(acc);
        let width = RANK_BLOCK.min(validity.len() - start);
        acc += validity.slice(start, width).count_set_bits() as u32;
        start += width;
    }
    ranks
}
