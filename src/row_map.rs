//! Row index sets: map a table's row positions onto storage rows.
//!
//! A [`RowMap`] is an ordered sequence of storage rows. Position `i` of the
//! table maps to `row_map.get(i)`. Filters narrow a second `RowMap` that holds
//! *positions* into the first one, which keeps filter targets independent of
//! how the column's storage is laid out.

use std::ops::Range;

use roaring::RoaringBitmap;

/// Unique identifier for a storage row.
pub type RowId = u32;

/// Borrowed iterator that yields [`RowId`] values.
pub type RowIdIter<'a> = Box<dyn Iterator<Item = RowId> + 'a>;

/// Ordered set of row indices, backed by a range, a bitmap or a list.
#[derive(Clone, Debug, PartialEq)]
pub enum RowMap {
    /// Contiguous rows `start..end`.
    Range(Range<RowId>),
    /// Sorted, de-duplicated rows stored as a roaring bitmap.
    BitVector(RoaringBitmap),
    /// Arbitrary row order, duplicates allowed.
    IndexVector(Vec<RowId>),
}

impl Default for RowMap {
    fn default() -> Self {
        RowMap::Range(0..0)
    }
}

impl RowMap {
    /// Identity map over the first `rows` rows.
    #[must_use]
    pub fn all(rows: u32) -> Self {
        RowMap::Range(0..rows)
    }

    /// Number of rows in the map.
    pub fn size(&self) -> u32 {
        match self {
            RowMap::Range(range) => range.end.saturating_sub(range.start),
            RowMap::BitVector(bitmap) => u32::try_from(bitmap.len()).unwrap_or(u32::MAX),
            RowMap::IndexVector(indices) => u32::try_from(indices.len()).unwrap_or(u32::MAX),
        }
    }

    /// Returns true when the map holds no rows.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Row stored at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn get(&self, pos: u32) -> RowId {
        assert!(
            pos < self.size(),
            "row map position {pos} out of bounds (size {})",
            self.size()
        );
        match self {
            RowMap::Range(range) => range.start + pos,
            RowMap::BitVector(bitmap) => bitmap
                .select(pos)
                .expect("position checked against bitmap length"),
            RowMap::IndexVector(indices) => indices[pos as usize],
        }
    }

    /// Position of the first occurrence of `row`, if present.
    pub fn index_of(&self, row: RowId) -> Option<u32> {
        match self {
            RowMap::Range(range) => range.contains(&row).then(|| row - range.start),
            RowMap::BitVector(bitmap) => bitmap
                .contains(row)
                .then(|| u32::try_from(bitmap.rank(row) - 1).unwrap_or(u32::MAX)),
            RowMap::IndexVector(indices) => indices
                .iter()
                .position(|&candidate| candidate == row)
                .and_then(|pos| u32::try_from(pos).ok()),
        }
    }

    /// Iterates over the rows in map order.
    pub fn iter(&self) -> RowIdIter<'_> {
        match self {
            RowMap::Range(range) => Box::new(range.clone()),
            RowMap::BitVector(bitmap) => Box::new(bitmap.iter()),
            RowMap::IndexVector(indices) => Box::new(indices.iter().copied()),
        }
    }

    /// Collects the rows into a vector.
    pub fn to_vec(&self) -> Vec<RowId> {
        self.iter().collect()
    }

    /// Removes every row.
    pub fn clear(&mut self) {
        match self {
            RowMap::Range(range) => *range = range.start..range.start,
            RowMap::BitVector(bitmap) => bitmap.clear(),
            RowMap::IndexVector(indices) => indices.clear(),
        }
    }

    /// Keeps only the rows whose value lies within `bounds`.
    pub fn intersect_range(&mut self, bounds: Range<RowId>) {
        match self {
            RowMap::Range(range) => {
                let start = range.start.max(bounds.start);
                let end = range.end.min(bounds.end).max(start);
                *range = start..end;
            }
            RowMap::BitVector(bitmap) => {
                bitmap.remove_range(..bounds.start);
                bitmap.remove_range(bounds.end..);
            }
            RowMap::IndexVector(indices) => indices.retain(|row| bounds.contains(row)),
        }
    }

    /// Composes two maps: position `i` of the result maps to
    /// `self.get(selector.get(i))`.
    #[must_use]
    pub fn select_rows(&self, selector: &RowMap) -> RowMap {
        match (self, selector) {
            (RowMap::Range(outer), RowMap::Range(inner)) => {
                RowMap::Range(outer.start + inner.start..outer.start + inner.end)
            }
            (RowMap::IndexVector(_), _) | (_, RowMap::IndexVector(_)) => {
                RowMap::IndexVector(selector.iter().map(|pos| self.get(pos)).collect())
            }
            // Both sides are monotonic so the composition stays sorted.
            _ => RowMap::BitVector(selector.iter().map(|pos| self.get(pos)).collect()),
        }
    }

    /// Narrows `out`, a map of positions into `self`, to the positions whose
    /// mapped row satisfies `predicate`. Relative order is preserved.
    pub fn filter_into<P>(&self, out: &mut RowMap, mut predicate: P)
    where
        P: FnMut(RowId) -> bool,
    {
        match out {
            RowMap::Range(range) => {
                let kept: RoaringBitmap = range
                    .clone()
                    .filter(|&pos| predicate(self.get(pos)))
                    .collect();
                *out = RowMap::BitVector(kept);
            }
            RowMap::BitVector(bitmap) => {
                let kept: RoaringBitmap = bitmap
                    .iter()
                    .filter(|&pos| predicate(self.get(pos)))
                    .collect();
                *bitmap = kept;
            }
            RowMap::IndexVector(indices) => indices.retain(|&pos| predicate(self.get(pos))),
        }
    }

    /// Stable-sorts `out`, a slice of positions into `self`, comparing the
    /// mapped rows with `comparator`.
    pub fn stable_sort<C>(&self, out: &mut [u32], mut comparator: C)
    where
        C: FnMut(RowId, RowId) -> std::cmp::Ordering,
    {
        out.sort_by(|&lhs, &rhs| comparator(self.get(lhs), self.get(rhs)));
    }
}

impl FromIterator<RowId> for RowMap {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        RowMap::IndexVector(iter.into_iter().collect())
    }
}
