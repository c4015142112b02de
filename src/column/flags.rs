use std::{fmt, ops};

use super::ColumnType;

/// Metadata bits carried by a column.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ColumnFlags(u32);

impl ColumnFlags {
    /// No flags.
    pub const NONE: ColumnFlags = ColumnFlags(0);
    /// Values are non-decreasing in row order.
    pub const SORTED: ColumnFlags = ColumnFlags(1 << 0);
    /// The column never holds nulls.
    pub const NON_NULL: ColumnFlags = ColumnFlags(1 << 1);
    /// The column is hidden from callers enumerating columns.
    pub const HIDDEN: ColumnFlags = ColumnFlags(1 << 2);
    /// Storage keeps a slot for null rows.
    pub const DENSE: ColumnFlags = ColumnFlags(1 << 3);
    /// Each value is the row number of the first row sharing it.
    pub const SET_ID: ColumnFlags = ColumnFlags(1 << 4);

    /// Flags every RowId column is created with.
    pub const ID_FLAGS: ColumnFlags = ColumnFlags(Self::SORTED.0 | Self::NON_NULL.0);
    /// Flags dropped when a column is rebound to another table.
    pub const NO_CROSS_TABLE_INHERIT: ColumnFlags = Self::SET_ID;

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds flags from raw bits; unknown bits are kept verbatim.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns true when every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: ColumnFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true when no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sets or clears the bits of `other`.
    pub fn set(&mut self, other: ColumnFlags, enabled: bool) {
        if enabled {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    /// Returns true when this combination is legal for a column of type `ty`.
    #[must_use]
    pub fn is_valid_for(self, ty: ColumnType) -> bool {
        match ty {
            ColumnType::Dummy => self.is_empty(),
            ColumnType::Id => {
                self.contains(Self::NON_NULL)
                    && !self.contains(Self::DENSE)
                    && !self.contains(Self::SET_ID)
            }
            ColumnType::String if self.contains(Self::DENSE) => false,
            _ => {
                let dense_ok = !self.contains(Self::DENSE) || !self.contains(Self::NON_NULL);
                let set_id_ok = !self.contains(Self::SET_ID)
                    || (ty == ColumnType::UInt32
                        && self.contains(Self::NON_NULL)
                        && self.contains(Self::SORTED));
                dense_ok && set_id_ok
            }
        }
    }
}

impl ops::BitOr for ColumnFlags {
    type Output = ColumnFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ColumnFlags(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for ColumnFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl ops::Sub for ColumnFlags {
    type Output = ColumnFlags;

    fn sub(self, rhs: Self) -> Self::Output {
        ColumnFlags(self.0 & !rhs.0)
    }
}

impl fmt::Debug for ColumnFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ColumnFlags, &str); 5] = [
            (ColumnFlags::SORTED, "SORTED"),
            (ColumnFlags::NON_NULL, "NON_NULL"),
            (ColumnFlags::HIDDEN, "HIDDEN"),
            (ColumnFlags::DENSE, "DENSE"),
            (ColumnFlags::SET_ID, "SET_ID"),
        ];
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_subtract() {
        let mut flags = ColumnFlags::SORTED | ColumnFlags::SET_ID;
        assert!(flags.contains(ColumnFlags::SORTED));
        flags.set(ColumnFlags::SORTED, false);
        assert!(!flags.contains(ColumnFlags::SORTED));
        flags.set(ColumnFlags::HIDDEN, true);
        assert_eq!(
            flags - ColumnFlags::NO_CROSS_TABLE_INHERIT,
            ColumnFlags::HIDDEN
        );
        assert_eq!(format!("{flags:?}"), "HIDDEN | SET_ID");
        assert_eq!(format!("{:?}", ColumnFlags::NONE), "NONE");
    }

    #[test]
    fn validity_rules() {
        use ColumnType::*;
        assert!(ColumnFlags::NONE.is_valid_for(Dummy));
        assert!(!ColumnFlags::HIDDEN.is_valid_for(Dummy));

        assert!(ColumnFlags::ID_FLAGS.is_valid_for(Id));
        assert!(ColumnFlags::NON_NULL.is_valid_for(Id));
        assert!(!ColumnFlags::SORTED.is_valid_for(Id));

        assert!(ColumnFlags::DENSE.is_valid_for(Int64));
        assert!(!(ColumnFlags::DENSE | ColumnFlags::NON_NULL).is_valid_for(Int64));
        assert!(!ColumnFlags::DENSE.is_valid_for(String));

        let set_id = ColumnFlags::SET_ID | ColumnFlags::SORTED | ColumnFlags::NON_NULL;
        assert!(set_id.is_valid_for(UInt32));
        assert!(!set_id.is_valid_for(Int32));
        assert!(!(ColumnFlags::SET_ID | ColumnFlags::NON_NULL).is_valid_for(UInt32));
    }
}
