//! Interning pool shared by every string column of a table.

use std::{collections::HashMap, fmt, sync::Arc};

/// Handle to a string interned in a [`StringPool`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    /// Handle that resolves to no string at all.
    pub const NULL: StringId = StringId(0);

    /// Wraps a raw handle as stored in a column.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle as stored in a column.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true for [`StringId::NULL`].
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Append-only string interning pool.
///
/// Interning happens while tables are built; afterwards the pool is shared
/// read-only behind an `Arc`.
#[derive(Debug)]
pub struct StringPool {
    strings: Vec<Arc<str>>,
    index: HashMap<Arc<str>, StringId>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Creates a pool holding only the null slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Slot 0 backs `StringId::NULL` and is never handed out.
            strings: vec![Arc::from("")],
            index: HashMap::new(),
        }
    }

    /// Interns `value`, returning the existing handle when already present.
    ///
    /// # Panics
    ///
    /// Panics if the pool already holds `u32::MAX` strings.
    pub fn intern(&mut self, value: &str) -> StringId {
        if let Some(id) = self.index.get(value) {
            return *id;
        }
        let raw = u32::try_from(self.strings.len())
            .expect("string pool exhausted the u32 id space");
        let id = StringId(raw);
        let shared: Arc<str> = Arc::from(value);
        self.strings.push(Arc::clone(&shared));
        self.index.insert(shared, id);
        id
    }

    /// Interns an optional string; `None` maps to [`StringId::NULL`].
    pub fn intern_opt(&mut self, value: Option<&str>) -> StringId {
        value.map_or(StringId::NULL, |value| self.intern(value))
    }

    /// Resolves a handle. `StringId::NULL` and handles from another pool
    /// resolve to `None`; the empty string resolves to `Some("")`.
    pub fn get(&self, id: StringId) -> Option<&str> {
        if id.is_null() {
            return None;
        }
        debug_assert!(
            (id.0 as usize) < self.strings.len(),
            "string id {id} does not belong to this pool"
        );
        self.strings.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Looks up the handle of an already interned string.
    pub fn find(&self, value: &str) -> Option<StringId> {
        self.index.get(value).copied()
    }

    /// Number of interned strings, excluding the null slot.
    pub fn len(&self) -> usize {
        self.strings.len() - 1
    }

    /// Returns true when nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
