//! Slot-indexed keyword lookup.

use super::{family::HashFunction, Candidate, HashFn};
use core::ops::Deref;

/// One table cell: a key and its ordinal, or nothing.
type Cell<'a> = Option<(&'a str, usize)>;

/// Table storage, either borrowed (e.g. from a `static`) or allocated at runtime.
///
/// Generated code uses the borrowed form so that tables are usable in `const` context and without
/// an allocator.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Entries<'a> {
    /// Data that lives elsewhere, typically in a `static`.
    Borrowed(&'a [Cell<'a>]),

    /// Runtime-allocated data.
    #[cfg(feature = "alloc")]
    Owned(alloc::vec::Vec<Cell<'a>>),
}

impl<'a> Entries<'a> {
    /// Use existing data.
    #[inline]
    #[must_use]
    pub const fn from_slice(cells: &'a [Cell<'a>]) -> Self {
        Self::Borrowed(cells)
    }

    /// Use runtime data.
    #[cfg(feature = "alloc")]
    #[inline]
    #[must_use]
    pub const fn from_vec(cells: alloc::vec::Vec<Cell<'a>>) -> Self {
        Self::Owned(cells)
    }
}

impl<'a> Deref for Entries<'a> {
    type Target = [Cell<'a>];

    #[inline]
    fn deref(&self) -> &[Cell<'a>] {
        match self {
            Self::Borrowed(cells) => cells,
            #[cfg(feature = "alloc")]
            Self::Owned(cells) => cells,
        }
    }
}

/// A keyword table: maps each of a fixed set of strings to its ordinal with one hash evaluation,
/// one array index and one string comparison.
///
/// Construct it with the `keywords!` macro, from generated code, from a search result, or with
/// [`Keywords::try_new`] when the candidate is already known.
#[derive(Clone, Debug)]
pub struct Keywords<'a, F = HashFn> {
    /// Maps keys to indices in [`entries`](Self::entries).
    candidate: Candidate<F>,

    /// Cells indexed by slot. Each key is stored at its own slot, together with its position in
    /// the original key list.
    entries: Entries<'a>,

    /// The number of keys, i.e. of `Some` cells.
    len: usize,
}

impl<'a, F> Keywords<'a, F> {
    /// Slots at or above this bound are refused by [`Keywords::try_new`].
    pub const MAX_SLOTS: u64 = 1 << 20;

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn __from_raw_parts(candidate: Candidate<F>, entries: Entries<'a>, len: usize) -> Self {
        Self {
            candidate,
            entries,
            len,
        }
    }

    /// The candidate used for lookups.
    #[inline]
    #[must_use]
    pub const fn candidate(&self) -> &Candidate<F> {
        &self.candidate
    }

    /// Get the number of keys.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the table has no keys.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of cells, i.e. one more than the largest slot.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Iterate through keys and their ordinals, in slot order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, usize)> + '_ {
        self.entries.iter().filter_map(|cell| *cell)
    }
}

impl<'a, F: HashFunction> Keywords<'a, F> {
    /// Build a table from keys that `candidate` is known to separate.
    ///
    /// Ordinals are positions in `keys`. Returns `None` if two keys share a slot, if the function
    /// degenerates on a key, or if a slot reaches [`Keywords::MAX_SLOTS`].
    #[cfg(feature = "alloc")]
    #[inline]
    pub fn try_new(candidate: Candidate<F>, keys: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut entries = alloc::vec::Vec::new();
        let mut len = 0;
        for (ordinal, key) in keys.into_iter().enumerate() {
            let slot = candidate
                .slot(key.as_bytes())
                .filter(|slot| *slot < Self::MAX_SLOTS)?;
            let slot = usize::try_from(slot).ok()?;
            if slot >= entries.len() {
                entries.resize(slot + 1, None);
            }
            let cell = entries.get_mut(slot)?;
            if cell.is_some() {
                return None;
            }
            *cell = Some((key, ordinal));
            len += 1;
        }
        Some(Self {
            candidate,
            entries: Entries::Owned(entries),
            len,
        })
    }

    /// Look up the ordinal of a key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<usize> {
        self.get_key_value(key).map(|(_, ordinal)| ordinal)
    }

    /// Look up a key, returning the stored copy and its ordinal.
    #[inline]
    pub fn get_key_value(&self, key: &str) -> Option<(&'a str, usize)> {
        let slot = self.candidate.slot(key.as_bytes())?;
        let slot = usize::try_from(slot).ok()?;
        self.entries
            .get(slot)
            .copied()
            .flatten()
            .filter(|(stored, _)| *stored == key)
    }

    /// Check if a key is present.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.get_key_value(key).is_some()
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for Entries<'_> {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let entries = gen.path("kwhash::low_level::Entries");
        let data = gen.array(&**self);
        if gen.mutability() {
            let vec = gen.path("alloc::vec");
            quote::quote!(#entries::from_vec(#vec!#data))
        } else {
            quote::quote!(#entries::from_slice(&#data))
        }
    }
}

#[cfg(feature = "codegen")]
impl<F: super::codegen::Codegen> super::codegen::Codegen for Keywords<'_, F> {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let keywords = gen.path("kwhash::Keywords");
        let candidate = gen.piece(&self.candidate);
        let entries = gen.piece(&self.entries);
        let len = gen.piece(&self.len);
        quote::quote!(#keywords::__from_raw_parts(#candidate, #entries, #len))
    }
}
