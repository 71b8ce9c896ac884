//! Declarative tables.
//!
//! A [`Table`] lists each key of a [`Solution`] with its digest and slot, plus the slot width, which
//! is everything a code generator needs to print a constant keyword table. The slots are exactly the
//! ones the search validated; [`Table::verify`] re-hashes the keys to prove it.

use super::{
    family::HashFunction,
    search::Solution,
    Candidate, HashFn, KeySet, Keywords,
};
use alloc::{string::String, vec::Vec};
use core::fmt;

/// Entry order of a [`Table`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Order {
    /// Input key order.
    #[default]
    Keys,
    /// Ascending slots.
    Slots,
}

/// One key of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Entry<'a> {
    /// The key.
    pub key: &'a str,
    /// Its raw digest.
    pub digest: i64,
    /// Its slot.
    pub slot: u64,
}

/// A re-hashed key did not land where the table says.
#[derive(Clone, Debug, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
#[non_exhaustive]
pub enum Drift {
    /// key {key:?} maps to slot {found:?}, but the table says {expected}
    Slot {
        /// The key.
        key: String,
        /// Slot in the table.
        expected: u64,
        /// Slot after re-hashing, `None` if the function degenerates.
        found: Option<u64>,
    },

    /// key {key:?} has digest {found:?}, but the table says {expected}
    Digest {
        /// The key.
        key: String,
        /// Digest in the table.
        expected: i64,
        /// Digest after re-hashing.
        found: Option<i64>,
    },
}

/// An emitted table.
#[derive(Clone, Debug)]
pub struct Table<'a, F = HashFn> {
    /// The candidate that produced the slots.
    candidate: &'a Candidate<F>,
    /// The keys, for ordinals.
    keys: &'a KeySet,
    /// Entries in the requested order.
    entries: Vec<Entry<'a>>,
}

impl<F> Solution<F> {
    /// Emit the solution as a table.
    #[inline]
    #[must_use]
    pub fn table(&self, order: Order) -> Table<'_, F> {
        let mut entries: Vec<Entry<'_>> = self
            .assignment()
            .iter()
            .map(|(key, digest, slot)| Entry { key, digest, slot })
            .collect();
        if order == Order::Slots {
            radsort::sort_by_key(&mut entries, |entry| entry.slot);
        }
        Table {
            candidate: self.candidate(),
            keys: self.assignment().keys(),
            entries,
        }
    }
}

impl<'a, F> Table<'a, F> {
    /// The candidate.
    #[inline]
    #[must_use]
    pub const fn candidate(&self) -> &'a Candidate<F> {
        self.candidate
    }

    /// The entries.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Bits needed to store any slot of the reduction.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.candidate.reduction().width()
    }

    /// Hex digits needed to print any slot of the reduction.
    #[inline]
    #[must_use]
    pub const fn hex_width(&self) -> usize {
        let digits = self.width().div_ceil(4) as usize;
        if digits == 0 {
            1
        } else {
            digits
        }
    }

    /// Slot-indexed key layout, `bound` cells long, as hand-written keyword maps look.
    ///
    /// Returns `None` if the reduction has [`Keywords::MAX_SLOTS`] slots or more.
    #[inline]
    #[must_use]
    pub fn dense(&self) -> Option<Vec<Option<&'a str>>> {
        let bound = self.candidate.reduction().bound();
        if bound > u128::from(Keywords::<F>::MAX_SLOTS) {
            return None;
        }
        let mut cells = alloc::vec![None; usize::try_from(bound).ok()?];
        for entry in &self.entries {
            *cells.get_mut(usize::try_from(entry.slot).ok()?)? = Some(entry.key);
        }
        Some(cells)
    }
}

impl<'a, F: HashFunction + Clone> Table<'a, F> {
    /// Re-hash every key and compare with the table.
    ///
    /// # Errors
    ///
    /// Returns the first key whose digest or slot differs.
    #[inline]
    pub fn verify(&self) -> Result<(), Drift> {
        for entry in &self.entries {
            let digest = self.candidate.digest(entry.key.as_bytes());
            if digest != Some(entry.digest) {
                return Err(Drift::Digest {
                    key: entry.key.into(),
                    expected: entry.digest,
                    found: digest,
                });
            }
            let slot = self.candidate.slot(entry.key.as_bytes());
            if slot != Some(entry.slot) {
                return Err(Drift::Slot {
                    key: entry.key.into(),
                    expected: entry.slot,
                    found: slot,
                });
            }
        }
        Ok(())
    }

    /// Build a runtime lookup table. Ordinals are input key positions.
    ///
    /// Returns `None` if a slot reaches [`Keywords::MAX_SLOTS`].
    #[inline]
    #[must_use]
    pub fn keywords(&self) -> Option<Keywords<'a, F>> {
        Keywords::try_new(self.candidate.clone(), self.keys.iter())
    }
}

impl<F: fmt::Display> fmt::Display for Table<'_, F> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {}", self.candidate)?;
        let width = self.hex_width();
        for entry in &self.entries {
            writeln!(f, "{} => {:#0w$x}", entry.key, entry.slot, w = width + 2)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        search::{Search, SearchConfig, SearchSpace, Seeds},
        Reduction,
    };
    use alloc::{string::ToString, vec};

    fn solve(keys: &KeySet, reduction: Reduction) -> Solution {
        let space = SearchSpace::new(HashFn::pairs().collect(), Seeds::default(), vec![reduction]);
        Search::new(keys, space, SearchConfig::new())
            .unwrap()
            .first(&mut ())
            .into_result()
            .unwrap()
    }

    #[test]
    fn orders() {
        let keys = KeySet::new(["if", "in", "is"]).unwrap();
        let solution = solve(&keys, Reduction::bits(2));
        assert_eq!(solution.position(), 4);

        let table = solution.table(Order::Keys);
        let listed: Vec<_> = table.entries().iter().map(|e| (e.key, e.digest, e.slot)).collect();
        assert_eq!(listed, [("if", 128, 0), ("in", 203, 3), ("is", 218, 2)]);

        let table = solution.table(Order::Slots);
        let listed: Vec<_> = table.entries().iter().map(|e| e.key).collect();
        assert_eq!(listed, ["if", "is", "in"]);
        assert_eq!(table.width(), 2);
        assert_eq!(table.hex_width(), 1);
        assert_eq!(table.dense().unwrap(), [Some("if"), None, Some("is"), Some("in")]);
        assert_eq!(
            table.to_string(),
            "// mul(l, r), h & 0x3\nif => 0x0\nis => 0x2\nin => 0x3\n",
        );
    }

    #[test]
    fn round_trip() {
        let keys = KeySet::new([
            "**", "//", "!=", "%=", "*=", "+=", "-=", "/=", "<<", "<=", "==", ">=", ">>",
        ])
        .unwrap();
        let solution = solve(&keys, Reduction::bits(8));
        let table = solution.table(Order::Keys);
        assert_eq!(table.verify(), Ok(()));
        assert_eq!(table.hex_width(), 2);

        let keywords = table.keywords().unwrap();
        for (ordinal, key) in keys.iter().enumerate() {
            assert_eq!(keywords.get(key), Some(ordinal));
        }
        assert_eq!(keywords.get("<>"), None);
        assert_eq!(keywords.len(), 13);
    }

    #[test]
    fn drift() {
        let keys = KeySet::new(["if", "in", "is"]).unwrap();
        let solution = solve(&keys, Reduction::bits(8));
        let mut table = solution.table(Order::Keys);
        table.entries[1].slot += 1;
        assert_eq!(
            table.verify(),
            Err(Drift::Slot {
                key: "in".to_string(),
                expected: 216,
                found: Some(215),
            }),
        );
        table.entries[0].digest = -1;
        assert!(matches!(table.verify(), Err(Drift::Digest { expected: -1, .. })));
    }

    #[test]
    fn wide_tables_are_not_dense() {
        let keys = KeySet::new(["if", "in"]).unwrap();
        let solution = solve(&keys, Reduction::bits(32));
        assert_eq!(solution.table(Order::Keys).dense(), None);
        assert_eq!(solution.table(Order::Keys).hex_width(), 8);
    }
}
