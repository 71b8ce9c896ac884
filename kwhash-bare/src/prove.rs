//! Collision detection.
//!
//! A candidate is accepted iff its slots are pairwise distinct. When they are not, the prover
//! reports one colliding pair of key positions. The reported pair is always the lexicographically
//! smallest `(first, second)` pair with equal slots, i.e. `first` is the earliest key that collides
//! with anything, and `second` the earliest later key it collides with. Both provers agree on this.

use alloc::vec::Vec;

/// Two key positions with the same slot, `first < second`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collision {
    /// The earlier position.
    first: usize,
    /// The later position.
    second: usize,
}

impl Collision {
    /// Create a collision. The positions are sorted.
    #[inline]
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// The earlier position.
    #[inline]
    #[must_use]
    pub const fn first(&self) -> usize {
        self.first
    }

    /// The later position.
    #[inline]
    #[must_use]
    pub const fn second(&self) -> usize {
        self.second
    }
}

/// Collision detection strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Prover {
    /// Compare every pair. Quadratic, allocation-free; the fastest choice for a handful of keys.
    Pairwise,
    /// Radix-sort positions by slot and scan adjacent runs.
    #[default]
    Sorted,
}

impl Prover {
    /// Find the smallest colliding pair, if any.
    #[inline]
    #[must_use]
    pub fn find_collision(self, slots: &[u64]) -> Option<Collision> {
        match self {
            Self::Pairwise => pairwise(slots),
            Self::Sorted => scan(slots, &mut Vec::new()).collision,
        }
    }

    /// Check that all slots are distinct.
    #[inline]
    #[must_use]
    pub fn is_injective(self, slots: &[u64]) -> bool {
        self.find_collision(slots).is_none()
    }

    /// Find the smallest colliding pair and the number of colliding keys, sorting in `order`.
    ///
    /// Sorts at most once per call, and not at all for injective slots under
    /// [`Prover::Pairwise`].
    pub(crate) fn inspect(
        self,
        slots: &[u64],
        order: &mut Vec<(u64, usize)>,
    ) -> Option<(Collision, usize)> {
        match self {
            Self::Pairwise => {
                let collision = pairwise(slots)?;
                Some((collision, scan(slots, order).collisions))
            }
            Self::Sorted => {
                let found = scan(slots, order);
                Some((found.collision?, found.collisions))
            }
        }
    }
}

/// What a sorted scan found.
struct Scan {
    /// The smallest colliding pair.
    collision: Option<Collision>,
    /// Keys minus distinct slots.
    collisions: usize,
}

/// Nested loops, outer over `first`, inner over `second`, so the first hit is the smallest pair.
fn pairwise(slots: &[u64]) -> Option<Collision> {
    slots.iter().enumerate().find_map(|(first, slot)| {
        let offset = first + 1;
        slots
            .get(offset..)?
            .iter()
            .position(|other| other == slot)
            .map(|index| Collision::new(first, offset + index))
    })
}

/// Radix-sort `(slot, position)` pairs into `order` and walk adjacent pairs.
///
/// Stable sort keeps positions ascending within each run of equal slots, so each run's smallest
/// pair is its first two elements. The answer is the run pair with the smallest `first`. Every
/// adjacent equal pair is one key that would have to move.
fn scan(slots: &[u64], order: &mut Vec<(u64, usize)>) -> Scan {
    order.clear();
    order.extend(slots.iter().copied().zip(0..));
    radsort::sort_by_key(order.as_mut_slice(), |(slot, _)| *slot);

    let mut result = Scan {
        collision: None,
        collisions: 0,
    };
    for pair in order.windows(2) {
        let [(a, first), (b, second)] = pair else {
            continue;
        };
        if a != b {
            continue;
        }
        result.collisions += 1;
        if result
            .collision
            .map_or(true, |collision| *first < collision.first())
        {
            result.collision = Some(Collision::new(*first, *second));
        }
    }
    result
}

/// The number of keys that would have to move for the slots to become distinct: the key count
/// minus the number of distinct slots.
#[inline]
#[must_use]
pub fn count_collisions(slots: &[u64]) -> usize {
    scan(slots, &mut Vec::new()).collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_collision() {
        for prover in [Prover::Pairwise, Prover::Sorted] {
            assert_eq!(prover.find_collision(&[]), None);
            assert_eq!(prover.find_collision(&[5]), None);
            assert_eq!(prover.find_collision(&[15, 7, 26]), None);
            assert!(prover.is_injective(&[3, 2, 1, 0]));
        }
    }

    #[test]
    fn engineered() {
        for prover in [Prover::Pairwise, Prover::Sorted] {
            assert_eq!(
                prover.find_collision(&[1, 2, 3, 2]),
                Some(Collision::new(1, 3)),
            );
            // Several collisions: the pair with the smallest first position wins, even though the
            // other pair has a smaller slot and a smaller second position.
            assert_eq!(
                prover.find_collision(&[9, 4, 1, 4, 9]),
                Some(Collision::new(0, 4)),
            );
            assert_eq!(
                prover.find_collision(&[0, 7, 7, 0]),
                Some(Collision::new(0, 3)),
            );
            // Triples report the first two.
            assert_eq!(
                prover.find_collision(&[5, 8, 5, 5]),
                Some(Collision::new(0, 2)),
            );
        }
    }

    #[test]
    fn counting() {
        assert_eq!(count_collisions(&[]), 0);
        assert_eq!(count_collisions(&[1, 2, 3]), 0);
        assert_eq!(count_collisions(&[1, 1, 1]), 2);
        assert_eq!(count_collisions(&[4, 1, 4, 1, 0]), 2);
    }

    #[test]
    fn inspection() {
        let mut order = Vec::new();
        for prover in [Prover::Pairwise, Prover::Sorted] {
            assert_eq!(
                prover.inspect(&[9, 4, 1, 4, 9, 9], &mut order),
                Some((Collision::new(0, 4), 3)),
            );
            let capacity = order.capacity();
            assert_eq!(prover.inspect(&[3, 1, 2], &mut order), None);
            assert_eq!(order.capacity(), capacity);
        }

        // The buffer holds the sorted run the count came from.
        assert!(Prover::Sorted.inspect(&[2, 0, 2], &mut order).is_some());
        assert_eq!(order, [(0, 1), (2, 0), (2, 2)]);
    }

    #[test]
    fn collision_order() {
        let collision = Collision::new(7, 2);
        assert_eq!((collision.first(), collision.second()), (2, 7));
    }

    proptest! {
        #[test]
        fn provers_agree(slots in proptest::collection::vec(0..16_u64, 0..24)) {
            let expected = Prover::Pairwise.find_collision(&slots);
            prop_assert_eq!(Prover::Sorted.find_collision(&slots), expected);

            let mut distinct = slots.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(expected.is_none(), distinct.len() == slots.len());
            prop_assert_eq!(count_collisions(&slots), slots.len() - distinct.len());

            let mut order = Vec::new();
            for prover in [Prover::Pairwise, Prover::Sorted] {
                let found = prover.inspect(&slots, &mut order);
                prop_assert_eq!(found.map(|(collision, _)| collision), expected);
                prop_assert_eq!(
                    found.map_or(0, |(_, collisions)| collisions),
                    slots.len() - distinct.len(),
                );
            }

            if let Some(collision) = expected {
                prop_assert!(collision.first() < collision.second());
                prop_assert_eq!(slots[collision.first()], slots[collision.second()]);
            }
        }
    }
}
