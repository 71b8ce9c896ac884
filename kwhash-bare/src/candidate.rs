use super::{family::HashFunction, HashFn, Reduction};
use core::fmt;

/// A hash function together with its seed and reduction: everything needed to map a key to a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate<F = HashFn> {
    /// The hash function.
    function: F,

    /// The seed, for seeded functions.
    ///
    /// `None` means the function ignores its seed; it is then evaluated with seed 0.
    seed: Option<u64>,

    /// Digest to slot mapping.
    reduction: Reduction,
}

impl<F> Candidate<F> {
    /// Assemble a candidate.
    #[inline]
    #[must_use]
    pub const fn new(function: F, seed: Option<u64>, reduction: Reduction) -> Self {
        Self {
            function,
            seed,
            reduction,
        }
    }

    /// The hash function.
    #[inline]
    #[must_use]
    pub const fn function(&self) -> &F {
        &self.function
    }

    /// The seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The reduction.
    #[inline]
    #[must_use]
    pub const fn reduction(&self) -> Reduction {
        self.reduction
    }
}

impl<F: HashFunction> Candidate<F> {
    /// Compute the raw digest of a key. `None` if the function degenerates on it.
    #[inline]
    pub fn digest(&self, key: &[u8]) -> Option<i64> {
        self.function.digest(key, self.seed.unwrap_or(0))
    }

    /// Compute the slot of a key. `None` if the function degenerates on it.
    #[inline]
    pub fn slot(&self, key: &[u8]) -> Option<u64> {
        self.digest(key).map(|digest| self.reduction.reduce(digest))
    }
}

impl<F: fmt::Display> fmt::Display for Candidate<F> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seed {
            Some(seed) => write!(f, "{} (seed {seed}), {}", self.function, self.reduction),
            None => write!(f, "{}, {}", self.function, self.reduction),
        }
    }
}

#[cfg(feature = "codegen")]
impl<F: super::codegen::Codegen> super::codegen::Codegen for Candidate<F> {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let candidate = gen.path("kwhash::Candidate");
        let function = gen.piece(&self.function);
        let seed = gen.piece(&self.seed);
        let reduction = gen.piece(&self.reduction);
        quote::quote!(#candidate::new(#function, #seed, #reduction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{Operator, PairFn, StringFn};
    use alloc::string::ToString;

    #[test]
    fn slots() {
        let xor = Candidate::new(
            HashFn::Pair(PairFn::new(Operator::Xor, false, false)),
            None,
            Reduction::bits(8),
        );
        assert_eq!(xor.slot(b"if"), Some(15));
        assert_eq!(xor.slot(b"in"), Some(7));
        assert_eq!(xor.slot(b"is"), Some(26));

        let div = Candidate::new(
            HashFn::Pair(PairFn::new(Operator::Div, false, false)),
            None,
            Reduction::bits(8),
        );
        assert_eq!(div.digest(b"a"), None);
        assert_eq!(div.slot(b"a"), None);

        let djb2 = Candidate::new(
            HashFn::String(StringFn::Djb2),
            Some(5381),
            Reduction::bits(31),
        );
        assert_eq!(djb2.slot(b"a"), Some(177_670));
    }

    #[test]
    fn display() {
        let candidate = Candidate::new(
            HashFn::String(StringFn::Bkdr),
            Some(53),
            Reduction::bits(7),
        );
        assert_eq!(candidate.to_string(), "bkdr (seed 53), h & 0x7f");
    }
}
