//! Candidate hash functions.
//!
//! The family is closed and data-driven. It has two arity classes:
//!
//! - [`PairFn`]: combines the first two bytes of a key with one [`Operator`], optionally taking the
//!   bitwise complement of either operand. There are `7 * 2 * 2 = 28` of them, enumerated by
//!   [`PairFn::ALL`] in a fixed order.
//! - [`StringFn`]: folds every byte of a key into an accumulator (DJB2, BKDR or SDBM) starting from
//!   a seed, and masks the result to 31 bits so that it stays representable as a non-negative
//!   32-bit signed integer.
//!
//! All arithmetic is done on raw byte values and is bit-exact across platforms.

use core::fmt;

/// A deterministic function from a key to a raw digest.
///
/// This is the seam the search is generic over. [`HashFn`] is the production implementation; other
/// implementations are mostly useful as test doubles.
pub trait HashFunction {
    /// Compute the digest of `key`.
    ///
    /// Returns `None` if the function degenerates on this key (e.g. division by zero). Seedless
    /// functions ignore `seed`.
    fn digest(&self, key: &[u8], seed: u64) -> Option<i64>;

    /// Whether the digest depends on the seed.
    ///
    /// The search only iterates through seeds for seeded functions.
    #[inline]
    fn is_seeded(&self) -> bool {
        false
    }
}

impl<F: ?Sized + HashFunction> HashFunction for &F {
    #[inline]
    fn digest(&self, key: &[u8], seed: u64) -> Option<i64> {
        (**self).digest(key, seed)
    }

    #[inline]
    fn is_seeded(&self) -> bool {
        (**self).is_seeded()
    }
}

/// Input shape of a hash function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Arity {
    /// Exactly two bytes: the first and the second byte of the key.
    Pair,
    /// The whole key.
    String,
}

/// Binary operator of a [`PairFn`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Operator {
    /// `l + r`
    Add,
    /// `l | r`
    Or,
    /// `l ^ r`
    Xor,
    /// `l & r`
    And,
    /// `((l * r) mod 255) | 0x80`, never zero
    Mul,
    /// `l / r`, rounding towards negative infinity
    Div,
    /// `l mod r`, with the sign of `r`
    Rem,
}

impl Operator {
    /// All operators in registry order.
    pub const ALL: [Self; 7] = [
        Self::Add,
        Self::Or,
        Self::Xor,
        Self::And,
        Self::Mul,
        Self::Div,
        Self::Rem,
    ];

    /// Position in [`Operator::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Add => 0,
            Self::Or => 1,
            Self::Xor => 2,
            Self::And => 3,
            Self::Mul => 4,
            Self::Div => 5,
            Self::Rem => 6,
        }
    }

    /// Short lowercase name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::And => "and",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Rem => "rem",
        }
    }

    /// Apply the operator. `None` on division by zero.
    const fn apply(self, l: i64, r: i64) -> Option<i64> {
        match self {
            Self::Add => Some(l.wrapping_add(r)),
            Self::Or => Some(l | r),
            Self::Xor => Some(l ^ r),
            Self::And => Some(l & r),
            Self::Mul => Some(l.wrapping_mul(r).rem_euclid(255) | 0x80),
            Self::Div => floor_div(l, r),
            Self::Rem => floor_rem(l, r),
        }
    }
}

/// Division rounding towards negative infinity.
const fn floor_div(l: i64, r: i64) -> Option<i64> {
    let Some(quotient) = l.checked_div(r) else {
        return None;
    };
    if l.wrapping_rem(r) != 0 && ((l < 0) != (r < 0)) {
        Some(quotient.wrapping_sub(1))
    } else {
        Some(quotient)
    }
}

/// Remainder of [`floor_div`]; takes the sign of the divisor.
const fn floor_rem(l: i64, r: i64) -> Option<i64> {
    let Some(remainder) = l.checked_rem(r) else {
        return None;
    };
    if remainder != 0 && ((remainder < 0) != (r < 0)) {
        Some(remainder.wrapping_add(r))
    } else {
        Some(remainder)
    }
}

/// A function of the first two bytes of a key.
///
/// A missing byte (for keys shorter than two bytes) reads as zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairFn {
    /// How the operands are combined.
    op: Operator,
    /// Whether the first byte is complemented.
    not_left: bool,
    /// Whether the second byte is complemented.
    not_right: bool,
}

impl PairFn {
    /// The number of pair functions.
    pub const COUNT: usize = 28;

    /// All pair functions, ordered by [`PairFn::index`].
    pub const ALL: [Self; Self::COUNT] = {
        let mut all = [Self::new(Operator::Add, false, false); Self::COUNT];
        let mut index = 0;
        while index < Self::COUNT {
            all[index] = Self::nth(index);
            index += 1;
        }
        all
    };

    /// Create a pair function.
    #[inline]
    #[must_use]
    pub const fn new(op: Operator, not_left: bool, not_right: bool) -> Self {
        Self {
            op,
            not_left,
            not_right,
        }
    }

    /// Look up a function by its registry index.
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::nth(index))
        } else {
            None
        }
    }

    /// `index` must be below [`PairFn::COUNT`].
    const fn nth(index: usize) -> Self {
        let complement = index / Operator::ALL.len();
        Self::new(
            Operator::ALL[index % Operator::ALL.len()],
            complement & 1 != 0,
            complement & 2 != 0,
        )
    }

    /// Registry index.
    ///
    /// Complement combinations are the major order (none, left, right, both), operators the minor
    /// one.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        let complement = self.not_left as usize | (self.not_right as usize) << 1;
        complement * Operator::ALL.len() + self.op.index()
    }

    /// The operator.
    #[inline]
    #[must_use]
    pub const fn op(self) -> Operator {
        self.op
    }

    /// Whether the first byte is complemented.
    #[inline]
    #[must_use]
    pub const fn not_left(self) -> bool {
        self.not_left
    }

    /// Whether the second byte is complemented.
    #[inline]
    #[must_use]
    pub const fn not_right(self) -> bool {
        self.not_right
    }

    /// Evaluate on two bytes.
    #[inline]
    #[must_use]
    pub const fn eval(self, left: u8, right: u8) -> Option<i64> {
        let mut l = left as i64;
        let mut r = right as i64;
        if self.not_left {
            l = !l;
        }
        if self.not_right {
            r = !r;
        }
        self.op.apply(l, r)
    }

    /// The two bytes a pair function looks at.
    #[inline]
    #[must_use]
    pub fn operands(key: &[u8]) -> (u8, u8) {
        (
            key.first().copied().unwrap_or(0),
            key.get(1).copied().unwrap_or(0),
        )
    }
}

impl HashFunction for PairFn {
    #[inline]
    fn digest(&self, key: &[u8], _seed: u64) -> Option<i64> {
        let (left, right) = Self::operands(key);
        self.eval(left, right)
    }
}

impl fmt::Display for PairFn {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = |flag: bool| if flag { "~" } else { "" };
        write!(
            f,
            "{}({}l, {}r)",
            self.op.name(),
            not(self.not_left),
            not(self.not_right),
        )
    }
}

/// A fold over every byte of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum StringFn {
    /// `h = h * 33 + c`, written as `h += (h << 5) + c`
    Djb2,
    /// `h = h * 131 + c`
    Bkdr,
    /// `h = c + (h << 6) + (h << 16) - h`
    Sdbm,
}

impl StringFn {
    /// All string functions in registry order.
    pub const ALL: [Self; 3] = [Self::Djb2, Self::Bkdr, Self::Sdbm];

    /// Mask applied to the final accumulator.
    pub const MASK: u64 = 0x7fff_ffff;

    /// Position in [`StringFn::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Djb2 => 0,
            Self::Bkdr => 1,
            Self::Sdbm => 2,
        }
    }

    /// Short lowercase name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Djb2 => "djb2",
            Self::Bkdr => "bkdr",
            Self::Sdbm => "sdbm",
        }
    }

    /// The seed the function is usually presented with.
    #[inline]
    #[must_use]
    pub const fn classic_seed(self) -> u64 {
        match self {
            Self::Djb2 => 5381,
            Self::Bkdr | Self::Sdbm => 0,
        }
    }

    /// One step of the fold.
    ///
    /// Arithmetic wraps at 64 bits. Since only the low 31 bits survive [`StringFn::MASK`], the
    /// result is the same as with unbounded integers.
    #[inline]
    #[must_use]
    pub const fn step(self, h: u64, byte: u8) -> u64 {
        let c = byte as u64;
        match self {
            Self::Djb2 => h.wrapping_add(h.wrapping_shl(5)).wrapping_add(c),
            Self::Bkdr => h.wrapping_mul(131).wrapping_add(c),
            Self::Sdbm => c
                .wrapping_add(h.wrapping_shl(6))
                .wrapping_add(h.wrapping_shl(16))
                .wrapping_sub(h),
        }
    }

    /// Fold the key, starting from `seed`, and mask the accumulator.
    #[inline]
    #[must_use]
    pub fn fold(self, key: &[u8], seed: u64) -> u64 {
        key.iter().fold(seed, |h, &byte| self.step(h, byte)) & Self::MASK
    }
}

impl HashFunction for StringFn {
    #[inline]
    fn digest(&self, key: &[u8], seed: u64) -> Option<i64> {
        #[allow(clippy::cast_possible_wrap, reason = "masked to 31 bits")]
        Some(self.fold(key, seed) as i64)
    }

    #[inline]
    fn is_seeded(&self) -> bool {
        true
    }
}

impl fmt::Display for StringFn {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any member of the family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum HashFn {
    /// See [`PairFn`].
    Pair(PairFn),
    /// See [`StringFn`].
    String(StringFn),
}

impl HashFn {
    /// The number of functions in the family.
    pub const COUNT: usize = PairFn::COUNT + StringFn::ALL.len();

    /// Iterate through the whole family: pair functions first, then string functions.
    #[inline]
    pub fn family() -> impl Iterator<Item = Self> + Clone {
        Self::pairs().chain(Self::strings())
    }

    /// Iterate through pair functions.
    #[inline]
    pub fn pairs() -> impl Iterator<Item = Self> + Clone {
        PairFn::ALL.into_iter().map(Self::Pair)
    }

    /// Iterate through string functions.
    #[inline]
    pub fn strings() -> impl Iterator<Item = Self> + Clone {
        StringFn::ALL.into_iter().map(Self::String)
    }

    /// Stable identifier, the position in [`HashFn::family`].
    #[inline]
    #[must_use]
    pub const fn id(self) -> usize {
        match self {
            Self::Pair(pair) => pair.index(),
            Self::String(string) => PairFn::COUNT + string.index(),
        }
    }

    /// Look up a function by its identifier.
    #[inline]
    #[must_use]
    pub const fn from_id(id: usize) -> Option<Self> {
        if id < PairFn::COUNT {
            Some(Self::Pair(PairFn::nth(id)))
        } else if id < Self::COUNT {
            Some(Self::String(StringFn::ALL[id - PairFn::COUNT]))
        } else {
            None
        }
    }

    /// The arity class.
    #[inline]
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Pair(_) => Arity::Pair,
            Self::String(_) => Arity::String,
        }
    }
}

impl From<PairFn> for HashFn {
    #[inline]
    fn from(pair: PairFn) -> Self {
        Self::Pair(pair)
    }
}

impl From<StringFn> for HashFn {
    #[inline]
    fn from(string: StringFn) -> Self {
        Self::String(string)
    }
}

impl HashFunction for HashFn {
    #[inline]
    fn digest(&self, key: &[u8], seed: u64) -> Option<i64> {
        match self {
            Self::Pair(pair) => pair.digest(key, seed),
            Self::String(string) => string.digest(key, seed),
        }
    }

    #[inline]
    fn is_seeded(&self) -> bool {
        match self {
            Self::Pair(pair) => pair.is_seeded(),
            Self::String(string) => string.is_seeded(),
        }
    }
}

impl fmt::Display for HashFn {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pair(pair) => pair.fmt(f),
            Self::String(string) => string.fmt(f),
        }
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for Operator {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let operator = gen.path("kwhash::family::Operator");
        let variant = quote::format_ident!(
            "{}",
            match self {
                Self::Add => "Add",
                Self::Or => "Or",
                Self::Xor => "Xor",
                Self::And => "And",
                Self::Mul => "Mul",
                Self::Div => "Div",
                Self::Rem => "Rem",
            }
        );
        quote::quote!(#operator::#variant)
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for PairFn {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let pair_fn = gen.path("kwhash::family::PairFn");
        let op = gen.piece(&self.op);
        let not_left = gen.piece(&self.not_left);
        let not_right = gen.piece(&self.not_right);
        quote::quote!(#pair_fn::new(#op, #not_left, #not_right))
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for StringFn {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let string_fn = gen.path("kwhash::family::StringFn");
        let variant = quote::format_ident!(
            "{}",
            match self {
                Self::Djb2 => "Djb2",
                Self::Bkdr => "Bkdr",
                Self::Sdbm => "Sdbm",
            }
        );
        quote::quote!(#string_fn::#variant)
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for HashFn {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let hash_fn = gen.path("kwhash::family::HashFn");
        match self {
            Self::Pair(pair) => {
                let pair = gen.piece(pair);
                quote::quote!(#hash_fn::Pair(#pair))
            }
            Self::String(string) => {
                let string = gen.piece(string);
                quote::quote!(#hash_fn::String(#string))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order() {
        assert_eq!(PairFn::ALL.len(), 28);
        for (index, pair) in PairFn::ALL.into_iter().enumerate() {
            assert_eq!(pair.index(), index);
            assert_eq!(PairFn::from_index(index), Some(pair));
        }
        assert_eq!(PairFn::from_index(28), None);

        assert_eq!(PairFn::ALL[4], PairFn::new(Operator::Mul, false, false));
        assert_eq!(PairFn::ALL[9], PairFn::new(Operator::Xor, true, false));
        assert_eq!(PairFn::ALL[16], PairFn::new(Operator::Xor, false, true));
        assert_eq!(PairFn::ALL[27], PairFn::new(Operator::Rem, true, true));

        let ids: alloc::vec::Vec<usize> = HashFn::family().map(HashFn::id).collect();
        assert_eq!(ids, (0..HashFn::COUNT).collect::<alloc::vec::Vec<_>>());
        for id in 0..HashFn::COUNT {
            assert_eq!(HashFn::from_id(id).map(HashFn::id), Some(id));
        }
        assert_eq!(HashFn::from_id(HashFn::COUNT), None);
    }

    #[test]
    fn pair_arithmetic() {
        let xor = PairFn::new(Operator::Xor, false, false);
        assert_eq!(xor.digest(b"if", 0), Some(0x0f));
        assert_eq!(xor.digest(b"in", 0), Some(0x07));
        assert_eq!(xor.digest(b"is", 0), Some(0x1a));

        // Complement is two's complement NOT: `~x == -x - 1`.
        assert_eq!(PairFn::new(Operator::Add, true, false).eval(3, 5), Some(1));
        assert_eq!(PairFn::new(Operator::Add, true, true).eval(3, 5), Some(-10));

        let mul = PairFn::new(Operator::Mul, false, false);
        assert_eq!(mul.digest(b"**", 0), Some(234));
        assert_eq!(mul.digest(b">>", 0), Some(147));
        // Negative products still land in `0x80..=0xfe`.
        assert_eq!(PairFn::new(Operator::Mul, true, false).eval(2, 3), Some(0x80 | 246));
    }

    #[test]
    fn floor_semantics() {
        let div = |l, r| Operator::Div.apply(l, r);
        let rem = |l, r| Operator::Rem.apply(l, r);
        assert_eq!(div(7, 2), Some(3));
        assert_eq!(div(-7, 2), Some(-4));
        assert_eq!(div(7, -2), Some(-4));
        assert_eq!(div(-7, -2), Some(3));
        assert_eq!(rem(7, 2), Some(1));
        assert_eq!(rem(-7, 2), Some(1));
        assert_eq!(rem(7, -2), Some(-1));
        assert_eq!(rem(-7, -2), Some(-1));
        assert_eq!(div(7, 0), None);
        assert_eq!(rem(7, 0), None);
    }

    #[test]
    fn zero_operand_degenerates() {
        // Single-byte keys read a zero second operand.
        assert_eq!(PairFn::operands(b"x"), (b'x', 0));
        assert_eq!(PairFn::operands(b""), (0, 0));
        assert_eq!(PairFn::new(Operator::Div, false, false).digest(b"x", 0), None);
        assert_eq!(PairFn::new(Operator::Rem, false, false).digest(b"x", 0), None);
        // The complement of zero is -1, which is a valid divisor.
        assert_eq!(PairFn::new(Operator::Div, false, true).digest(b"x", 0), Some(-120));
    }

    #[test]
    fn string_folds() {
        assert_eq!(StringFn::Djb2.fold(b"", 5381), 5381);
        assert_eq!(StringFn::Djb2.fold(b"a", 5381), 5381 * 33 + 97);
        assert_eq!(StringFn::Bkdr.fold(b"ab", 0), 97 * 131 + 98);
        assert_eq!(StringFn::Sdbm.fold(b"a", 0), 97);
        assert_eq!(StringFn::Sdbm.fold(b"ab", 0), 98 + (97 << 6) + (97 << 16) - 97);

        // Large seeds wrap, but the low 31 bits match unbounded arithmetic.
        assert_eq!(StringFn::Bkdr.fold(b"while", 53), 1_229_888_456);
        assert!(StringFn::Djb2.fold(b"continue", u64::MAX) <= StringFn::MASK);
    }

    #[test]
    fn seeding() {
        assert!(!HashFn::Pair(PairFn::ALL[0]).is_seeded());
        assert!(HashFn::String(StringFn::Djb2).is_seeded());
        let djb2 = HashFn::String(StringFn::Djb2);
        assert_ne!(djb2.digest(b"if", 0), djb2.digest(b"if", 1));
    }

    #[test]
    fn display() {
        use alloc::string::ToString;
        assert_eq!(PairFn::new(Operator::Xor, false, true).to_string(), "xor(l, ~r)");
        assert_eq!(HashFn::String(StringFn::Sdbm).to_string(), "sdbm");
    }
}
