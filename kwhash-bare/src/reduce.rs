//! Digest reduction.
//!
//! A [`Reduction`] maps a raw digest to a bounded slot:
//!
//! ```text
//! slot = ((digest + offset) >> shift) & (2^bits - 1) [| 2^(bits - 1)]
//! slot = ((digest + offset) >> shift) mod m
//! ```
//!
//! The addition wraps and the shift is arithmetic, so negative digests (which complemented pair
//! functions produce) reduce the same way two's complement hardware would. Reduction is total:
//! every digest maps to some slot, even for parameters that fail validation.

use core::fmt;

/// The set of slots a reduction maps into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum SlotRange {
    /// Keep the low `bits` bits, `1..=64`.
    Bits(u32),
    /// Euclidean remainder modulo a non-zero number.
    Modulo(u64),
}

/// Reduction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ReductionInner"))]
pub struct Reduction {
    /// Right shift applied after the offset.
    shift: u32,
    /// Added to the digest before anything else.
    offset: i64,
    /// Final range.
    range: SlotRange,
    /// Whether the top bit of the range is forced on.
    tagged: bool,
}

/// Unvalidated [`Reduction`], for deserialization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ReductionInner {
    /// See [`Reduction::shift`].
    #[serde(default)]
    shift: u32,
    /// See [`Reduction::offset`].
    #[serde(default)]
    offset: i64,
    /// See [`Reduction::range`].
    range: SlotRange,
    /// See [`Reduction::is_tagged`].
    #[serde(default)]
    tagged: bool,
}

impl Reduction {
    /// Keep the low `bits` bits of the digest.
    #[inline]
    #[must_use]
    pub const fn bits(bits: u32) -> Self {
        Self {
            shift: 0,
            offset: 0,
            range: SlotRange::Bits(bits),
            tagged: false,
        }
    }

    /// Take the digest modulo `modulus`.
    #[inline]
    #[must_use]
    pub const fn modulo(modulus: u64) -> Self {
        Self {
            shift: 0,
            offset: 0,
            range: SlotRange::Modulo(modulus),
            tagged: false,
        }
    }

    /// Shift the digest right before masking.
    #[inline]
    #[must_use]
    pub const fn with_shift(mut self, shift: u32) -> Self {
        self.shift = shift;
        self
    }

    /// Add a constant to the digest first.
    #[inline]
    #[must_use]
    pub const fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Force the top bit of a [`SlotRange::Bits`] range on.
    ///
    /// Tagged slots of an 8-bit range fall in `0x80..=0xff`, which keeps them apart from ASCII.
    #[inline]
    #[must_use]
    pub const fn tagged(mut self) -> Self {
        self.tagged = true;
        self
    }

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn __from_raw_parts(shift: u32, offset: i64, range: SlotRange, tagged: bool) -> Self {
        Self {
            shift,
            offset,
            range,
            tagged,
        }
    }

    /// The shift.
    #[inline]
    #[must_use]
    pub const fn shift(&self) -> u32 {
        self.shift
    }

    /// The offset.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    /// The range.
    #[inline]
    #[must_use]
    pub const fn range(&self) -> SlotRange {
        self.range
    }

    /// Whether the top bit is forced on.
    #[inline]
    #[must_use]
    pub const fn is_tagged(&self) -> bool {
        self.tagged
    }

    /// Width in bits of a [`SlotRange::Bits`] range, or the number of bits needed to store any
    /// slot of a [`SlotRange::Modulo`] range.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        match self.range {
            SlotRange::Bits(bits) => clamp_bits(bits),
            SlotRange::Modulo(modulus) => u64::BITS - modulus.saturating_sub(1).leading_zeros(),
        }
    }

    /// Map a digest to its slot.
    #[inline]
    #[must_use]
    pub const fn reduce(&self, digest: i64) -> u64 {
        let value = digest.wrapping_add(self.offset);
        let value = if self.shift >= i64::BITS {
            if value < 0 {
                -1
            } else {
                0
            }
        } else {
            value >> self.shift
        };
        match self.range {
            SlotRange::Bits(bits) => {
                let bits = clamp_bits(bits);
                #[allow(clippy::cast_sign_loss, reason = "two's complement masking")]
                let mut slot = value as u64 & mask(bits);
                if self.tagged && bits > 0 {
                    slot |= 1 << (bits - 1);
                }
                slot
            }
            SlotRange::Modulo(modulus) => {
                match (value as i128).checked_rem_euclid(modulus as i128) {
                    #[allow(
                        clippy::cast_possible_truncation,
                        clippy::cast_sign_loss,
                        reason = "below modulus"
                    )]
                    Some(slot) => slot as u64,
                    None => 0,
                }
            }
        }
    }

    /// The number of distinct slots the reduction can produce.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u128 {
        match self.range {
            SlotRange::Bits(bits) => {
                let bits = clamp_bits(bits);
                if self.tagged && bits > 0 {
                    1 << (bits - 1)
                } else {
                    1 << bits
                }
            }
            SlotRange::Modulo(modulus) => modulus as u128,
        }
    }

    /// Exclusive upper bound on the slots.
    #[inline]
    #[must_use]
    pub const fn bound(&self) -> u128 {
        match self.range {
            SlotRange::Bits(bits) => 1 << clamp_bits(bits),
            SlotRange::Modulo(modulus) => modulus as u128,
        }
    }

    /// The smallest bit width whose untagged range fits `keys` distinct slots.
    #[inline]
    #[must_use]
    pub const fn minimal_bits(keys: usize) -> u32 {
        if keys <= 2 {
            1
        } else {
            usize::BITS - (keys - 1).leading_zeros()
        }
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Fails if the width is outside `1..=64`, the shift is 64 or more, the modulus is zero, or a
    /// modulo range is tagged.
    #[cfg(any(feature = "build", feature = "serde"))]
    #[inline]
    pub const fn validate(&self) -> Result<(), InvalidReduction> {
        if self.shift >= i64::BITS {
            return Err(InvalidReduction::Shift(self.shift));
        }
        match self.range {
            SlotRange::Bits(bits) if bits == 0 || bits > u64::BITS => {
                Err(InvalidReduction::Width(bits))
            }
            SlotRange::Bits(_) => Ok(()),
            SlotRange::Modulo(0) => Err(InvalidReduction::ZeroModulus),
            SlotRange::Modulo(_) if self.tagged => Err(InvalidReduction::TaggedModulo),
            SlotRange::Modulo(_) => Ok(()),
        }
    }
}

/// Widths above 64 behave like 64.
const fn clamp_bits(bits: u32) -> u32 {
    if bits > u64::BITS {
        u64::BITS
    } else {
        bits
    }
}

/// `2^bits - 1`, for `bits <= 64`.
const fn mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

impl Default for Reduction {
    #[inline]
    fn default() -> Self {
        Self::bits(8)
    }
}

impl fmt::Display for Reduction {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset == 0 {
            f.write_str("h")?;
        } else {
            write!(f, "(h + {})", self.offset)?;
        }
        if self.shift != 0 {
            write!(f, " >> {}", self.shift)?;
        }
        match self.range {
            SlotRange::Bits(bits) => {
                write!(f, " & {:#x}", mask(clamp_bits(bits)))?;
                if self.tagged && bits > 0 {
                    write!(f, " | {:#x}", 1_u64 << (clamp_bits(bits) - 1))?;
                }
                Ok(())
            }
            SlotRange::Modulo(modulus) => write!(f, " mod {modulus}"),
        }
    }
}

/// Invalid reduction parameters.
#[cfg(any(feature = "build", feature = "serde"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, displaydoc::Display, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidReduction {
    /// slot width {0} is outside 1..=64 bits
    Width(u32),

    /// shift {0} is 64 or more
    Shift(u32),

    /// modulus is zero
    ZeroModulus,

    /// only power-of-two ranges can be tagged
    TaggedModulo,
}

#[cfg(feature = "serde")]
impl TryFrom<ReductionInner> for Reduction {
    type Error = InvalidReduction;

    #[inline]
    fn try_from(inner: ReductionInner) -> Result<Self, InvalidReduction> {
        let reduction = Self {
            shift: inner.shift,
            offset: inner.offset,
            range: inner.range,
            tagged: inner.tagged,
        };
        reduction.validate()?;
        Ok(reduction)
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for SlotRange {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        match self {
            Self::Bits(bits) => {
                let variant = gen.path("kwhash::reduce::SlotRange::Bits");
                let bits = gen.piece(bits);
                quote::quote!(#variant(#bits))
            }
            Self::Modulo(modulus) => {
                let variant = gen.path("kwhash::reduce::SlotRange::Modulo");
                let modulus = gen.piece(modulus);
                quote::quote!(#variant(#modulus))
            }
        }
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for Reduction {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let reduction = gen.path("kwhash::Reduction");
        let shift = gen.piece(&self.shift);
        let offset = gen.piece(&self.offset);
        let range = gen.piece(&self.range);
        let tagged = gen.piece(&self.tagged);
        quote::quote!(#reduction::__from_raw_parts(#shift, #offset, #range, #tagged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mask_and_shift() {
        let r = Reduction::bits(8);
        assert_eq!(r.reduce(0x1234), 0x34);
        assert_eq!(r.reduce(-1), 0xff);
        assert_eq!(r.reduce(-256), 0);

        let r = Reduction::bits(8).with_shift(8);
        assert_eq!(r.reduce(0x1234), 0x12);
        // Arithmetic shift keeps the sign.
        assert_eq!(r.reduce(-1), 0xff);

        let r = Reduction::bits(4).with_offset(3);
        assert_eq!(r.reduce(14), 1);
        assert_eq!(Reduction::bits(64).reduce(-2), u64::MAX - 1);
        assert_eq!(Reduction::bits(8).with_offset(1).reduce(i64::MAX), 0);
    }

    #[test]
    fn tag() {
        let r = Reduction::bits(8).tagged();
        assert_eq!(r.reduce(0), 0x80);
        assert_eq!(r.reduce(0x7f), 0xff);
        assert_eq!(r.reduce(0x85), 0x85);
        assert_eq!(r.capacity(), 128);
        assert_eq!(r.bound(), 256);

        // Any width can be tagged.
        let r = Reduction::bits(3).tagged();
        assert_eq!(r.reduce(1), 0b101);
        assert_eq!(Reduction::bits(1).tagged().reduce(0), 1);
        assert_eq!(Reduction::bits(64).tagged().reduce(0), 1 << 63);
    }

    #[test]
    fn modulo() {
        let r = Reduction::modulo(7);
        assert_eq!(r.reduce(15), 1);
        assert_eq!(r.reduce(-1), 6);
        assert_eq!(r.reduce(i64::MIN), (i128::from(i64::MIN)).rem_euclid(7) as u64);
        assert_eq!(r.capacity(), 7);
        assert_eq!(r.width(), 3);
        assert_eq!(Reduction::modulo(8).width(), 3);
        assert_eq!(Reduction::modulo(1).width(), 0);
        assert_eq!(Reduction::modulo(0).reduce(5), 0);
    }

    #[test]
    fn minimal_bits() {
        assert_eq!(Reduction::minimal_bits(0), 1);
        assert_eq!(Reduction::minimal_bits(2), 1);
        assert_eq!(Reduction::minimal_bits(3), 2);
        assert_eq!(Reduction::minimal_bits(4), 2);
        assert_eq!(Reduction::minimal_bits(13), 4);
        assert_eq!(Reduction::minimal_bits(36), 6);
        assert_eq!(Reduction::minimal_bits(256), 8);
        assert_eq!(Reduction::minimal_bits(257), 9);
    }

    #[cfg(feature = "build")]
    #[test]
    fn validation() {
        assert_eq!(Reduction::bits(8).validate(), Ok(()));
        assert_eq!(Reduction::bits(0).validate(), Err(InvalidReduction::Width(0)));
        assert_eq!(Reduction::bits(65).validate(), Err(InvalidReduction::Width(65)));
        assert_eq!(
            Reduction::bits(8).with_shift(64).validate(),
            Err(InvalidReduction::Shift(64)),
        );
        assert_eq!(Reduction::modulo(0).validate(), Err(InvalidReduction::ZeroModulus));
        assert_eq!(
            Reduction::modulo(5).tagged().validate(),
            Err(InvalidReduction::TaggedModulo),
        );
    }

    #[test]
    fn display() {
        use alloc::string::ToString;
        assert_eq!(Reduction::bits(8).to_string(), "h & 0xff");
        assert_eq!(
            Reduction::bits(8).with_shift(8).tagged().to_string(),
            "h >> 8 & 0xff | 0x80",
        );
        assert_eq!(Reduction::modulo(37).with_offset(-3).to_string(), "(h + -3) mod 37");
    }

    proptest! {
        #[test]
        fn total(digest: i64, shift in 0..100_u32, offset: i64, bits in 0..80_u32, tagged: bool) {
            let mut r = Reduction::bits(bits).with_shift(shift).with_offset(offset);
            if tagged {
                r = r.tagged();
            }
            let slot = r.reduce(digest);
            prop_assert!(u128::from(slot) < r.bound());
            if tagged && bits > 0 {
                prop_assert!(u128::from(slot) >= r.bound() / 2);
            }
        }

        #[test]
        fn modulo_total(digest: i64, modulus in 1..u64::MAX) {
            prop_assert!(Reduction::modulo(modulus).reduce(digest) < modulus);
        }
    }
}
