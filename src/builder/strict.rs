//! Builder type implemented as a newtype around a bit-vector
//!
//! StrictBuilder is named after Haskell's `Data.ByteString.Strict`.

use bitvec::field::BitField;
use bitvec::prelude::{BitSlice, BitVec, Msb0};

use crate::conv::target::Target;
use crate::variant::Variant;

/// Growable MSB-first bit-buffer to use as Builder
///
/// Most of the methods on `StrictBuilder` are implemented directly on the
/// underlying `BitVec` and are not explicitly documented due to how trivial
/// they are.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct StrictBuilder {
    bits: BitVec<u8, Msb0>,
    variant: Variant,
}

impl StrictBuilder {
    /// Returns a view of the bits written so far, without any trailing padding
    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        self.bits.as_bitslice()
    }
}

impl From<StrictBuilder> for Vec<u8> {
    fn from(val: StrictBuilder) -> Self {
        <StrictBuilder as super::Builder>::finalize(val)
    }
}

impl From<Vec<u8>> for StrictBuilder {
    fn from(buf: Vec<u8>) -> StrictBuilder {
        StrictBuilder {
            bits: BitVec::from_vec(buf),
            variant: Variant::Aligned,
        }
    }
}

impl From<&[u8]> for StrictBuilder {
    fn from(buf: &[u8]) -> StrictBuilder {
        StrictBuilder {
            bits: BitVec::from_slice(buf),
            variant: Variant::Aligned,
        }
    }
}

impl Target for StrictBuilder {
    /// Reserves capacity for `extra_bits` more bits in the inner vector
    fn anticipate(&mut self, extra_bits: usize) {
        self.bits.reserve(extra_bits)
    }

    fn create_with(variant: Variant) -> Self {
        Self {
            bits: BitVec::new(),
            variant,
        }
    }

    fn variant(&self) -> Variant {
        self.variant
    }

    fn bit_len(&self) -> usize {
        self.bits.len()
    }

    fn push_bit(&mut self, bit: bool) -> usize {
        self.bits.push(bit);
        1
    }

    fn push_bits(&mut self, val: u64, nbits: usize) -> usize {
        debug_assert!(nbits <= 64, "cannot push {} bits from a u64", nbits);
        if nbits == 0 {
            return 0;
        }
        let start = self.bits.len();
        self.bits.resize(start + nbits, false);
        self.bits[start..].store_be::<u64>(val);
        nbits
    }

    /// Appends whole octets via `BitVec::extend_from_raw_slice`
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.bits.extend_from_raw_slice(buf);
        buf.len() * 8
    }

    fn push_bitslice(&mut self, bits: &BitSlice<u8, Msb0>) -> usize {
        self.bits.extend_from_bitslice(bits);
        bits.len()
    }
}

impl super::Builder for StrictBuilder {
    /// In order to distinguish between finalized and non-finalized
    /// `StrictBuilders`, `Final := Vec<u8>` is used over `Final := Self`
    type Final = Vec<u8>;

    fn finalize(mut self) -> Self::Final {
        if self.bits.is_empty() {
            return vec![0x00];
        }
        self.align();
        self.bits.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn bits_and_padding() {
        let mut b = StrictBuilder::create();
        b.push_bit(true);
        b.push_bits(0b011, 3);
        assert_eq!(b.len(), 4);
        assert_eq!(b.into_vec(), vec![0b1011_0000]);
    }

    #[test]
    fn unaligned_octets() {
        let mut b = StrictBuilder::create_with(Variant::Unaligned);
        b.push_bit(false);
        b.push_all(&[0xff, 0x01]);
        assert_eq!(b.len(), 17);
        assert_eq!(b.into_hex(), "7f8080");
    }

    #[test]
    fn empty_is_one_octet() {
        assert_eq!(StrictBuilder::empty().into_vec(), vec![0x00]);
    }

    #[test]
    fn wide_push() {
        let mut b = StrictBuilder::create();
        b.push_bits(u64::MAX, 64);
        b.push_bits(0x5, 4);
        assert_eq!(b.into_hex(), "ffffffffffffffff50");
    }
}
