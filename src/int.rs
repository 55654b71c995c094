//! Constrained, semi-constrained and unconstrained whole numbers
//!
//! This module implements the integer encodings of X.691 §10.5 through §10.8,
//! together with [`RangedInt`], the typed wrapper used to model `INTEGER`
//! types with a value-range constraint (with or without an extension marker).
//!
//! The width of a constrained whole number depends only on the size of its
//! range `R = ub - lb + 1`:
//!
//! | `R` | UNALIGNED | ALIGNED |
//! |---|---|---|
//! | `1` | 0 bits | 0 bits |
//! | `2..=255` | `ceil(log2 R)` bits | `ceil(log2 R)` bits |
//! | `256` | 8 bits | octet-aligned octet |
//! | `257..=65536` | `ceil(log2 R)` bits | two octet-aligned octets |
//! | `> 65536` | `ceil(log2 R)` bits | octet-count, then octet-aligned octets |

use std::fmt::Display;

use crate::conv::{target::Target, Decode, Encode};
use crate::error::{BoundsError, EncodeError, EncodeResult, LengthError};
use crate::length::{pack_unconstrained_length, unpack_unconstrained_length};
use crate::parse::{ParseResult, Parser};
use crate::util::{bits_needed, octets_needed};

/// Number of distinct values in `lb..=ub`, which may be as large as `2^64`.
#[inline]
pub(crate) fn range_of(lb: i64, ub: i64) -> u128 {
    (i128::from(ub) - i128::from(lb) + 1) as u128
}

/// Writes `offset`, the distance of a value from the lower bound, as a
/// constrained whole number over a range of `range` distinct values.
///
/// The caller guarantees that `offset < range`.
pub fn pack_constrained_offset<U: Target>(buf: &mut U, offset: u64, range: u128) -> usize {
    debug_assert!(u128::from(offset) < range.max(1));
    if range <= 1 {
        return 0;
    }
    if !buf.aligned() || range < 256 {
        return buf.push_bits(offset, bits_needed(range));
    }
    if range == 256 {
        return buf.align() + buf.push_bits(offset, 8);
    }
    if range <= 65536 {
        return buf.align() + buf.push_bits(offset, 16);
    }
    // indefinite-length case: octet count as a constrained whole number, then the octets
    let max_octets = octets_needed((range - 1) as u64);
    let n_octets = octets_needed(offset);
    let len_bits = buf.push_bits((n_octets - 1) as u64, bits_needed(max_octets as u128));
    len_bits + buf.align() + buf.push_bits(offset, n_octets * 8)
}

/// Reads a constrained whole number over a range of `range` distinct values,
/// returning its offset from the lower bound.
///
/// The offset is not checked against `range`; see [`unpack_constrained_whole_number`].
pub fn unpack_constrained_offset<P: Parser>(p: &mut P, range: u128) -> ParseResult<u64> {
    if range <= 1 {
        return Ok(0);
    }
    if !p.aligned() || range < 256 {
        return p.consume_bits(bits_needed(range));
    }
    if range == 256 {
        p.align()?;
        return p.consume_bits(8);
    }
    if range <= 65536 {
        p.align()?;
        return p.consume_bits(16);
    }
    let max_octets = octets_needed((range - 1) as u64);
    let n_octets = p.consume_bits(bits_needed(max_octets as u128))? as usize + 1;
    p.align()?;
    p.consume_bits(n_octets * 8)
}

/// Writes `val` as a constrained whole number in `lb..=ub`.
///
/// # Errors
///
/// Returns [`EncodeError::IntRangeViolation`] if `val` lies outside of the range,
/// in which case nothing is written.
pub fn pack_constrained_whole_number<U: Target>(
    buf: &mut U,
    val: i64,
    lb: i64,
    ub: i64,
) -> EncodeResult<usize> {
    BoundsError::restrict(val, lb, ub)?;
    let offset = (i128::from(val) - i128::from(lb)) as u64;
    Ok(pack_constrained_offset(buf, offset, range_of(lb, ub)))
}

/// Reads a constrained whole number in `lb..=ub`.
///
/// # Errors
///
/// Fails with a range violation if the decoded offset does not correspond to
/// a value in `lb..=ub`, which is possible whenever the range is not a power of two.
pub fn unpack_constrained_whole_number<P: Parser>(p: &mut P, lb: i64, ub: i64) -> ParseResult<i64> {
    let offset = unpack_constrained_offset(p, range_of(lb, ub))?;
    let val = i128::from(lb) + i128::from(offset);
    if val > i128::from(ub) {
        tracing::error!("Decoded value {} exceeds the upper bound {}", val, ub);
        return Err(BoundsError::Overflow { max: ub, val: i64::try_from(val).unwrap_or(i64::MAX) }.into());
    }
    Ok(val as i64)
}

/// Minimal two's-complement big-endian octets of `val` (X.691 §10.4)
fn twos_complement_octets(val: i64) -> Vec<u8> {
    let bytes = val.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xff => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Writes `val` as an unconstrained whole number: an unconstrained length
/// determinant followed by the minimal two's-complement octets of `val`.
pub fn pack_unconstrained_whole_number<U: Target>(buf: &mut U, val: i64) -> EncodeResult<usize> {
    let octets = twos_complement_octets(val);
    Ok(pack_unconstrained_length(buf, octets.len())? + buf.push_all(&octets))
}

/// Reads an unconstrained whole number that fits into an `i64`.
pub fn unpack_unconstrained_whole_number<P: Parser>(p: &mut P) -> ParseResult<i64> {
    let len = unpack_unconstrained_length(p)?;
    LengthError::check(len, 1, 8)?;
    let octets = p.consume_octets(len)?;
    let mut bytes = if octets[0] & 0x80 != 0 { [0xff; 8] } else { [0x00; 8] };
    bytes[8 - len..].copy_from_slice(&octets);
    Ok(i64::from_be_bytes(bytes))
}

/// Writes `val` as a semi-constrained whole number with lower bound `lb`:
/// an unconstrained length determinant followed by the minimal unsigned
/// octets of `val - lb`.
pub fn pack_semi_constrained_whole_number<U: Target>(buf: &mut U, val: u64, lb: u64) -> EncodeResult<usize> {
    if val < lb {
        return Err(BoundsError::Underflow {
            min: i64::try_from(lb).unwrap_or(i64::MAX),
            val: i64::try_from(val).unwrap_or(i64::MAX),
        }
        .into());
    }
    let offset = val - lb;
    let n_octets = octets_needed(offset);
    Ok(pack_unconstrained_length(buf, n_octets)? + buf.push_bits(offset, n_octets * 8))
}

/// Reads a semi-constrained whole number with lower bound `lb`.
pub fn unpack_semi_constrained_whole_number<P: Parser>(p: &mut P, lb: u64) -> ParseResult<u64> {
    let len = unpack_unconstrained_length(p)?;
    LengthError::check(len, 1, 8)?;
    let offset = p.consume_bits(len * 8)?;
    offset.checked_add(lb).ok_or_else(|| {
        BoundsError::<i64>::Overflow {
            max: i64::MAX,
            val: i64::MAX,
        }
        .into()
    })
}

/// Writes an `INTEGER (lb..ub)` value, or `INTEGER (lb..ub, ...)` if `has_ext` is set.
///
/// With an extension marker, a leading bit records whether the value lies in the
/// root range; values outside of it are written as unconstrained whole numbers.
///
/// # Errors
///
/// Without an extension marker, a value outside of `lb..=ub` cannot be
/// represented and [`EncodeError::IntRangeViolation`] is returned.
pub fn pack_integer<U: Target>(
    buf: &mut U,
    val: i64,
    lb: i64,
    ub: i64,
    has_ext: bool,
) -> EncodeResult<usize> {
    let within = lb <= val && val <= ub;
    if has_ext {
        let ext = buf.push_bit(!within);
        if within {
            Ok(ext + pack_constrained_whole_number(buf, val, lb, ub)?)
        } else {
            Ok(ext + pack_unconstrained_whole_number(buf, val)?)
        }
    } else if within {
        pack_constrained_whole_number(buf, val, lb, ub)
    } else {
        tracing::error!("The provided integer {} is not within bounds [{}, {}]", val, lb, ub);
        let err = if val < lb {
            BoundsError::Underflow { min: lb, val }
        } else {
            BoundsError::Overflow { max: ub, val }
        };
        Err(EncodeError::from(err))
    }
}

/// Reads an `INTEGER (lb..ub)` value, or `INTEGER (lb..ub, ...)` if `has_ext` is set.
pub fn unpack_integer<P: Parser>(p: &mut P, lb: i64, ub: i64, has_ext: bool) -> ParseResult<i64> {
    if has_ext && p.consume_bit()? {
        return unpack_unconstrained_whole_number(p);
    }
    unpack_constrained_whole_number(p, lb, ub)
}

/// `INTEGER (MIN..MAX)`, or `INTEGER (MIN..MAX, ...)` when `EXT` is set
///
/// Values of an extensible type are not restricted to the root range, and
/// those outside of it are carried through the extension path of
/// [`pack_integer`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[repr(transparent)]
pub struct RangedInt<const MIN: i64, const MAX: i64, const EXT: bool = false>(i64);

impl<const MIN: i64, const MAX: i64, const EXT: bool> RangedInt<MIN, MAX, EXT> {
    pub const MIN: i64 = MIN;
    pub const MAX: i64 = MAX;
    pub const EXTENSIBLE: bool = EXT;

    /// Constructs a `RangedInt` from a value known to be valid.
    ///
    /// # Panics
    ///
    /// Panics if the type is not extensible and `val` lies outside of `MIN..=MAX`.
    #[must_use]
    pub fn new(val: i64) -> Self {
        match Self::try_new(val) {
            Ok(ret) => ret,
            Err(err) => panic!("RangedInt::new: {}", err),
        }
    }

    /// Attempts to construct a `RangedInt`, failing if the type is not extensible
    /// and `val` lies outside of `MIN..=MAX`.
    pub fn try_new(val: i64) -> Result<Self, BoundsError<i64>> {
        if EXT {
            if MIN > MAX {
                return Err(BoundsError::InvalidBounds { min: MIN, max: MAX });
            }
            Ok(Self(val))
        } else {
            Ok(Self(BoundsError::restrict(val, MIN, MAX)?))
        }
    }

    #[inline]
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns `true` if the value lies within the root range `MIN..=MAX`
    #[inline]
    #[must_use]
    pub const fn in_root(&self) -> bool {
        MIN <= self.0 && self.0 <= MAX
    }
}

impl<const MIN: i64, const MAX: i64, const EXT: bool> From<RangedInt<MIN, MAX, EXT>> for i64 {
    fn from(val: RangedInt<MIN, MAX, EXT>) -> Self {
        val.0
    }
}

impl<const MIN: i64, const MAX: i64, const EXT: bool> TryFrom<i64> for RangedInt<MIN, MAX, EXT> {
    type Error = BoundsError<i64>;

    fn try_from(val: i64) -> Result<Self, Self::Error> {
        Self::try_new(val)
    }
}

impl<const MIN: i64, const MAX: i64, const EXT: bool> Display for RangedInt<MIN, MAX, EXT> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<const MIN: i64, const MAX: i64, const EXT: bool> Encode for RangedInt<MIN, MAX, EXT> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        Ok(pack_integer(buf, self.0, MIN, MAX, EXT)? + crate::resolve_zero!(buf))
    }
}

impl<const MIN: i64, const MAX: i64, const EXT: bool> Decode for RangedInt<MIN, MAX, EXT> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self(unpack_integer(p, MIN, MAX, EXT)?))
    }
}

/// Encodes the unsigned machine integers as `INTEGER (0..2^N-1)`
macro_rules! unsigned_impls {
    ( $( $t:ty ),+ $(,)? ) => {
        $(
            impl Encode for $t {
                fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
                    Ok(pack_integer(buf, i64::from(*self), 0, i64::from(<$t>::MAX), false)? + crate::resolve_zero!(buf))
                }
            }

            impl Decode for $t {
                fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                    let val = unpack_integer(p, 0, i64::from(<$t>::MAX), false)?;
                    Ok(<$t>::try_from(val).map_err(BoundsError::<i64>::from)?)
                }
            }
        )+
    };
}

unsigned_impls!(u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{strict::StrictBuilder, Builder};
    use crate::parse::{bitparser::BitParser, TryIntoParser};
    use crate::variant::Variant;

    fn packed(f: impl FnOnce(&mut StrictBuilder) -> EncodeResult<usize>, variant: Variant) -> (usize, String) {
        let mut buf = StrictBuilder::create_with(variant);
        let n = f(&mut buf).unwrap();
        (n, buf.into_hex())
    }

    #[test]
    fn aligned_widths() {
        let aligned = Variant::Aligned;
        assert_eq!(packed(|b| pack_integer(b, 5, 5, 5, false), aligned).0, 0);
        assert_eq!(packed(|b| pack_integer(b, 5, 0, 7, false), aligned), (3, "a0".into()));
        assert_eq!(packed(|b| pack_integer(b, 2, 0, 2, false), aligned), (2, "80".into()));
        assert_eq!(packed(|b| pack_integer(b, 0x42, 0, 255, false), aligned), (8, "42".into()));
        assert_eq!(packed(|b| pack_integer(b, 0x1234, 0, 65535, false), aligned), (16, "1234".into()));
        assert_eq!(packed(|b| pack_integer(b, 1, 0, 4294967295, false), aligned), (16, "0001".into()));
        assert_eq!(
            packed(|b| pack_integer(b, 0x12345678, 0, 4294967295, false), aligned),
            (40, "c012345678".into())
        );
    }

    #[test]
    fn alignment_is_relative_to_stream() {
        let mut buf = StrictBuilder::create();
        buf.push_bit(true);
        assert_eq!(pack_integer(&mut buf, 0x42, 0, 255, false).unwrap(), 15);
        assert_eq!(buf.into_hex(), "8042");
    }

    #[test]
    fn unaligned_widths() {
        let unaligned = Variant::Unaligned;
        assert_eq!(packed(|b| pack_integer(b, 0x42, 0, 255, false), unaligned), (8, "42".into()));
        assert_eq!(packed(|b| pack_integer(b, 300, 0, 1000, false), unaligned), (10, "4b00".into()));
        assert_eq!(packed(|b| pack_integer(b, 1, 0, 4294967295, false), unaligned), (32, "00000001".into()));
    }

    #[test]
    fn wide_range() {
        const UB: i64 = 68719476735;
        let (n, hex) = packed(|b| pack_integer(b, UB, 0, UB, false), Variant::Aligned);
        // 3-bit octet count (4), padding, five octets
        assert_eq!(n, 48);
        assert_eq!(hex, "800fffffffff");
        let mut p: BitParser = crate::util::bytes_of_hex(&hex).unwrap().try_into_parser().unwrap();
        assert_eq!(unpack_integer(&mut p, 0, UB, false).unwrap(), UB);
        assert_eq!(packed(|b| pack_integer(b, UB, 0, UB, false), Variant::Unaligned).0, 36);
    }

    #[test]
    fn extension_path() {
        let aligned = Variant::Aligned;
        assert_eq!(packed(|b| pack_integer(b, 256, 1, 256, true), aligned), (9 + 7, "00ff".into()));
        assert_eq!(packed(|b| pack_integer(b, 257, 1, 256, true), aligned), (32, "80020101".into()));
        assert_eq!(packed(|b| pack_integer(b, -1, 0, 7, true), aligned), (24, "8001ff".into()));

        let mut p: BitParser = [0x80u8, 0x02, 0x01, 0x01].try_into_parser().unwrap();
        assert_eq!(unpack_integer(&mut p, 1, 256, true).unwrap(), 257);
        let mut p: BitParser = [0x80u8, 0x01, 0xff].try_into_parser().unwrap();
        assert_eq!(unpack_integer(&mut p, 0, 7, true).unwrap(), -1);
    }

    #[test]
    fn out_of_range() {
        let mut buf = StrictBuilder::create();
        assert_eq!(
            pack_integer(&mut buf, 257, 1, 256, false),
            Err(EncodeError::IntRangeViolation(BoundsError::Overflow { max: 256, val: 257 }))
        );
        assert_eq!(buf.bit_len(), 0);

        // offset 7 in a range of 5 values
        let mut p: BitParser = [0b1110_0000u8].try_into_parser().unwrap();
        assert!(unpack_integer(&mut p, 0, 4, false).is_err());
    }

    #[test]
    fn ranged_int() {
        assert!(RangedInt::<1, 256>::try_new(257).is_err());
        assert!(RangedInt::<1, 256, true>::try_new(257).is_ok());
        let x: RangedInt<1, 256, true> = RangedInt::new(257);
        assert!(!x.in_root());
        let bytes = x.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x80, 0x02, 0x01, 0x01]);
        assert_eq!(RangedInt::<1, 256, true>::decode(bytes), x);
        assert_eq!(u32::decode([0x00u8, 0x07]), 7);
        assert_eq!(7u32.to_bytes().unwrap(), vec![0x00, 0x07]);
    }

    #[test]
    #[should_panic]
    fn ranged_int_new_panics() {
        let _ = RangedInt::<0, 7>::new(8);
    }

    #[test]
    fn semi_constrained() {
        let (n, hex) = packed(|b| pack_semi_constrained_whole_number(b, 300, 0), Variant::Aligned);
        assert_eq!((n, hex.as_str()), (24, "02012c"));
        let mut p: BitParser = [0x02u8, 0x01, 0x2c].try_into_parser().unwrap();
        assert_eq!(unpack_semi_constrained_whole_number(&mut p, 0).unwrap(), 300);
    }

    #[test]
    fn semi_constrained_underflow_saturates() {
        let mut buf = StrictBuilder::create();
        let err = pack_semi_constrained_whole_number(&mut buf, u64::MAX - 1, u64::MAX).unwrap_err();
        assert_eq!(
            err,
            EncodeError::IntRangeViolation(BoundsError::Underflow {
                min: i64::MAX,
                val: i64::MAX,
            })
        );
        let err = pack_semi_constrained_whole_number(&mut buf, 3, 5).unwrap_err();
        assert_eq!(err, EncodeError::IntRangeViolation(BoundsError::Underflow { min: 5, val: 3 }));
        assert_eq!(buf.bit_len(), 0);
    }

    #[test]
    fn twos_complement() {
        assert_eq!(twos_complement_octets(0), vec![0x00]);
        assert_eq!(twos_complement_octets(127), vec![0x7f]);
        assert_eq!(twos_complement_octets(128), vec![0x00, 0x80]);
        assert_eq!(twos_complement_octets(-128), vec![0x80]);
        assert_eq!(twos_complement_octets(-129), vec![0xff, 0x7f]);
        assert_eq!(twos_complement_octets(i64::MIN).len(), 8);
    }
}
