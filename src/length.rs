//! Length determinants and normally-small numbers
//!
//! A length determinant precedes every variable-size field: the element count
//! of a `SEQUENCE OF`, the octet count of an open type or `OCTET STRING`, and
//! the IE count of a protocol-IE container. When the upper bound of the size
//! constraint is below 64K, the length is a constrained whole number over the
//! permitted sizes; otherwise it takes the unconstrained form (X.691 §10.9):
//!
//! * `0nnnnnnn` for lengths below 128
//! * `10nnnnnn nnnnnnnn` for lengths below 16384
//! * `11xxxxxx` for fragments of 16K units, which this library never emits
//!   and rejects on decode.
//!
//! In the ALIGNED variant, the unconstrained form is preceded by padding to
//! an octet boundary.

use crate::conv::target::Target;
use crate::error::{EncodeError, EncodeResult, LengthError};
use crate::int::{
    pack_constrained_offset, pack_semi_constrained_whole_number, unpack_constrained_offset,
    unpack_semi_constrained_whole_number,
};
use crate::parse::error::TokenError;
use crate::parse::{ParseResult, Parser};

/// Bounds at or above which the unconstrained form is used
const UB_CONSTRAINED_LIMIT: usize = 65536;

/// Largest length expressible without fragmentation
pub const MAX_UNFRAGMENTED_LENGTH: usize = 16383;

/// Writes a length determinant `n` for a size constraint `lb..=ub`.
///
/// # Errors
///
/// Fails if `n` violates the size constraint, or if the unconstrained form
/// is required and `n` is too large to be written without fragmentation.
/// Nothing is written in either case.
pub fn pack_length<U: Target>(buf: &mut U, n: usize, lb: usize, ub: usize) -> EncodeResult<usize> {
    LengthError::check(n, lb, ub)?;
    if ub < UB_CONSTRAINED_LIMIT {
        Ok(pack_constrained_offset(buf, (n - lb) as u64, (ub - lb + 1) as u128))
    } else {
        pack_unconstrained_length(buf, n)
    }
}

/// Reads a length determinant for a size constraint `lb..=ub`.
pub fn unpack_length<P: Parser>(p: &mut P, lb: usize, ub: usize) -> ParseResult<usize> {
    let n = if ub < UB_CONSTRAINED_LIMIT {
        lb + unpack_constrained_offset(p, (ub - lb + 1) as u128)? as usize
    } else {
        unpack_unconstrained_length(p)?
    };
    Ok(LengthError::check(n, lb, ub)?)
}

/// Writes `n` in the unconstrained (one- or two-octet) form.
pub fn pack_unconstrained_length<U: Target>(buf: &mut U, n: usize) -> EncodeResult<usize> {
    if n > MAX_UNFRAGMENTED_LENGTH {
        tracing::error!("Length {} requires fragmentation, which is not supported", n);
        return Err(EncodeError::UnsupportedLength { length: n });
    }
    let pad = if buf.aligned() { buf.align() } else { 0 };
    if n < 128 {
        Ok(pad + buf.push_bits(n as u64, 8))
    } else {
        Ok(pad + buf.push_bits(0x8000 | n as u64, 16))
    }
}

/// Reads a length in the unconstrained form.
///
/// # Errors
///
/// A fragment prefix (`11`) yields [`TokenError::FragmentedLength`].
pub fn unpack_unconstrained_length<P: Parser>(p: &mut P) -> ParseResult<usize> {
    if p.aligned() {
        p.align()?;
    }
    if !p.consume_bit()? {
        return Ok(p.consume_bits(7)? as usize);
    }
    if !p.consume_bit()? {
        return Ok(p.consume_bits(14)? as usize);
    }
    let rest = p.consume_bits(6)? as u8;
    tracing::error!("Fragmented length determinants are not supported");
    Err(TokenError::FragmentedLength { prefix: 0xc0 | rest }.into())
}

/// Writes a normally-small non-negative whole number (X.691 §10.6).
pub fn pack_normally_small<U: Target>(buf: &mut U, n: u64) -> EncodeResult<usize> {
    if n <= 63 {
        Ok(buf.push_bit(false) + buf.push_bits(n, 6))
    } else {
        Ok(buf.push_bit(true) + pack_semi_constrained_whole_number(buf, n, 0)?)
    }
}

/// Reads a normally-small non-negative whole number.
pub fn unpack_normally_small<P: Parser>(p: &mut P) -> ParseResult<u64> {
    if p.consume_bit()? {
        unpack_semi_constrained_whole_number(p, 0)
    } else {
        p.consume_bits(6)
    }
}

/// Writes a normally-small length `n >= 1` (X.691 §10.9.3.4), as used for the
/// extension-addition bitmap of a `SEQUENCE`.
pub fn pack_normally_small_length<U: Target>(buf: &mut U, n: usize) -> EncodeResult<usize> {
    LengthError::check(n, 1, MAX_UNFRAGMENTED_LENGTH)?;
    if n <= 64 {
        Ok(buf.push_bit(false) + buf.push_bits((n - 1) as u64, 6))
    } else {
        Ok(buf.push_bit(true) + pack_unconstrained_length(buf, n)?)
    }
}

/// Reads a normally-small length.
pub fn unpack_normally_small_length<P: Parser>(p: &mut P) -> ParseResult<usize> {
    if p.consume_bit()? {
        Ok(LengthError::check(unpack_unconstrained_length(p)?, 1, MAX_UNFRAGMENTED_LENGTH)?)
    } else {
        Ok(p.consume_bits(6)? as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{strict::StrictBuilder, Builder};
    use crate::parse::bitparser::BitParser;
    use crate::parse::error::ParseError;
    use crate::parse::TryIntoParser;
    use crate::variant::Variant;

    #[test]
    fn constrained_lengths() {
        let mut buf = StrictBuilder::create();
        assert_eq!(pack_length(&mut buf, 3, 0, 65535).unwrap(), 16);
        assert_eq!(pack_length(&mut buf, 4, 4, 4).unwrap(), 0);
        assert_eq!(pack_length(&mut buf, 2, 1, 256).unwrap(), 8);
        assert_eq!(buf.into_hex(), "000301");

        let mut p: BitParser = [0x00u8, 0x03, 0x01].try_into_parser().unwrap();
        assert_eq!(unpack_length(&mut p, 0, 65535).unwrap(), 3);
        assert_eq!(unpack_length(&mut p, 4, 4).unwrap(), 4);
        assert_eq!(unpack_length(&mut p, 1, 256).unwrap(), 2);
    }

    #[test]
    fn unconstrained_forms() {
        let mut buf = StrictBuilder::create();
        buf.push_bit(true);
        assert_eq!(pack_unconstrained_length(&mut buf, 5).unwrap(), 15);
        assert_eq!(pack_unconstrained_length(&mut buf, 300).unwrap(), 16);
        assert_eq!(buf.into_hex(), "8005812c");

        let mut buf = StrictBuilder::create_with(Variant::Unaligned);
        buf.push_bit(true);
        assert_eq!(pack_unconstrained_length(&mut buf, 5).unwrap(), 8);
        assert_eq!(buf.into_hex(), "8280");

        let mut p: BitParser = [0x80u8, 0x05, 0x81, 0x2c].try_into_parser().unwrap();
        assert!(p.consume_bit().unwrap());
        assert_eq!(unpack_unconstrained_length(&mut p).unwrap(), 5);
        assert_eq!(unpack_unconstrained_length(&mut p).unwrap(), 300);
    }

    #[test]
    fn fragmentation_rejected() {
        let mut buf = StrictBuilder::create();
        assert_eq!(
            pack_unconstrained_length(&mut buf, 16384),
            Err(EncodeError::UnsupportedLength { length: 16384 })
        );
        assert!(buf.is_empty());

        let mut p: BitParser = [0xc1u8, 0x00].try_into_parser().unwrap();
        assert!(matches!(
            unpack_unconstrained_length(&mut p),
            Err(ParseError::Token(TokenError::FragmentedLength { prefix: 0xc1 }))
        ));
    }

    #[test]
    fn size_violations() {
        let mut buf = StrictBuilder::create();
        assert_eq!(
            pack_length(&mut buf, 0, 1, 256),
            Err(EncodeError::LengthViolation(LengthError::TooShort { limit: 1, actual: 0 }))
        );
        let mut p: BitParser = [0xffu8].try_into_parser().unwrap();
        assert_eq!(unpack_length(&mut p, 1, 256).unwrap(), 256);
        // 257 decoded for SIZE(0..256)
        let mut p: BitParser = [0x01u8, 0x01].try_into_parser().unwrap();
        assert!(unpack_length(&mut p, 0, 256).is_err());
    }

    #[test]
    fn normally_small() {
        let mut buf = StrictBuilder::create();
        assert_eq!(pack_normally_small(&mut buf, 5).unwrap(), 7);
        assert_eq!(buf.into_hex(), "0a");

        let mut buf = StrictBuilder::create();
        pack_normally_small(&mut buf, 64).unwrap();
        assert_eq!(buf.into_hex(), "800140");

        let mut p: BitParser = [0x80u8, 0x01, 0x40].try_into_parser().unwrap();
        assert_eq!(unpack_normally_small(&mut p).unwrap(), 64);

        let mut buf = StrictBuilder::create();
        pack_normally_small_length(&mut buf, 2).unwrap();
        assert_eq!(buf.as_bitslice().len(), 7);
        let mut p: BitParser = buf.into_vec().try_into_parser().unwrap();
        assert_eq!(unpack_normally_small_length(&mut p).unwrap(), 2);
    }
}
