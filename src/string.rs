//! `OCTET STRING`, `BIT STRING` and `PrintableString`
//!
//! All three string types share the same framing rules (X.691 §16, §17, §30):
//!
//! * a fixed size of at most 16 bits is written without a length determinant
//!   and without padding;
//! * a larger fixed size (below 64K) is written without a length determinant,
//!   but starts on an octet boundary in the ALIGNED variant;
//! * any other size constraint requires a length determinant, after which the
//!   contents start on an octet boundary in the ALIGNED variant.

use bitvec::prelude::{BitSlice, BitVec, Msb0};

use crate::conv::{target::Target, Decode, Encode};
use crate::error::{EncodeError, EncodeResult, LengthError, WidthError};
use crate::length::{pack_length, unpack_length};
use crate::parse::error::TokenError;
use crate::parse::{ParseResult, Parser};

const UB_FIXED_LIMIT: usize = 65536;

/// Writes the length determinant (if any) and alignment for `n` units of
/// `unit_bits` bits each, under a size constraint `lb..=ub`.
fn pack_size<U: Target>(buf: &mut U, n: usize, lb: usize, ub: usize, unit_bits: usize) -> EncodeResult<usize> {
    LengthError::check(n, lb, ub)?;
    if lb == ub && ub < UB_FIXED_LIMIT {
        if ub.saturating_mul(unit_bits) <= 16 || !buf.aligned() {
            return Ok(0);
        }
        return Ok(buf.align());
    }
    let len = pack_length(buf, n, lb, ub)?;
    let pad = if buf.aligned() { buf.align() } else { 0 };
    Ok(len + pad)
}

/// Reads the length determinant (if any) and alignment preceding the
/// contents of a string type, returning the number of units.
fn unpack_size<P: Parser>(p: &mut P, lb: usize, ub: usize, unit_bits: usize) -> ParseResult<usize> {
    if lb == ub && ub < UB_FIXED_LIMIT {
        if ub.saturating_mul(unit_bits) > 16 && p.aligned() {
            p.align()?;
        }
        return Ok(ub);
    }
    let n = unpack_length(p, lb, ub)?;
    if p.aligned() {
        p.align()?;
    }
    Ok(n)
}

/// `OCTET STRING (SIZE(MIN..MAX))`
///
/// An unbounded `OCTET STRING` is `OctetString<0, { usize::MAX }>`, for which
/// the alias [`UnboundedOctetString`] is provided.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[cfg_attr(feature = "serde_impls", serde(transparent))]
pub struct OctetString<const MIN: usize, const MAX: usize>(Vec<u8>);

pub type UnboundedOctetString = OctetString<0, { usize::MAX }>;

impl<const MIN: usize, const MAX: usize> OctetString<MIN, MAX> {
    pub fn try_new(octets: impl Into<Vec<u8>>) -> Result<Self, LengthError> {
        let octets = octets.into();
        LengthError::check(octets.len(), MIN, MAX)?;
        Ok(Self(octets))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl<const MIN: usize, const MAX: usize> TryFrom<Vec<u8>> for OctetString<MIN, MAX> {
    type Error = LengthError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl<const MIN: usize, const MAX: usize> TryFrom<&[u8]> for OctetString<MIN, MAX> {
    type Error = LengthError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl<const MIN: usize, const MAX: usize> Encode for OctetString<MIN, MAX> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        buf.anticipate(self.0.len() * 8 + 24);
        Ok(pack_size(buf, self.0.len(), MIN, MAX, 8)? + buf.push_all(&self.0))
    }
}

impl<const MIN: usize, const MAX: usize> Decode for OctetString<MIN, MAX> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let n = unpack_size(p, MIN, MAX, 8)?;
        Ok(Self(p.consume_octets(n)?))
    }
}

/// `BIT STRING (SIZE(MIN..MAX))`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BitString<const MIN: usize, const MAX: usize>(BitVec<u8, Msb0>);

impl<const MIN: usize, const MAX: usize> BitString<MIN, MAX> {
    pub fn try_new(bits: BitVec<u8, Msb0>) -> Result<Self, WidthError> {
        WidthError::check(bits.len(), MIN, MAX)?;
        Ok(Self(bits))
    }

    /// Takes the leading `nbits` bits of `octets`.
    pub fn from_octets(octets: &[u8], nbits: usize) -> Result<Self, WidthError> {
        let all = BitSlice::<u8, Msb0>::from_slice(octets);
        if nbits > all.len() {
            return Err(WidthError::TooNarrow {
                limit: nbits,
                actual: all.len(),
            });
        }
        Self::try_new(all[..nbits].to_bitvec())
    }

    #[must_use]
    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        self.0.as_bitslice()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const MIN: usize, const MAX: usize> Encode for BitString<MIN, MAX> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        WidthError::check(self.0.len(), MIN, MAX)?;
        Ok(pack_size(buf, self.0.len(), MIN, MAX, 1)? + buf.push_bitslice(&self.0))
    }
}

impl<const MIN: usize, const MAX: usize> Decode for BitString<MIN, MAX> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let n = unpack_size(p, MIN, MAX, 1)?;
        Ok(Self(p.consume_bitslice(n)?.to_bitvec()))
    }
}

#[cfg(feature = "serde_impls")]
impl<const MIN: usize, const MAX: usize> serde::Serialize for BitString<MIN, MAX> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text: String = self.0.iter().map(|b| if *b { '1' } else { '0' }).collect();
        serializer.serialize_str(&text)
    }
}

/// Returns `true` if `c` belongs to the `PrintableString` alphabet.
#[must_use]
pub fn is_printable(c: char) -> bool {
    c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
}

/// `PrintableString (SIZE(MIN..MAX))`, or `PrintableString (SIZE(MIN..MAX, ...))` when `EXT` is set
///
/// Characters are written as their code points, in 7 bits in the UNALIGNED
/// variant and 8 bits in the ALIGNED variant.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[cfg_attr(feature = "serde_impls", serde(transparent))]
pub struct PrintableString<const MIN: usize, const MAX: usize, const EXT: bool = false>(String);

impl<const MIN: usize, const MAX: usize, const EXT: bool> PrintableString<MIN, MAX, EXT> {
    pub fn try_new(s: impl Into<String>) -> EncodeResult<Self> {
        let s = s.into();
        if let Some(c) = s.chars().find(|c| !is_printable(*c)) {
            return Err(EncodeError::InvalidCharacter(c));
        }
        if !EXT {
            LengthError::check(s.len(), MIN, MAX)?;
        }
        Ok(Self(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    const fn char_bits(aligned: bool) -> usize {
        if aligned {
            8
        } else {
            7
        }
    }
}

impl<const MIN: usize, const MAX: usize, const EXT: bool> std::fmt::Display for PrintableString<MIN, MAX, EXT> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const MIN: usize, const MAX: usize, const EXT: bool> Encode for PrintableString<MIN, MAX, EXT> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        if let Some(c) = self.0.chars().find(|c| !is_printable(*c)) {
            tracing::error!("Character {:?} is not permitted in a PrintableString", c);
            return Err(EncodeError::InvalidCharacter(c));
        }
        let n = self.0.len();
        let b = Self::char_bits(buf.aligned());
        let within = (MIN..=MAX).contains(&n);
        let mut ret = 0;
        if EXT {
            ret += buf.push_bit(!within);
        }
        ret += if EXT && !within {
            pack_size(buf, n, 0, usize::MAX, b)?
        } else {
            pack_size(buf, n, MIN, MAX, b)?
        };
        for octet in self.0.bytes() {
            ret += buf.push_bits(u64::from(octet), b);
        }
        Ok(ret)
    }
}

impl<const MIN: usize, const MAX: usize, const EXT: bool> Decode for PrintableString<MIN, MAX, EXT> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let b = Self::char_bits(p.aligned());
        let n = if EXT && p.consume_bit()? {
            unpack_size(p, 0, usize::MAX, b)?
        } else {
            unpack_size(p, MIN, MAX, b)?
        };
        let mut s = String::with_capacity(n);
        for _ in 0..n {
            let octet = p.consume_bits(b)? as u8;
            let c = char::from(octet);
            if !is_printable(c) {
                return Err(TokenError::InvalidCharacter(octet).into());
            }
            s.push(c);
        }
        Ok(Self(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::error::DecodeError;
    use crate::parse::error::ParseError;
    use bitvec::bitvec;

    #[test]
    fn octet_string_framing() {
        let fixed3 = OctetString::<3, 3>::try_new([1u8, 2, 3]).unwrap();
        assert_eq!((true, fixed3.clone()).to_bytes().unwrap(), vec![0x80, 1, 2, 3]);
        let fixed2 = OctetString::<2, 2>::try_new([1u8, 2]).unwrap();
        assert_eq!((true, fixed2.clone()).to_bytes().unwrap(), vec![0x80, 0x81, 0x00]);
        assert_eq!(<(bool, OctetString<2, 2>)>::decode(vec![0x80u8, 0x81, 0x00]).1, fixed2);

        let var = OctetString::<0, 8>::try_new([0xabu8]).unwrap();
        assert_eq!(var.to_bytes().unwrap(), vec![0x10, 0xab]);
        assert_eq!(var.to_bytes_unaligned().unwrap(), vec![0x1a, 0xb0]);
        assert_eq!(OctetString::<0, 8>::decode(vec![0x10u8, 0xab]), var);
        assert_eq!(OctetString::<0, 8>::try_decode_unaligned(vec![0x1au8, 0xb0]).unwrap(), var);

        let unbounded = UnboundedOctetString::try_new(vec![0x55; 3]).unwrap();
        assert_eq!(unbounded.to_bytes().unwrap(), vec![0x03, 0x55, 0x55, 0x55]);
        assert!(OctetString::<1, 2>::try_new(vec![]).is_err());
    }

    #[test]
    fn bit_string_framing() {
        let nibble = BitString::<4, 4>::try_new(bitvec![u8, Msb0; 1, 0, 1, 1]).unwrap();
        assert_eq!(nibble.to_bytes().unwrap(), vec![0xb0]);
        assert_eq!(BitString::<4, 4>::decode(vec![0xb0u8]), nibble);

        let short = BitString::<1, 160>::try_new(bitvec![u8, Msb0; 1, 0]).unwrap();
        assert_eq!(short.to_bytes().unwrap(), vec![0x01, 0x80]);
        assert_eq!(BitString::<1, 160>::decode(vec![0x01u8, 0x80]), short);

        let id = BitString::<22, 32>::from_octets(&[0xff, 0xff, 0xff, 0xff], 22).unwrap();
        assert_eq!(id.len(), 22);
        assert!(BitString::<4, 4>::try_new(BitVec::new()).is_err());
    }

    #[test]
    fn printable_string_widths() {
        let s = PrintableString::<1, 8>::try_new("AB").unwrap();
        assert_eq!(s.to_bytes().unwrap(), vec![0x20, 0x41, 0x42]);
        assert_eq!(s.to_bytes_unaligned().unwrap(), vec![0x30, 0x61, 0x00]);
        assert_eq!(PrintableString::<1, 8>::decode(vec![0x20u8, 0x41, 0x42]).as_str(), "AB");
        assert_eq!(
            PrintableString::<1, 8>::try_decode_unaligned(vec![0x30u8, 0x61, 0x00]).unwrap(),
            s
        );
    }

    #[test]
    fn printable_string_extension() {
        let root = PrintableString::<1, 2, true>::try_new("A").unwrap();
        assert_eq!(root.to_bytes().unwrap(), vec![0x00, 0x41]);
        let ext = PrintableString::<1, 2, true>::try_new("ABC").unwrap();
        assert_eq!(ext.to_bytes().unwrap(), vec![0x80, 0x03, 0x41, 0x42, 0x43]);
        assert_eq!(
            PrintableString::<1, 2, true>::decode(vec![0x80u8, 0x03, 0x41, 0x42, 0x43]),
            ext
        );
        assert!(PrintableString::<1, 2>::try_new("ABC").is_err());
    }

    #[test]
    fn invalid_characters() {
        assert_eq!(
            PrintableString::<1, 8>::try_new("a@b"),
            Err(EncodeError::InvalidCharacter('@'))
        );
        assert!(matches!(
            PrintableString::<1, 8>::try_decode(vec![0x00u8, 0x40]),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidCharacter(0x40))))
        ));
    }
}
