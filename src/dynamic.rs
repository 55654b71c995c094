//! Open types: length-prefixed fields that can be skipped without being understood
//!
//! An open type carries the complete encoding of its inner value, padded to
//! a whole number of octets, behind an unconstrained length determinant that
//! counts those octets. Every IE value and every extension addition is framed
//! this way, so that a receiver can step over anything it does not recognize.
//!
//! On the encoding side, [`with_length_prefixed`] writes the inner value into
//! a scratch [`StrictBuilder`] first, so that the length prefix is written
//! exactly once, and only once the inner value has been written successfully.
//!
//! On the decoding side, [`with_window`] opens a context window spanning the
//! declared octets, so that the inner value cannot read beyond them, and
//! closes it afterwards, which fails unless the inner value consumed the
//! window exactly (up to the final octet padding).

use std::fmt::{Debug, Display};

use crate::builder::{strict::StrictBuilder, Builder};
use crate::conv::{target::Target, Decode, Encode};
use crate::error::EncodeResult;
use crate::length::{pack_unconstrained_length, unpack_unconstrained_length};
use crate::parse::{ParseResult, Parser};

/// Encodes the bits written by `f` as an open type onto `buf`.
///
/// The scratch builder passed to `f` inherits the variant of `buf`. If `f`
/// fails, its error is returned and nothing is written to `buf`.
pub fn with_length_prefixed<U, F>(buf: &mut U, f: F) -> EncodeResult<usize>
where
    U: Target,
    F: FnOnce(&mut StrictBuilder) -> EncodeResult<usize>,
{
    let mut scratch = StrictBuilder::create_with(buf.variant());
    let _ = f(&mut scratch)?;
    let octets = scratch.into_vec();
    buf.anticipate(octets.len() * 8 + 16);
    Ok(pack_unconstrained_length(buf, octets.len())? + buf.push_all(&octets))
}

/// Writes pre-encoded octets as an open type.
pub fn pack_open_octets<U: Target>(buf: &mut U, octets: &[u8]) -> EncodeResult<usize> {
    Ok(pack_unconstrained_length(buf, octets.len())? + buf.push_all(octets))
}

/// Decodes an open type, running `f` inside a context window over its contents.
///
/// Once `f` returns, at most seven residual bits are accepted as padding
/// (they must be zero with the feature `check_padding`), with the exception
/// of a value that consumed no bits at all, whose encoding is one zero octet.
///
/// # Errors
///
/// Besides any error returned by `f`, fails with `WindowError::OpenWouldExceedBuffer`
/// if the declared length exceeds the remaining bits, and with
/// `WindowError::CloseWithResidue` if `f` leaves a whole octet or more unconsumed.
pub fn with_window<P, T, F>(p: &mut P, f: F) -> ParseResult<T>
where
    P: Parser,
    F: FnOnce(&mut P) -> ParseResult<T>,
{
    let len = unpack_unconstrained_length(p)?;
    p.set_fit(len * 8)?;
    let start = p.offset();
    let ret = f(p)?;
    let residual = p.remainder();
    if residual < 8 || (p.offset() == start && residual == 8) {
        p.consume_padding(residual)?;
    }
    p.enforce_target()?;
    Ok(ret)
}

/// Discards an open type, returning the number of octets skipped.
pub fn skip_open_type<P: Parser>(p: &mut P) -> ParseResult<usize> {
    let len = unpack_unconstrained_length(p)?;
    let _ = p.consume_bitslice(len * 8)?;
    Ok(len)
}

/// Reads the contents of an open type as raw octets.
pub fn unpack_open_octets<P: Parser>(p: &mut P) -> ParseResult<Vec<u8>> {
    let len = unpack_unconstrained_length(p)?;
    p.consume_octets(len)
}

/// Wrapper that encodes its contents as an open type
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[cfg_attr(feature = "serde_impls", serde(transparent))]
#[repr(transparent)]
pub struct OpenType<T>(T);

impl<T> OpenType<T> {
    pub fn wrap(contents: T) -> Self {
        Self(contents)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for OpenType<T> {
    fn from(contents: T) -> Self {
        Self(contents)
    }
}

impl<T> std::ops::Deref for OpenType<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for OpenType<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Debug> Debug for OpenType<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[open|{:?}]", self.0)
    }
}

impl<T: Display> Display for OpenType<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T: Encode> Encode for OpenType<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        with_length_prefixed(buf, |scratch| self.0.write_to(scratch))
    }
}

impl<T: Decode> Decode for OpenType<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self(with_window(p, |p| T::parse(p))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::error::DecodeError;
    use crate::error::EncodeError;
    use crate::int::RangedInt;
    use crate::parse::bitparser::BitParser;
    use crate::parse::error::{ParseError, WindowError};
    use crate::parse::TryIntoParser;

    type Small = RangedInt<0, 7>;

    #[test]
    fn framing() {
        assert_eq!(OpenType::wrap(Small::new(5)).to_bytes().unwrap(), vec![0x01, 0xa0]);
        assert_eq!(OpenType::wrap(()).to_bytes().unwrap(), vec![0x01, 0x00]);
        assert_eq!(OpenType::wrap(0x1234u16).to_bytes().unwrap(), vec![0x02, 0x12, 0x34]);
        assert_eq!(<OpenType<()>>::decode("0100").into_inner(), ());
        assert_eq!(*<OpenType<Small>>::decode("01a0"), Small::new(5));
    }

    #[test]
    fn unaligned_framing() {
        let bytes = (true, OpenType::wrap(Small::new(5))).to_bytes_unaligned().unwrap();
        // 1 | 00000001 | 10100000
        assert_eq!(bytes, vec![0x80, 0xd0, 0x00]);
        let (b, x) = <(bool, OpenType<Small>)>::try_decode_unaligned(bytes).unwrap();
        assert!(b);
        assert_eq!(x.value(), 5);
    }

    #[test]
    fn residue_is_rejected() {
        assert!(matches!(
            <OpenType<Small>>::try_decode("02a000"),
            Err(DecodeError::Parse(ParseError::Window(WindowError::CloseWithResidue { residual: 13 })))
        ));
    }

    #[test]
    fn overrun_is_rejected() {
        assert!(matches!(
            <OpenType<bool>>::try_decode("00"),
            Err(DecodeError::Parse(ParseError::Window(WindowError::ConsumeWouldExceedLimit { .. })))
        ));
        assert!(matches!(
            <OpenType<u16>>::try_decode("0512"),
            Err(DecodeError::Parse(ParseError::Window(WindowError::OpenWouldExceedBuffer { .. })))
        ));
    }

    #[test]
    fn successive_fields_stay_delimited() {
        let bytes = (OpenType::wrap(0xbeefu16), OpenType::wrap(true)).to_bytes().unwrap();
        assert_eq!(bytes, vec![0x02, 0xbe, 0xef, 0x01, 0x80]);
        let (a, b) = <(OpenType<u16>, OpenType<bool>)>::decode(bytes.clone());
        assert_eq!((*a, *b), (0xbeef, true));

        // shorten the first field by one octet: it can no longer be decoded
        let mut corrupt = bytes;
        corrupt[0] = 0x01;
        assert!(<(OpenType<u16>, OpenType<bool>)>::try_decode(corrupt).is_err());
    }

    #[test]
    fn failed_inner_writes_nothing() {
        let mut buf = StrictBuilder::create();
        let res = with_length_prefixed(&mut buf, |scratch| {
            scratch.push_bits(0xff, 8);
            RangedInt::<0, 7>::try_new(9)?;
            Ok(8)
        });
        assert!(matches!(res, Err(EncodeError::IntRangeViolation(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn skipping() {
        let mut p: BitParser = [0x03u8, 1, 2, 3, 0x01, 0x80].try_into_parser().unwrap();
        assert_eq!(skip_open_type(&mut p).unwrap(), 3);
        assert_eq!(unpack_open_octets(&mut p).unwrap(), vec![0x80]);
        assert_eq!(p.remainder(), 0);
    }
}
