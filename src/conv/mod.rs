//! Core of the PER transcoding API
//!
//! This module contains definitions for the high-level transcoding traits
//! `Encode` and `Decode`, which are motivationally equivalent to the
//! `Serialize` and `Deserialize` traits defined in `serde`.
//!
//! While a great deal of the underlying machinery of this crate is subject to customization
//! by end-users, such as the selection or novel definitions of `Parser` and `Target` implementations,
//! `Encode` and `Decode` serve as the core of this library. Every schema type, from a
//! constrained `INTEGER` up to a full E1AP PDU, is transcoded through them.
//!
//! An additional submodule, [`target`], offers an abstraction along the lines of [`std::io::Write`], namely the
//! [`target::Target`] trait. This is the dual to [`crate::parse::Parser`], acting as the generic
//! bound for serialization in the [`Encode::write_to`] method, among others.
//!
//! Derive macros for Encode and Decode are provided in the sub-crates `encode_derive`
//! and `decode_derive`, which implement the PER `SEQUENCE` rules for structs and
//! are only relevant within the context of this library.

use crate::builder::{strict::StrictBuilder, Builder};
use crate::error::EncodeResult;
use crate::parse::bitparser::BitParser;
use crate::parse::{ParseResult, Parser, TryIntoParser};
use crate::variant::Variant;

use self::target::{BitCounter, Target};

pub mod error;
pub mod target;

pub use error::DecodeResult;

/// Trait for types that support serialization into a PER bit-stream
///
/// Implementing [`Encode`] can be as simple as providing a definition of the required method
/// [`write_to`](Encode::write_to). The remaining methods are defined in terms of it.
///
/// Encoding is fallible only insofar as a value may violate the constraints of the
/// schema type it models, e.g. an out-of-range integer whose type carries no extension
/// marker, or a length that would require fragmentation.
pub trait Encode {
    /// Appends the serialized bits of this value to a generic buffer,
    /// returning the exact number of bits written.
    ///
    /// Whether alignment padding is emitted is determined by
    /// [`Target::variant`] on `buf`.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`](crate::error::EncodeError) if the value
    /// cannot be represented under its constraints. Implementations should
    /// avoid partially writing a value when an error is detected, but callers
    /// must treat the contents of `buf` as unspecified after an error.
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize>;

    /// Creates a new ALIGNED buffer and fills it with the serialized bits of this value.
    #[inline]
    fn encode<U: Target>(&self) -> EncodeResult<U> {
        self.encode_with::<U>(Variant::Aligned)
    }

    /// Creates a new buffer in the given variant and fills it with the serialized
    /// bits of this value.
    fn encode_with<U: Target>(&self, variant: Variant) -> EncodeResult<U> {
        let mut buf: U = U::create_with(variant);
        let _ = self.write_to::<U>(&mut buf)?;
        Ok(buf)
    }

    /// Returns the complete APER encoding of this value, padded to an octet boundary.
    #[inline]
    fn to_bytes(&self) -> EncodeResult<Vec<u8>> {
        Ok(self.encode::<StrictBuilder>()?.into_vec())
    }

    /// Returns the complete UPER encoding of this value, padded to an octet boundary.
    #[inline]
    fn to_bytes_unaligned(&self) -> EncodeResult<Vec<u8>> {
        Ok(self
            .encode_with::<StrictBuilder>(Variant::Unaligned)?
            .into_vec())
    }
}

/// Extension trait for `Encode` that makes use of serialization-length oracles
///
/// This trait defines additional methods on an `Encode` type, which can determine
/// the exact number of bits in the serialized version of a value without requiring
/// allocations, as well as an optimization of [`Encode::to_bytes`] that
/// makes use of this prediction to avoid reallocation costs.
pub trait EncodeLength: Encode {
    /// Computes, without allocation, the number of bits in the APER encoding
    /// of `self`, excluding the final padding.
    ///
    /// The default implementation of this method invokes [`write_to`](Encode::write_to) over the
    /// zero-allocation target [`BitCounter`].
    #[inline]
    fn enc_bits(&self) -> EncodeResult<usize> {
        self.enc_bits_with(Variant::Aligned)
    }

    /// As [`enc_bits`](EncodeLength::enc_bits), for an explicit variant.
    fn enc_bits_with(&self, variant: Variant) -> EncodeResult<usize> {
        let mut ctr = BitCounter::create_with(variant);
        self.write_to(&mut ctr)
    }

    /// Pre-determines the exact number of bits required to serialize `self`,
    /// and returns the APER encoding from a buffer initialized to that capacity.
    fn to_bytes_full(&self) -> EncodeResult<Vec<u8>> {
        let mut buf = StrictBuilder::create();
        buf.anticipate(self.enc_bits()?);
        let _ = self.write_to(&mut buf)?;
        Ok(buf.into_vec())
    }
}

impl<T: Encode + ?Sized> EncodeLength for T {}

/// Trait providing methods for deserializing PER bit-streams into values of a certain type
///
/// It is almost always expected that a type implementing `Decode` will also
/// implement [`Encode`], although this is not enforced at any level except
/// in certain contexts, where both traits may appear as simulataneous bounds
/// on generic types.
///
/// Implementations are defined by one required method, [`parse`](Decode::parse),
/// which attempts to consume the contextually appropriate number of bits from a
/// [`Parser`], either returning a valid value of the implementing type, or an
/// error if parsing either failed, or yielded a value that was determined to
/// be invalid.
///
/// # Derive Macro
///
/// This crate provides a derive-macro `Decode` that is suitable for
/// implementing `Decode` on user-defined structs as PER `SEQUENCE` types.
///
/// In order to implement `Decode` on `CHOICE` and `ENUMERATED` types,
/// see the [`adt`](crate::adt) module for the macro-based strategy.
///
/// # Example
///
/// A typical hand-written implementation of `Decode` is provided below:
///
/// ```
/// use asn1_per::{Decode, Encode, Parser, ParseResult, RangedInt, Target};
/// use asn1_per::error::EncodeResult;
///
/// #[derive(Debug, PartialEq)]
/// pub struct Pair {
///     flag: bool,
///     id: RangedInt<0, 7>,
/// }
///
/// impl Encode for Pair {
///     fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
///         Ok(self.flag.write_to(buf)? + self.id.write_to(buf)?)
///     }
/// }
///
/// impl Decode for Pair {
///     fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
///         Ok(Self { flag: bool::parse(p)?, id: RangedInt::parse(p)? })
///     }
/// }
///
/// let val = Pair { flag: true, id: RangedInt::new(5) };
/// assert_eq!(val.to_bytes().unwrap(), vec![0b1101_0000]);
/// assert_eq!(Pair::decode(vec![0b1101_0000]), val);
/// ```
pub trait Decode {
    /// Attempt to consume and interpret a value of type `Self` from an existing
    /// `Parser` object over a bit-buffer.
    ///
    /// # Errors
    ///
    /// In most cases, the errors returned by this method will be propogated from
    /// calls made to [`Parser`] methods in the implementation logic.
    ///
    /// In rare cases, it may be necessary to return newly minted `ParseError`
    /// values based on certain invariants of the type being parsed.
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Attempt to decode a value of the `Self` type from the APER encoding held
    /// in `input`, using [`BitParser`] internally.
    ///
    /// # Errors
    ///
    /// As [`TryIntoParser::try_into_parser`] and [`parse`](Decode::parse) are both fallible methods,
    /// this method will propogate any error returned by either.
    ///
    /// In addition, if the feature-flag `check_complete_parse` is enabled,
    /// [`Parser::finish`] is called on the leftover parser, and an incomplete parse
    /// is reported as [`DecodeError::NonEmpty`](error::DecodeError::NonEmpty).
    fn try_decode<U>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        U: TryIntoParser<BitParser>,
        error::DecodeError: From<U::Error>,
    {
        Self::try_decode_with(input, Variant::Aligned)
    }

    /// As [`try_decode`](Decode::try_decode), for the UPER encoding.
    fn try_decode_unaligned<U>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        U: TryIntoParser<BitParser>,
        error::DecodeError: From<U::Error>,
    {
        Self::try_decode_with(input, Variant::Unaligned)
    }

    /// As [`try_decode`](Decode::try_decode), for an explicit variant.
    fn try_decode_with<U>(input: U, variant: Variant) -> DecodeResult<Self>
    where
        Self: Sized,
        U: TryIntoParser<BitParser>,
        error::DecodeError: From<U::Error>,
    {
        let mut p: BitParser = input.try_into_parser_with(variant)?;
        let ret = Self::parse(&mut p)?;
        #[cfg(feature = "check_complete_parse")]
        {
            let consumed = p.offset();
            let leftover = p.finish()?;
            // a zero-bit value is encoded as a single 0x00 octet
            if leftover != 0 && !(consumed == 0 && leftover == 8) {
                return Err(error::DecodeError::NonEmpty(leftover));
            }
        }
        Ok(ret)
    }

    /// Decodes a value of type `Self` from the APER encoding held in `inp`.
    ///
    /// This is intended primarily for tests and diagnostics.
    ///
    /// # Panics
    ///
    /// This method will panic if the interior call to [`try_decode`](Decode::try_decode)
    /// returns an `Err(_)` value.
    fn decode<U>(inp: U) -> Self
    where
        Self: Sized,
        U: TryIntoParser<BitParser>,
        error::DecodeError: From<U::Error>,
    {
        Self::try_decode(inp).unwrap_or_else(|err| {
            panic!(
                "<{} as Decode>::decode encountered error: {:?}",
                std::any::type_name::<Self>(),
                err
            )
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conv::error::DecodeError;
    use crate::parse::error::{ParseError, WindowError};

    #[test]
    fn check() {
        assert_eq!(true.encode::<StrictBuilder>().unwrap().into_hex(), "80");
        assert_eq!(().to_bytes().unwrap(), vec![0x00]);
        assert_eq!((true, false, true).enc_bits().unwrap(), 3);
    }

    #[test]
    fn truncated() {
        assert!(matches!(
            bool::try_decode(Vec::<u8>::new()),
            Err(DecodeError::Parse(ParseError::Window(
                WindowError::ConsumeWouldExceedLimit { .. }
            )))
        ));
        assert!(matches!(bool::try_decode("8"), Err(DecodeError::Conv(_))));
    }
}
