//! Custom parsing model with bit-level precision
//!
//! This module, along with its submodules, provides the fundamental
//! definitions related to the abstract task of processing a PER-encoded
//! bit-stream into the low-level fragments at the leaf nodes of
//! an arbitrarily complex user-defined type.
//!
//! For type-aware parsing, in other words, parsing user-defined types
//! directly rather than as an unstructured sequence of bits,
//! see the [`Decode`](crate::conv::Decode) trait, which is a
//! high-level interface built almost entirely around the definitions
//! contained within this module.
//!
//! # Layout
//!
//! The top-level of this module defines the [`Parser`] trait, along with
//! the utility trait [`TryIntoParser<P>`] which facilitates the generic instantiation
//! of parser-types from a variety of source types.
//!   * `error` defines the hierachy of error cases that can be encountered and returned when something goes wrong
//!     during a call to a `Parser` method, or while decoding a value through one.
//!   * `bitparser` defines [`BitParser`](bitparser::BitParser), the buffer-with-offset
//!     implementation of `Parser` used throughout this crate, together with its buffer type.

pub mod bitparser;
pub mod error;

use bitvec::field::BitField;
use bitvec::prelude::{BitSlice, Msb0};

pub use error::ParseResult;
use error::{InternalError, ParseError};

use crate::variant::Variant;
use bitparser::BitParser;

/// # Parser
///
///   This trait is an abstraction over types respresenting a stateful
///   parse-object over a PER bit-stream, with default implementations for
///   the multi-bit reads in terms of a handful of required methods.
///
///  ## Model
///
///  * The Parser-object is constructed over an immutable bit-buffer, together
///    with the PER [`Variant`] that governs whether alignment padding is present.
///  * All parsing is done in a non-backtracking, zero-lookahead fashion; a bit in the buffer
///    can only be viewed by consuming it, and only after all preceding bits in the buffer
///    have been consumed.
///  * A *context-window*, or a bounded contiguous view of a section of the buffer,
///    may be constructed. While a context-window exists, any bits beyond its upper bound
///    are protected and cannot be consumed by any Parser method until that
///    context window is lifted. A context-window can only be lifted by calling
///    [`enforce_target`](Parser::enforce_target) when all bits within the window have been consumed.
///
/// The following properties should be respected by each implementation of the `Parser` trait:
///
/// * A fresh `p : impl Parser` object should have `p.offset() == 0` and `p.view_len()` equal to the bit-length of the buffer
/// * `self.remainder()` is the largest possible `n` for which `self.consume_bitslice(n)` returns an `Ok(_)` value
/// * Immediately after a successful call of `self.set_fit(n)`, `self.remainder()` should return `n`
/// * `self.enforce_target()` should remove the most recently set target if `self.test_target()` would return true, and fail otherwise
pub trait Parser {
    /// Buffer type a new `Parser` object can be safely and infallibly
    /// instantiated from a value of.
    type Buffer;

    /// Constructs an initialized `Parser` value over a buffer, in the ALIGNED variant
    fn from_buffer(buf: Self::Buffer) -> Self
    where
        Self: Sized,
    {
        Self::from_buffer_with(buf, Variant::Aligned)
    }

    /// Constructs an initialized `Parser` value over a buffer, in the specified variant
    fn from_buffer_with(buf: Self::Buffer, variant: Variant) -> Self;

    /// PER variant this parser decodes
    fn variant(&self) -> Variant;

    /// Returns `true` if this parser expects alignment padding
    #[inline]
    fn aligned(&self) -> bool {
        self.variant().is_aligned()
    }

    /// Computes the bit-length of the current view of the Parser's buffer, which
    /// is the end of the innermost context-window if one is open.
    #[must_use]
    fn view_len(&self) -> usize;

    /// Computes the current value of the bit-offset into the Parser's buffer.
    #[must_use]
    fn offset(&self) -> usize;

    /// Computes the remaining number of bits that can be safely consumed in the current context.
    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    /// Attempt to consume and return a bit-slice of length `nbits`,
    /// starting from the first unconsumed bit in the buffer.
    ///
    /// If either the absolute bounds of the buffer, or context-window limits
    /// would be violated by such an attempt, no bits are consumed.
    fn consume_bitslice(&mut self, nbits: usize) -> ParseResult<&BitSlice<u8, Msb0>>;

    /// Creates a new context-window that permits exactly `n` more bits to be consumed before
    /// subsequent consume operations fail.
    fn set_fit(&mut self, nbits: usize) -> ParseResult<()>;

    /// Returns true if and only if `self.remainder() == 0` and there is at least one unclosed
    /// context window.
    fn test_target(&mut self) -> ParseResult<bool>;

    /// Attempts to close the current context-window.
    ///
    /// This method must fail when there are no context windows left unclosed,
    /// or when there is at least one bit remaining in the current context window.
    fn enforce_target(&mut self) -> ParseResult<()>;

    /// Consumes a single bit
    fn consume_bit(&mut self) -> ParseResult<bool> {
        Ok(self.consume_bitslice(1)?[0])
    }

    /// Consumes `nbits` bits and returns them as a big-endian unsigned integer.
    ///
    /// # Errors
    ///
    /// Fails with [`InternalError::WidthOverflow`] if `nbits > 64`, in addition to
    /// the usual window errors.
    fn consume_bits(&mut self, nbits: usize) -> ParseResult<u64> {
        if nbits > 64 {
            return Err(InternalError::WidthOverflow { requested: nbits }.into());
        }
        if nbits == 0 {
            return Ok(0);
        }
        Ok(self.consume_bitslice(nbits)?.load_be::<u64>())
    }

    /// Consumes `n` whole octets, which need not be aligned to an octet boundary.
    fn consume_octets(&mut self, n: usize) -> ParseResult<Vec<u8>> {
        let bits = self.consume_bitslice(n * 8)?;
        Ok(bits.chunks(8).map(|octet| octet.load_be::<u8>()).collect())
    }

    /// Consumes `nbits` bits of padding.
    ///
    /// When the feature `check_padding` is enabled, the padding must be all zero bits.
    fn consume_padding(&mut self, nbits: usize) -> ParseResult<()> {
        let _padding = self.consume_bits(nbits)?;
        #[cfg(feature = "check_padding")]
        {
            if _padding != 0 {
                return Err(error::TokenError::NonZeroPadding {
                    padding: _padding,
                    width: nbits,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Skips to the next octet boundary, returning the number of padding bits consumed.
    fn align(&mut self) -> ParseResult<usize> {
        let gap = (8 - self.offset() % 8) % 8;
        self.consume_padding(gap)?;
        Ok(gap)
    }

    /// Consumes any final octet-padding, and returns the number of bits that remain
    /// in the current view beyond it.
    fn finish(&mut self) -> ParseResult<usize> {
        let gap = (8 - self.offset() % 8) % 8;
        if gap <= self.remainder() {
            self.consume_padding(gap)?;
        }
        Ok(self.remainder())
    }
}

/// Helper trait marking types that can be converted (possibly fallibly),
/// into `Parser` objects of the specified type.
///
/// When no generic argument is provided, the default `Parser` type
/// used is [`BitParser`]
pub trait TryIntoParser<P = BitParser>
where
    P: Parser,
{
    type Error;

    /// Attempt to produce a parser object of type `P` over the bits
    /// represented by `self`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the conversion from `self`
    /// into the buffer-type of `P` failed, which is only possible for
    /// hexadecimal string input.
    fn try_into_parser(self) -> Result<P, Self::Error>;

    /// As [`try_into_parser`](TryIntoParser::try_into_parser), for an explicit variant.
    fn try_into_parser_with(self, variant: Variant) -> Result<P, Self::Error>;
}

impl<P, T> TryIntoParser<P> for T
where
    P: Parser,
    <P as Parser>::Buffer: TryFrom<T>,
{
    type Error = <<P as Parser>::Buffer as TryFrom<T>>::Error;

    fn try_into_parser(self) -> Result<P, Self::Error> {
        self.try_into_parser_with(Variant::Aligned)
    }

    fn try_into_parser_with(self, variant: Variant) -> Result<P, Self::Error> {
        let buffer = <<P as Parser>::Buffer as TryFrom<T>>::try_from(self)?;
        Ok(P::from_buffer_with(buffer, variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::error::WindowError;

    #[test]
    fn read_bits_msb_first() {
        let mut p: BitParser = [0b1010_0000u8, 0xff].try_into_parser().unwrap();
        assert!(p.consume_bit().unwrap());
        assert_eq!(p.consume_bits(3).unwrap(), 0b010);
        assert_eq!(p.align().unwrap(), 4);
        assert_eq!(p.consume_octets(1).unwrap(), vec![0xff]);
        assert!(matches!(
            p.consume_bit(),
            Err(ParseError::Window(WindowError::ConsumeWouldExceedLimit { offset: 16, requested: 1, limit: 16 }))
        ));
    }

    #[test]
    fn hex_input() {
        let mut p: BitParser = "c0".try_into_parser().unwrap();
        assert_eq!(p.consume_bits(2).unwrap(), 3);
        assert_eq!(p.finish().unwrap(), 0);
    }

    #[test]
    fn unaligned_octets() {
        let mut p: BitParser = [0x81u8, 0x80].try_into_parser_with(Variant::Unaligned).unwrap();
        assert!(p.consume_bit().unwrap());
        assert_eq!(p.consume_octets(1).unwrap(), vec![0x03]);
        assert!(!p.aligned());
    }

    #[test]
    fn oversized_read() {
        let mut p: BitParser = vec![0u8; 16].try_into_parser().unwrap();
        assert!(matches!(
            p.consume_bits(65),
            Err(ParseError::Internal(InternalError::WidthOverflow { requested: 65 }))
        ));
    }
}
