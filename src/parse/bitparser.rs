//! Buffer-with-offset implementation of `Parser`

use bitvec::prelude::{BitSlice, BitVec, Msb0};

use crate::error::HexConvError;
use crate::internal::offset::{ContextOffset, IndexTracker};
use crate::parse::error::{ParseError, ParseResult, WindowError};
use crate::parse::Parser;
use crate::util::bytes_of_hex;
use crate::variant::Variant;

/// Immutable MSB-first bit-buffer that a [`BitParser`] reads from
#[derive(Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct BitBuffer(BitVec<u8, Msb0>);

impl BitBuffer {
    /// Bit-length of the buffer
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        self.0.as_bitslice()
    }
}

impl From<Vec<u8>> for BitBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(BitVec::from_vec(bytes))
    }
}

impl From<&[u8]> for BitBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self(BitVec::from_slice(bytes))
    }
}

impl From<&Vec<u8>> for BitBuffer {
    fn from(bytes: &Vec<u8>) -> Self {
        Self(BitVec::from_slice(bytes.as_slice()))
    }
}

impl<const N: usize> From<[u8; N]> for BitBuffer {
    fn from(bytes: [u8; N]) -> Self {
        Self(BitVec::from_slice(&bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for BitBuffer {
    fn from(bytes: &[u8; N]) -> Self {
        Self(BitVec::from_slice(bytes))
    }
}

impl From<BitVec<u8, Msb0>> for BitBuffer {
    fn from(bits: BitVec<u8, Msb0>) -> Self {
        Self(bits)
    }
}

impl TryFrom<&str> for BitBuffer {
    type Error = HexConvError;

    fn try_from(hex: &str) -> Result<Self, Self::Error> {
        Ok(Self::from(bytes_of_hex(hex)?))
    }
}

impl TryFrom<&String> for BitBuffer {
    type Error = HexConvError;

    fn try_from(hex: &String) -> Result<Self, Self::Error> {
        Self::try_from(hex.as_str())
    }
}

/// `Parser` over an owned [`BitBuffer`], tracking its position with a
/// [`ContextOffset`].
#[derive(Debug)]
pub struct BitParser {
    buffer: BitBuffer,
    offset: ContextOffset,
    variant: Variant,
}

impl BitParser {
    /// Number of context windows currently open
    pub fn window_depth(&self) -> usize {
        self.offset.depth()
    }
}

impl Parser for BitParser {
    type Buffer = BitBuffer;

    /// The resulting parser will have an offset of 0 and no context windows
    /// at time of creation.
    fn from_buffer_with(buffer: Self::Buffer, variant: Variant) -> Self {
        let offset = ContextOffset::with_limit(buffer.len());
        Self {
            buffer,
            offset,
            variant,
        }
    }

    #[inline]
    fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    fn view_len(&self) -> usize {
        self.offset.limit()
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset.index()
    }

    fn consume_bitslice(&mut self, nbits: usize) -> ParseResult<&BitSlice<u8, Msb0>> {
        let (ix, adv) = self.offset.advance(nbits);
        if adv {
            Ok(&self.buffer.as_bitslice()[ix..ix + nbits])
        } else {
            Err(ParseError::Window(WindowError::ConsumeWouldExceedLimit {
                offset: ix,
                requested: nbits,
                limit: self.view_len(),
            }))
        }
    }

    #[inline]
    fn set_fit(&mut self, nbits: usize) -> ParseResult<()> {
        self.offset.set_fit(nbits)
    }

    #[inline]
    fn test_target(&mut self) -> ParseResult<bool> {
        self.offset.test_target()
    }

    #[inline]
    fn enforce_target(&mut self) -> ParseResult<()> {
        self.offset.enforce_target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::TryIntoParser;

    #[test]
    fn window_bounds_reads() {
        let mut p: BitParser = [0xffu8, 0x00, 0xaa].try_into_parser().unwrap();
        p.set_fit(12).unwrap();
        assert_eq!(p.remainder(), 12);
        assert_eq!(p.consume_bits(8).unwrap(), 0xff);
        assert!(p.consume_bits(5).is_err());
        assert_eq!(p.offset(), 8);
        assert!(!p.test_target().unwrap());
        assert_eq!(p.consume_bits(4).unwrap(), 0);
        assert!(p.test_target().unwrap());
        p.enforce_target().unwrap();
        assert_eq!(p.window_depth(), 0);
        assert_eq!(p.remainder(), 12);
    }

    #[test]
    fn bad_hex() {
        let res: Result<BitParser, _> = "abc".try_into_parser();
        assert!(matches!(res, Err(HexConvError::OddParity(_))));
    }
}
