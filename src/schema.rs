//! `SEQUENCE` framing and other specialized schema types
//!
//! Every PER `SEQUENCE` begins with a *preamble*: one extension bit if the
//! type is extensible, followed by one presence bit for each `OPTIONAL` (or
//! `DEFAULT`) component. The components that are present follow in order.
//!
//! If the extension bit is set, the root components are followed by the
//! extension additions: a normally-small length `n`, an `n`-bit presence
//! bitmap, and one open type per addition that is present. This library
//! never emits extension additions of its own, but accepts and discards
//! those written by newer peers via [`skip_extension_additions`].
//!
//! These functions are what `#[derive(Encode, Decode)]` expands to; they are
//! public so that hand-written `SEQUENCE` types can use them as well.

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::dynamic::skip_open_type;
use crate::error::EncodeResult;
use crate::length::unpack_normally_small_length;
use crate::parse::{ParseResult, Parser};

/// Decoded leading bits of a `SEQUENCE`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Preamble {
    /// Whether extension additions follow the root components
    pub extended: bool,
    /// Presence of each optional component, in declaration order
    pub presence: Vec<bool>,
}

impl Preamble {
    /// Presence bit of the `ix`th optional component
    #[inline]
    #[must_use]
    pub fn is_present(&self, ix: usize) -> bool {
        self.presence.get(ix).copied().unwrap_or(false)
    }
}

/// Writes the preamble of a `SEQUENCE` whose extension additions are all absent.
pub fn pack_preamble<U: Target>(buf: &mut U, extensible: bool, presence: &[bool]) -> usize {
    let ext = if extensible { buf.push_bit(false) } else { 0 };
    ext + presence.iter().map(|bit| buf.push_bit(*bit)).sum::<usize>()
}

/// Reads the preamble of a `SEQUENCE` with `n_optional` optional components.
pub fn unpack_preamble<P: Parser>(p: &mut P, extensible: bool, n_optional: usize) -> ParseResult<Preamble> {
    let extended = extensible && p.consume_bit()?;
    let presence = (0..n_optional)
        .map(|_| p.consume_bit())
        .collect::<ParseResult<Vec<bool>>>()?;
    Ok(Preamble { extended, presence })
}

/// Reads and discards the extension additions of a `SEQUENCE`, returning the
/// number of additions that were present.
pub fn skip_extension_additions<P: Parser>(p: &mut P) -> ParseResult<usize> {
    let n = unpack_normally_small_length(p)?;
    let bitmap = (0..n)
        .map(|_| p.consume_bit())
        .collect::<ParseResult<Vec<bool>>>()?;
    let mut skipped = 0;
    for (ix, present) in bitmap.into_iter().enumerate() {
        if present {
            let octets = skip_open_type(p)?;
            tracing::debug!("Skipped unknown extension addition #{} ({} octets)", ix, octets);
            skipped += 1;
        }
    }
    Ok(skipped)
}

/// Completes the decoding of a `SEQUENCE` after its root components.
pub fn finish_sequence<P: Parser>(p: &mut P, preamble: &Preamble) -> ParseResult<()> {
    if preamble.extended {
        let _ = skip_extension_additions(p)?;
    }
    Ok(())
}

/// ASN.1 `NULL`, which is encoded as zero bits
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct Null;

impl Encode for Null {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        Ok(crate::resolve_zero!(buf))
    }
}

impl Decode for Null {
    fn parse<P: Parser>(_: &mut P) -> ParseResult<Self> {
        Ok(Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{strict::StrictBuilder, Builder};
    use crate::parse::bitparser::BitParser;
    use crate::parse::TryIntoParser;

    #[test]
    fn preamble_bits() {
        let mut buf = StrictBuilder::create();
        assert_eq!(pack_preamble(&mut buf, true, &[true, false, true]), 4);
        assert_eq!(pack_preamble(&mut buf, false, &[]), 0);
        assert_eq!(buf.into_vec(), vec![0b0101_0000]);

        let mut p: BitParser = [0b0101_0000u8].try_into_parser().unwrap();
        let pre = unpack_preamble(&mut p, true, 3).unwrap();
        assert!(!pre.extended);
        assert!(pre.is_present(0) && !pre.is_present(1) && pre.is_present(2));
        assert!(!pre.is_present(3));
    }

    #[test]
    fn extension_additions_are_skipped() {
        // ext bit, one root bit, bitmap length 2 = 0b000001, bitmap 10, padding,
        // then one open type of a single octet, and a trailing octet
        let bytes = [0b1100_0000u8, 0b1100_0000, 0x01, 0xff, 0x42];
        let mut p: BitParser = bytes.try_into_parser().unwrap();
        let pre = unpack_preamble(&mut p, true, 0).unwrap();
        assert!(pre.extended);
        assert!(p.consume_bit().unwrap());
        assert_eq!(skip_extension_additions(&mut p).unwrap(), 1);
        assert_eq!(p.consume_bits(8).unwrap(), 0x42);
    }

    #[test]
    fn null_is_empty() {
        assert_eq!(Null.to_bytes().unwrap(), vec![0x00]);
        assert_eq!(Null::decode("00"), Null);
    }
}
