//! Assorted helpers for hexadecimal conversion and bit arithmetic

use crate::error::HexConvError;
use num_integer::Integer;

/// Formats a sequence of bytes as a `String` containing a lowercase hexadecimal blob
///
/// # Examples
///
/// ```
/// # use asn1_per::util::hex_of_bytes;
/// assert_eq!(hex_of_bytes(vec![0xde,0xad,0xbe,0xef]), String::from("deadbeef"));
/// ```
#[must_use]
pub fn hex_of_bytes<T>(val: T) -> String
where
    T: AsRef<[u8]>,
{
    hex::encode(val)
}

/// Attempt to parse a string-like type as a hexadecimal blob, returning
/// the sequence of bytes encoded if it is a valid hex-string.
///
/// # Examples
///
/// ```
/// # use asn1_per::util::bytes_of_hex;
/// assert_eq!(Ok(vec![0xde,0xad,0xbe,0xef]), bytes_of_hex("deadbeef"));
/// ```
pub fn bytes_of_hex<T>(src: &T) -> Result<Vec<u8>, HexConvError>
where
    T: AsRef<str> + ?Sized,
{
    let src: &str = src.as_ref();
    hex::decode(src).map_err(|err| match err {
        hex::FromHexError::OddLength => HexConvError::OddParity(src.to_owned()),
        _ => HexConvError::NonHex(src.to_owned()),
    })
}

/// Number of bits required to represent every offset in a range of `range` distinct values,
/// i.e. `ceil(log2(range))`.
///
/// A range of zero or one value requires no bits at all.
#[inline]
#[must_use]
pub const fn bits_needed(range: u128) -> usize {
    if range <= 1 {
        0
    } else {
        (128 - (range - 1).leading_zeros()) as usize
    }
}

/// Number of octets needed to hold the minimal big-endian representation of `val`,
/// which is never less than one.
#[inline]
#[must_use]
pub fn octets_needed(val: u64) -> usize {
    let bits = (64 - val.leading_zeros()) as usize;
    Integer::div_ceil(&bits, &8).max(1)
}

/// Number of whole octets spanned by `bits` bits.
#[inline]
#[must_use]
pub fn octets_for_bits(bits: usize) -> usize {
    Integer::div_ceil(&bits, &8)
}
