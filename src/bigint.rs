//! Unconstrained `INTEGER` values of arbitrary magnitude
//!
//! X.691 §10.8: an unconstrained length determinant counting the octets of
//! the minimal two's-complement representation, followed by those octets.

use std::{fmt::Display, ops::Deref};

use ::num_bigint::{BigInt, Sign};

use crate::conv::{target::Target, Decode, Encode};
use crate::error::{EncodeResult, LengthError};
use crate::length::{pack_unconstrained_length, unpack_unconstrained_length};
use crate::parse::{ParseResult, Parser};

/// `INTEGER` without a value-range constraint
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Default)]
#[repr(transparent)]
pub struct Integer(pub BigInt);

impl Integer {
    pub const fn new(int: BigInt) -> Self {
        Self(int)
    }

    pub fn into_inner(self) -> BigInt {
        self.0
    }

    pub const fn as_inner(&self) -> &BigInt {
        &self.0
    }

    /// Number of content octets in the encoding of `self`
    #[must_use]
    pub fn octet_len(&self) -> usize {
        self.0.to_signed_bytes_be().len()
    }
}

impl std::fmt::Debug for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Integer({})", self.0)
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <BigInt as Display>::fmt(&self.0, f)
    }
}

impl From<BigInt> for Integer {
    fn from(val: BigInt) -> Self {
        Self(val)
    }
}

impl From<Integer> for BigInt {
    fn from(val: Integer) -> Self {
        val.0
    }
}

macro_rules! impl_int_coerce {
    ( $( $src:ty ),+ ) => {
        $(
            impl From<$src> for Integer {
                fn from(val: $src) -> Self {
                    Self(BigInt::from(val))
                }
            }

            impl TryFrom<Integer> for $src {
                type Error = <$src as TryFrom<BigInt>>::Error;

                fn try_from(val: Integer) -> Result<$src, Self::Error> {
                    <$src as TryFrom<BigInt>>::try_from(val.0)
                }
            }
        )+
    };
}

impl_int_coerce!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl Deref for Integer {
    type Target = BigInt;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Encode for Integer {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        // minimal two's complement, at least one octet
        let octets = self.0.to_signed_bytes_be();
        buf.anticipate(octets.len() * 8 + 16);
        Ok(pack_unconstrained_length(buf, octets.len())? + buf.push_all(&octets) + crate::resolve_zero!(buf))
    }
}

impl Decode for Integer {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = unpack_unconstrained_length(p)?;
        LengthError::check(len, 1, usize::MAX)?;
        let octets = p.consume_octets(len)?;
        Ok(Self(BigInt::from_signed_bytes_be(&octets)))
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Returns `true` if `val` is negative
#[must_use]
pub fn is_negative(val: &Integer) -> bool {
    val.0.sign() == Sign::Minus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::error::DecodeError;
    use crate::parse::error::{ExternalError, ParseError};

    #[test]
    fn minimal_octets() {
        assert_eq!(Integer::from(0).to_bytes().unwrap(), vec![0x01, 0x00]);
        assert_eq!(Integer::from(127).to_bytes().unwrap(), vec![0x01, 0x7f]);
        assert_eq!(Integer::from(128).to_bytes().unwrap(), vec![0x02, 0x00, 0x80]);
        assert_eq!(Integer::from(-128).to_bytes().unwrap(), vec![0x01, 0x80]);
        assert_eq!(Integer::from(-129).to_bytes().unwrap(), vec![0x02, 0xff, 0x7f]);
    }

    #[test]
    fn beyond_i64() {
        let big = Integer::from(u128::MAX);
        // 16 magnitude octets plus a sign octet
        assert_eq!(big.octet_len(), 17);
        let bytes = big.to_bytes().unwrap();
        assert_eq!(bytes[0], 17);
        assert_eq!(Integer::decode(bytes), big);
        assert!(!is_negative(&big));
        assert_eq!(u128::try_from(big).unwrap(), u128::MAX);
    }

    #[test]
    fn empty_contents() {
        assert!(matches!(
            Integer::try_decode(vec![0x00u8]),
            Err(DecodeError::Parse(ParseError::External(ExternalError::LengthViolation(_))))
        ));
    }
}
