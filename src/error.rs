//! General error types
//!
//! This module contains the constraint-violation types that are shared
//! between the encoding and decoding halves of the library, as well as
//! [`EncodeError`], the sole error type returned by [`Encode`](crate::Encode)
//! methods.
//!
//! Errors specific to parsing live in [`crate::parse::error`].

use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Debug, Display};
use std::num::TryFromIntError;

/// Enumerated error type for failures related to schema constructs
/// that impose a check on the bit-width of their prospective values,
/// such as sized `BIT STRING` types.
///
/// Structurally similar to [`LengthError`], an analoguous error-type
/// relating to the number of elements in a collection-type, rather than
/// the number of bits in a potentially opaque schema type.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum WidthError {
    /// Restriction on maximum bit-width exceeded
    TooWide { limit: usize, actual: usize },
    /// Restriction on minimum bit-width not satisfied
    TooNarrow { limit: usize, actual: usize },
    /// Requirement of precise bit-width not satisfied
    WrongWidth { exact: usize, actual: usize },
}

impl WidthError {
    /// Checks that `actual` lies within `[min, max]`, returning the appropriate
    /// error case otherwise.
    pub fn check(actual: usize, min: usize, max: usize) -> Result<usize, Self> {
        if min == max && actual != min {
            Err(Self::WrongWidth { exact: min, actual })
        } else if actual < min {
            Err(Self::TooNarrow { limit: min, actual })
        } else if actual > max {
            Err(Self::TooWide { limit: max, actual })
        } else {
            Ok(actual)
        }
    }
}

impl Display for WidthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidthError::TooWide { limit, actual } => {
                write!(f, "{actual}-bit value exceeded limit of {limit} bits")
            }
            WidthError::TooNarrow { limit, actual } => {
                write!(f, "{actual}-bit value fell short of minimum of {limit} bits")
            }
            WidthError::WrongWidth { exact, actual } => {
                write!(f, "{actual}-bit value violated requirement of {exact} bits")
            }
        }
    }
}

impl Error for WidthError {}

/// Enumerated error type for failures related to schema constructs
/// that impose a check on the element-count of their prospective
/// values, which are typically collection types or length determinants.
///
/// Structurally similar to [`WidthError`], an analogous error-type
/// relating to the bit-width of a potentially opaque schema type,
/// rather than the number of elements in a collection-type.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Restriction on maximum element-count exceeded
    TooLong { limit: usize, actual: usize },
    /// Restriction on minimum element-count not satisfied
    TooShort { limit: usize, actual: usize },
    /// Requirement of precise element-count not satisfied
    WrongLength { exact: usize, actual: usize },
}

impl LengthError {
    /// Checks that the element-count `actual` lies within `[min, max]`.
    pub fn check(actual: usize, min: usize, max: usize) -> Result<usize, Self> {
        if min == max && actual != min {
            Err(Self::WrongLength { exact: min, actual })
        } else if actual < min {
            Err(Self::TooShort { limit: min, actual })
        } else if actual > max {
            Err(Self::TooLong { limit: max, actual })
        } else {
            Ok(actual)
        }
    }
}

impl Display for LengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooLong { limit, actual } => {
                write!(f, "{actual}-element value exceeded limit of {limit} elements")
            }
            LengthError::TooShort { limit, actual } => {
                write!(f, "{actual}-element value fell short of minimum of {limit} elements")
            }
            LengthError::WrongLength { exact, actual } => {
                write!(f, "{actual}-element value violated requirement of {exact} elements")
            }
        }
    }
}

impl Error for LengthError {}

/// Error type representing all possible conditions for invalidity
/// encountered when attempting to parse a string-type as a series
/// of hex-encoded bytes.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd)]
pub enum HexConvError {
    /// Error case for odd-length strings
    OddParity(String),
    /// Error case for strings containing non-hex characters,
    /// i.e. anything not in `[0-9a-fA-F]`.
    NonHex(String),
}

impl Debug for HexConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(invalid) => {
                write!(f, "non-even length-parity for string `{}`", invalid)
            }
            Self::NonHex(invalid) => write!(f, "non-hex character found in string `{}`", invalid),
        }
    }
}

impl Display for HexConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(_) => {
                write!(f, "hex-conversion failed on odd-length string")
            }
            Self::NonHex(_) => {
                write!(f, "hex-conversion failed on non-hex character")
            }
        }
    }
}

impl Error for HexConvError {}

/// Error type representing invalidity of (numeric) values
/// based on an implicit lower and upper bound.
///
/// * `Underflow {..}` contains the illegal value in question, as well as the lower bound it falls below
/// * `Overflow {..}` contains the illegal value in question, as well as the upper bound it falls above
///
/// The generic parameter `Ext` is the type used to hold both the value and the bounds; in
/// practice this is `i64` for every constrained `INTEGER` this library supports.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BoundsError<Ext: Debug> {
    Underflow { min: Ext, val: Ext },
    Overflow { max: Ext, val: Ext },
    InvalidBounds { min: Ext, max: Ext },
    Failed(TryFromIntError),
}

impl<Ext: Debug> From<Infallible> for BoundsError<Ext> {
    fn from(_void: Infallible) -> Self {
        match _void {}
    }
}

impl<Ext: Debug> From<TryFromIntError> for BoundsError<Ext> {
    fn from(err: TryFromIntError) -> Self {
        Self::Failed(err)
    }
}

impl<Ext: Debug + PartialOrd + Copy> BoundsError<Ext> {
    /// Checks that a value `val` falls into the specified range `[min, max]`, returning
    /// `Ok(val)` if this condition holds.
    ///
    /// If `min > max`, returns `Err(BoundsError::InvalidBounds { .. })` regardless of `val`.
    ///
    /// If `val < min`, returns `Err(BoundsError::Underflow { .. })`
    ///
    /// If `val > max`, returns `Err(BoundsError::Overflow { .. })`
    pub fn restrict(val: Ext, min: Ext, max: Ext) -> Result<Ext, Self> {
        if min > max {
            Err(Self::InvalidBounds { min, max })
        } else if val < min {
            Err(Self::Underflow { min, val })
        } else if val > max {
            Err(Self::Overflow { max, val })
        } else {
            Ok(val)
        }
    }
}

impl<Ext: Debug + Display> Display for BoundsError<Ext> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundsError::Underflow { ref min, ref val } => {
                write!(f, "provided value {} less than minimum bound {}", val, min)
            }
            BoundsError::Overflow { ref max, ref val } => {
                write!(f, "provided value {} greater than maximum bound {}", val, max)
            }
            BoundsError::InvalidBounds { ref min, ref max } => {
                write!(f, "min <= max is not satisfied for the range ({},{})", min, max)
            }
            BoundsError::Failed(err) => {
                write!(f, "could not convert for bounds-checking: {}", err)
            }
        }
    }
}

impl<Ext: Display + Debug> std::error::Error for BoundsError<Ext> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type returned by every fallible encoding operation
///
/// Encoding only fails when a value violates the constraints of the
/// type it is being encoded as; nothing is ever truncated to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// Integer value outside of its non-extensible value range
    IntRangeViolation(BoundsError<i64>),
    /// Element-count or length determinant outside of its size constraint
    LengthViolation(LengthError),
    /// Bit-width of a sized `BIT STRING` outside of its size constraint
    WidthViolation(WidthError),
    /// Length determinant that would require fragmentation (16K or more)
    UnsupportedLength { length: usize },
    /// Character outside of the permitted alphabet of a restricted string type
    InvalidCharacter(char),
}

impl From<BoundsError<i64>> for EncodeError {
    fn from(err: BoundsError<i64>) -> Self {
        Self::IntRangeViolation(err)
    }
}

impl From<LengthError> for EncodeError {
    fn from(err: LengthError) -> Self {
        Self::LengthViolation(err)
    }
}

impl From<WidthError> for EncodeError {
    fn from(err: WidthError) -> Self {
        Self::WidthViolation(err)
    }
}

impl From<Infallible> for EncodeError {
    fn from(_void: Infallible) -> Self {
        match _void {}
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::IntRangeViolation(err) => write!(f, "cannot encode integer: {}", err),
            EncodeError::LengthViolation(err) => write!(f, "cannot encode length: {}", err),
            EncodeError::WidthViolation(err) => write!(f, "cannot encode bit-string: {}", err),
            EncodeError::UnsupportedLength { length } => {
                write!(f, "length determinant {} requires fragmentation, which is not supported", length)
            }
            EncodeError::InvalidCharacter(c) => {
                write!(f, "character {:?} is not permitted by the string alphabet", c)
            }
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodeError::IntRangeViolation(err) => Some(err),
            EncodeError::LengthViolation(err) => Some(err),
            EncodeError::WidthViolation(err) => Some(err),
            EncodeError::UnsupportedLength { .. } | EncodeError::InvalidCharacter(_) => None,
        }
    }
}

/// Type alias for Result with an error type of [`EncodeError`]
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn encode_error_threadsafe() {
        dummy::<EncodeError>()
    }

    #[test]
    fn restrict_bounds() {
        assert_eq!(BoundsError::restrict(5i64, 0, 10), Ok(5));
        assert_eq!(
            BoundsError::restrict(11i64, 0, 10),
            Err(BoundsError::Overflow { max: 10, val: 11 })
        );
        assert_eq!(
            BoundsError::restrict(-1i64, 0, 10),
            Err(BoundsError::Underflow { min: 0, val: -1 })
        );
        assert_eq!(
            BoundsError::restrict(0i64, 3, 2),
            Err(BoundsError::InvalidBounds { min: 3, max: 2 })
        );
    }

    #[test]
    fn length_check() {
        assert_eq!(LengthError::check(3, 1, 5), Ok(3));
        assert_eq!(LengthError::check(0, 1, 5), Err(LengthError::TooShort { limit: 1, actual: 0 }));
        assert_eq!(LengthError::check(6, 1, 5), Err(LengthError::TooLong { limit: 5, actual: 6 }));
        assert_eq!(LengthError::check(4, 3, 3), Err(LengthError::WrongLength { exact: 3, actual: 4 }));
    }
}
