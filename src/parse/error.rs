//! Error types used to report failure in low-level parsing
//!
//! This module contains a hierarchy of types representing specific
//! classes of error that may arise as a result of calls to
//! [`Parser`](crate::parse::Parser) methods, or to the decoding
//! primitives built on top of them.
//!
//! # Layout
//!
//! This module defines the primary type `ParseError` and the alias
//! `ParseResult<T>`; it additionally defines various type-level refinements of
//! `ParseError`, grouped according to similar provenance or nature.

use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};

use crate::error::{BoundsError, LengthError, WidthError};
use crate::ie::Criticality;

/// Enumeration type over all errors that may be encountered when calling
/// methods on `Parser` types, or when decoding values through them.
#[derive(Debug)]
pub enum ParseError {
    /// Error class encountered when opening, closing, or checking context windows,
    /// including every attempt to read past the end of the buffer.
    Window(WindowError),
    /// Error class encountered when internal invariants or preconditions are violated
    Internal(InternalError),
    /// Error class encountered when low-level parsing is successful but
    /// the resultant raw value violates the constraints of the type being decoded.
    External(ExternalError),
    /// Error class encountered when the bits in the buffer cannot be
    /// interpreted in the current context, such as out-of-range choice indices.
    Token(TokenError),
    /// Error class encountered when the members of a protocol-IE container
    /// do not match its object set.
    Ie(IeError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::Window(err) => Display::fmt(err, f),
            ParseError::Internal(err) => Display::fmt(err, f),
            ParseError::External(err) => Display::fmt(err, f),
            ParseError::Token(err) => Display::fmt(err, f),
            ParseError::Ie(err) => Display::fmt(err, f),
        }
    }
}

impl From<Infallible> for ParseError {
    fn from(_void: Infallible) -> Self {
        match _void {}
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Window(err) => Some(err),
            ParseError::Internal(err) => Some(err),
            ParseError::External(err) => Some(err),
            ParseError::Token(err) => Some(err),
            ParseError::Ie(err) => Some(err),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors related to context-windows and buffer bounds
///
/// All offsets and widths are measured in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Error case when a method that attempts to consume some number
    /// of bits from the buffer of a `Parser` would violate either
    /// the absolute end-of-buffer or the current context-window in
    /// doing so.
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// Error case when a method call attempts to open a window
    /// that, if created, would extend beyond the final bit in
    /// the parse-buffer.
    OpenWouldExceedBuffer { bits_left: usize, request: usize },
    /// Error case when a method call attempts to open a window
    /// whose end lies beyond the end of the narrowest open
    /// context-window.
    OpenWouldExceedWindow { limit: usize, request: usize },
    /// Error case when a method call attempts to close the narrowest open
    /// context-window but there are unconsumed bits remaining within said
    /// window.
    CloseWithResidue { residual: usize },
    /// Error case when a method call attempts to close the narrowest open
    /// context-window, but there are no open context-windows to begin with.
    CloseWithoutWindow,
    /// The current offset of a Parser exceeds the bounds of the narrowest
    /// open context-window.
    ///
    /// It is a critical error in the implementation of a parser if this error is
    /// ever reported.
    OffsetOverflow { excess: usize },
}

impl From<WindowError> for ParseError {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

impl Display for WindowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            WindowError::ConsumeWouldExceedLimit {
                limit,
                offset,
                requested,
            } => {
                write!(
                    f,
                    "cannot consume {} bits (currently at bit {} out of limit {})",
                    requested, offset, limit
                )
            }
            WindowError::OpenWouldExceedBuffer { bits_left, request } => {
                if bits_left == 0 {
                    write!(
                        f,
                        "cannot open {}-bit context window: parse-buffer has been fully consumed",
                        request
                    )
                } else {
                    write!(
                        f,
                        "cannot open {}-bit context window: parse-buffer has only {} bits remaining",
                        request, bits_left
                    )
                }
            }
            WindowError::OpenWouldExceedWindow { limit, request } => {
                write!(
                    f,
                    "cannot open context window ending at bit {}: current window ends at bit {}",
                    request, limit
                )
            }
            WindowError::CloseWithResidue { residual } => {
                write!(f, "cannot close context window with {} residual bits", residual)
            }
            WindowError::CloseWithoutWindow => write!(f, "no context window to close"),
            WindowError::OffsetOverflow { excess } => {
                write!(
                    f,
                    "BUG: detected an offset that exceeds the current limit by {} bits",
                    excess
                )
            }
        }
    }
}

impl Error for WindowError {}

/// Errors arising from unexpected tokens in the buffer
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenError {
    /// Decoded CHOICE index does not select a known alternative
    InvalidChoice(TagError),
    /// Decoded ENUMERATED index does not select a known value
    InvalidEnumerated(TagError),
    /// Decoded discriminant (e.g. a procedure code) is not recognized
    InvalidTag(TagError),
    /// Length determinant uses the fragmented form, which is not supported
    FragmentedLength { prefix: u8 },
    /// Implicitly zero-valued padding contained non-zero bits
    NonZeroPadding { padding: u64, width: usize },
    /// Character outside of the permitted alphabet of a restricted string type
    InvalidCharacter(u8),
}

impl From<TokenError> for ParseError {
    fn from(tok_e: TokenError) -> Self {
        Self::Token(tok_e)
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InvalidChoice(err) => write!(f, "invalid choice index: {}", err),
            Self::InvalidEnumerated(err) => write!(f, "invalid enumerated value: {}", err),
            Self::InvalidTag(err) => write!(f, "invalid tag: {}", err),
            Self::FragmentedLength { prefix } => {
                write!(f, "fragmented length determinant (prefix {:#04x}) is not supported", prefix)
            }
            Self::NonZeroPadding { padding, width } => {
                write!(f, "non-zero padding {:#0b} found in {}-bit alignment gap", padding, width)
            }
            Self::InvalidCharacter(c) => {
                write!(f, "character {:#04x} is not permitted by the string alphabet", c)
            }
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TokenError::InvalidChoice(err)
            | TokenError::InvalidEnumerated(err)
            | TokenError::InvalidTag(err) => Some(err),
            TokenError::FragmentedLength { .. }
            | TokenError::NonZeroPadding { .. }
            | TokenError::InvalidCharacter(_) => None,
        }
    }
}

/// Error representing invalid discriminant values, such as CHOICE indices,
/// ENUMERATED indices or procedure codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    actual: u64,
    for_type: &'static str,
    known: Option<usize>,
}

impl TagError {
    /// Constructs a `TagError` with the provided type-name `for_type`, and
    /// the number of known discriminants, if that is meaningful.
    pub fn new(actual: u64, for_type: &'static str, known: Option<usize>) -> Self {
        Self {
            actual,
            for_type,
            known,
        }
    }

    /// Constructs a `TagError` using an inferred type-name via [`std::any::type_name`]
    pub fn with_type<U>(actual: u64, known: Option<usize>) -> Self
    where
        U: ?Sized,
    {
        Self {
            actual,
            for_type: std::any::type_name::<U>(),
            known,
        }
    }

    /// Returns the raw discriminant that was rejected
    pub fn actual(&self) -> u64 {
        self.actual
    }
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.known {
            Some(n) => write!(
                f,
                "unexpected discriminant {} for type {} ({} known)",
                self.actual, self.for_type, n
            ),
            None => write!(f, "unexpected discriminant {} for type {}", self.actual, self.for_type),
        }
    }
}

impl Error for TagError {}

/// Implementation-internal errors
///
/// This error class represents certain 'impossible' cases, which signify
/// a violation of a precondition for calling certain `Parser` methods.
#[derive(Debug, Clone, Copy)]
pub enum InternalError {
    /// More bits requested in a single integral read than fit in a `u64`
    WidthOverflow { requested: usize },
}

impl From<InternalError> for ParseError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            InternalError::WidthOverflow { requested } => {
                write!(f, "cannot read {}-bit field into a 64-bit integer", requested)
            }
        }
    }
}

impl Error for InternalError {}

/// Enumerated type representing contextually invalid results obtained from otherwise
/// succesfully executed method calls to a Parser object.
#[derive(Debug)]
pub enum ExternalError {
    /// An integral value parsed from the buffer fell outside of the valid range
    /// of its constrained type.
    IntRangeViolation(BoundsError<i64>),
    /// A bit-string parsed from the buffer violated its size constraint.
    WidthViolation(WidthError),
    /// A length determinant or element-count violated its size constraint.
    LengthViolation(LengthError),
}

impl<T> From<T> for ParseError
where
    ExternalError: From<T>,
{
    fn from(err: T) -> Self {
        ParseError::External(ExternalError::from(err))
    }
}

impl From<BoundsError<i64>> for ExternalError {
    fn from(err: BoundsError<i64>) -> Self {
        Self::IntRangeViolation(err)
    }
}

impl From<LengthError> for ExternalError {
    fn from(err: LengthError) -> Self {
        Self::LengthViolation(err)
    }
}

impl From<WidthError> for ExternalError {
    fn from(err: WidthError) -> Self {
        Self::WidthViolation(err)
    }
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ExternalError::IntRangeViolation(x) => write!(f, "{}", x),
            ExternalError::LengthViolation(x) => write!(f, "{}", x),
            ExternalError::WidthViolation(x) => write!(f, "{}", x),
        }
    }
}

impl Error for ExternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExternalError::IntRangeViolation(err) => Some(err),
            ExternalError::WidthViolation(err) => Some(err),
            ExternalError::LengthViolation(err) => Some(err),
        }
    }
}

/// Errors raised while decoding a protocol-IE container against its object set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IeError {
    /// IE identifier is not a member of the object set
    UnknownId {
        object_set: &'static str,
        id: u16,
        criticality: Criticality,
    },
    /// One or more mandatory IEs were absent once the container was exhausted
    MissingMandatory {
        object_set: &'static str,
        missing: Vec<u16>,
    },
    /// The same IE identifier occurred more than once
    Duplicate { object_set: &'static str, id: u16 },
}

impl From<IeError> for ParseError {
    fn from(err: IeError) -> Self {
        Self::Ie(err)
    }
}

impl Display for IeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            IeError::UnknownId {
                object_set,
                id,
                criticality,
            } => write!(
                f,
                "IE id {} (criticality {:?}) is not recognized by {}",
                id, criticality, object_set
            ),
            IeError::MissingMandatory { object_set, missing } => {
                write!(f, "mandatory IEs {:?} of {} are missing", missing, object_set)
            }
            IeError::Duplicate { object_set, id } => {
                write!(f, "IE id {} occurs more than once in {}", id, object_set)
            }
        }
    }
}

impl Error for IeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn parse_error_threadsafe() {
        dummy::<ParseError>()
    }

    #[test]
    fn conversions() {
        let err: ParseError = BoundsError::Overflow { max: 3i64, val: 4 }.into();
        assert!(matches!(
            err,
            ParseError::External(ExternalError::IntRangeViolation(BoundsError::Overflow { .. }))
        ));
        let err: ParseError = TokenError::FragmentedLength { prefix: 0xc1 }.into();
        assert_eq!(
            err.to_string(),
            "fragmented length determinant (prefix 0xc1) is not supported"
        );
    }
}
