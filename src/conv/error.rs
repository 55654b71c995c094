use crate::{error::HexConvError, parse::error::ParseError};

/// Error type returned by the top-level decoding methods of [`Decode`](super::Decode)
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    Conv(HexConvError),
    Parse(ParseError),
    /// Bits left over after the value and its final padding (feature `check_complete_parse`)
    NonEmpty(usize),
}

impl From<std::convert::Infallible> for DecodeError {
    fn from(_void: std::convert::Infallible) -> Self {
        match _void {}
    }
}

impl From<HexConvError> for DecodeError {
    fn from(err: HexConvError) -> Self {
        Self::Conv(err)
    }
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Conv(err) => {
                write!(f, "hex conversion encountered error: {}", err)
            }
            DecodeError::Parse(err) => {
                write!(f, "parser encountered error: {}", err)
            }
            DecodeError::NonEmpty(bits) => {
                write!(f, "parser had {} unconsumed bits left over after decoding", bits)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Conv(err) => Some(err),
            DecodeError::Parse(err) => Some(err),
            DecodeError::NonEmpty(_) => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
