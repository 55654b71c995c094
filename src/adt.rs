//! `CHOICE` and `ENUMERATED` types as Rust enums
//!
//! A PER `CHOICE` is written as the index of the selected alternative
//! followed by the encoding of that alternative. Alternatives of the
//! extension root are indexed by a constrained whole number (preceded by an
//! extension bit if the type is extensible); extension alternatives are
//! indexed by a normally-small number and their values are wrapped as open
//! types, so that receivers that do not know them can skip over them.
//!
//! `ENUMERATED` types follow the same indexing rules without a payload.
//!
//! Rather than hand-writing these impls, the macros [`choice!`](crate::choice)
//! and [`enumerated!`](crate::enumerated) generate the enum definition along
//! with its [`Choice`] or [`Enumerated`] implementation and its `Encode` and
//! `Decode` implementations.
//!
//! ```
//! use asn1_per::{choice, Decode, Encode, RangedInt};
//!
//! choice! {
//!     #[derive(Debug, PartialEq)]
//!     pub enum Shape {
//!         Circle(RangedInt<0, 255>),
//!         Dot(()),
//!         ...,
//!         Square(u16),
//!     }
//! }
//!
//! assert_eq!(Shape::Dot(()).to_bytes().unwrap(), vec![0x40]);
//! assert_eq!(Shape::decode(vec![0x40]), Shape::Dot(()));
//! ```

use crate::conv::target::Target;
use crate::error::{BoundsError, EncodeResult};
use crate::int::{pack_constrained_offset, unpack_constrained_offset};
use crate::length::{pack_normally_small, unpack_normally_small};
use crate::parse::error::{ParseError, TagError, TokenError};
use crate::parse::{ParseResult, Parser};

/// Descriptor of a `CHOICE` type
pub trait Choice {
    /// Number of alternatives in the extension root
    const ROOT_ALTERNATIVES: usize;
    /// Whether the type has an extension marker
    const EXTENSIBLE: bool;

    /// Index of the selected alternative; extension alternatives are numbered
    /// after the root alternatives.
    fn index(&self) -> usize;

    /// Name of the selected alternative
    fn alternative_name(&self) -> &'static str;
}

/// Descriptor of an `ENUMERATED` type
pub trait Enumerated: Sized + Copy + 'static {
    /// Number of values in the extension root
    const ROOT_VALUES: usize;
    /// Whether the type has an extension marker
    const EXTENSIBLE: bool;
    /// Every known value, in index order
    const VALUES: &'static [Self];

    /// Index of the value; extension values are numbered after the root values.
    fn index(&self) -> usize;

    /// Inverse of `index`
    fn from_index(ix: usize) -> Option<Self> {
        Self::VALUES.get(ix).copied()
    }
}

/// Writes the index of a `CHOICE` alternative or `ENUMERATED` value.
pub fn pack_choice_index<U: Target>(
    buf: &mut U,
    index: usize,
    nof_root: usize,
    extensible: bool,
) -> EncodeResult<usize> {
    if index < nof_root {
        let ext = if extensible { buf.push_bit(false) } else { 0 };
        Ok(ext + pack_constrained_offset(buf, index as u64, nof_root as u128))
    } else if extensible {
        Ok(buf.push_bit(true) + pack_normally_small(buf, (index - nof_root) as u64)?)
    } else {
        tracing::error!("Choice index {} exceeds the {} root alternatives", index, nof_root);
        Err(BoundsError::Overflow {
            max: nof_root as i64 - 1,
            val: index as i64,
        }
        .into())
    }
}

/// Reads the index of a `CHOICE` alternative or `ENUMERATED` value.
///
/// The result is not checked against the number of known alternatives. An
/// extension index that does not fit a `usize` is reported as `usize::MAX`,
/// which no alternative can match.
pub fn unpack_choice_index<P: Parser>(p: &mut P, nof_root: usize, extensible: bool) -> ParseResult<usize> {
    if extensible && p.consume_bit()? {
        let ext = unpack_normally_small(p)?;
        Ok(usize::try_from(ext)
            .ok()
            .and_then(|ext| nof_root.checked_add(ext))
            .unwrap_or(usize::MAX))
    } else {
        Ok(unpack_constrained_offset(p, nof_root as u128)? as usize)
    }
}

/// Logs and constructs the error for an unknown `CHOICE` index
pub fn invalid_choice<T>(ix: usize, known: usize) -> ParseError {
    tracing::error!("Invalid choice index {} for {}", ix, std::any::type_name::<T>());
    TokenError::InvalidChoice(TagError::with_type::<T>(ix as u64, Some(known))).into()
}

/// Logs and constructs the error for an unknown `ENUMERATED` index
pub fn invalid_enumerated<T>(ix: usize, known: usize) -> ParseError {
    tracing::error!("Invalid enumerated value {} for {}", ix, std::any::type_name::<T>());
    TokenError::InvalidEnumerated(TagError::with_type::<T>(ix as u64, Some(known))).into()
}

/// Writes an `ENUMERATED` value
pub fn pack_enumerated<U: Target, E: Enumerated>(buf: &mut U, val: E) -> EncodeResult<usize> {
    pack_choice_index(buf, val.index(), E::ROOT_VALUES, E::EXTENSIBLE)
}

/// Reads an `ENUMERATED` value
pub fn unpack_enumerated<P: Parser, E: Enumerated>(p: &mut P) -> ParseResult<E> {
    let ix = unpack_choice_index(p, E::ROOT_VALUES, E::EXTENSIBLE)?;
    E::from_index(ix).ok_or_else(|| invalid_enumerated::<E>(ix, E::VALUES.len()))
}

/// Defines an enum modelling a PER `CHOICE`, one tuple variant per alternative
///
/// Alternatives listed after `...` are extension alternatives, and are encoded
/// as open types. The caller provides any derives.
#[macro_export]
macro_rules! choice {
    (
        $(#[$m:meta])*
        $v:vis enum $name:ident {
            $( $(#[$rm:meta])* $root:ident($rty:ty) ),+
            $(, ... $(, $(#[$em:meta])* $ext:ident($ety:ty) )* )?
            $(,)?
        }
    ) => {
        $(#[$m])*
        $v enum $name {
            $( $(#[$rm])* $root($rty), )+
            $($( $(#[$em])* $ext($ety), )*)?
        }

        impl $crate::adt::Choice for $name {
            const ROOT_ALTERNATIVES: usize = [$(stringify!($root)),+].len();
            const EXTENSIBLE: bool = false $( || { $( stringify!($ext); )* true } )?;

            fn index(&self) -> usize {
                #[allow(dead_code, non_camel_case_types)]
                enum Discriminant {
                    $( $root, )+
                    $($( $ext, )*)?
                }
                match self {
                    $( Self::$root(_) => Discriminant::$root as usize, )+
                    $($( Self::$ext(_) => Discriminant::$ext as usize, )*)?
                }
            }

            fn alternative_name(&self) -> &'static str {
                match self {
                    $( Self::$root(_) => stringify!($root), )+
                    $($( Self::$ext(_) => stringify!($ext), )*)?
                }
            }
        }

        impl $crate::conv::Encode for $name {
            fn write_to<U: $crate::conv::target::Target>(&self, buf: &mut U) -> $crate::error::EncodeResult<usize> {
                let tag = $crate::adt::pack_choice_index(
                    buf,
                    <Self as $crate::adt::Choice>::index(self),
                    <Self as $crate::adt::Choice>::ROOT_ALTERNATIVES,
                    <Self as $crate::adt::Choice>::EXTENSIBLE,
                )?;
                let body = match self {
                    $( Self::$root(val) => $crate::conv::Encode::write_to(val, buf)?, )+
                    $($(
                        Self::$ext(val) => $crate::dynamic::with_length_prefixed(buf, |scratch| {
                            $crate::conv::Encode::write_to(val, scratch)
                        })?,
                    )*)?
                };
                Ok(tag + body + $crate::resolve_zero!(buf))
            }
        }

        impl $crate::conv::Decode for $name {
            fn parse<P: $crate::parse::Parser>(p: &mut P) -> $crate::parse::ParseResult<Self> {
                let ix = $crate::adt::unpack_choice_index(
                    p,
                    <Self as $crate::adt::Choice>::ROOT_ALTERNATIVES,
                    <Self as $crate::adt::Choice>::EXTENSIBLE,
                )?;
                let mut _cur = 0usize;
                $(
                    if ix == _cur {
                        return Ok(Self::$root(<$rty as $crate::conv::Decode>::parse(p)?));
                    }
                    _cur += 1;
                )+
                $($(
                    if ix == _cur {
                        return Ok(Self::$ext($crate::dynamic::with_window(p, |p| {
                            <$ety as $crate::conv::Decode>::parse(p)
                        })?));
                    }
                    _cur += 1;
                )*)?
                Err($crate::adt::invalid_choice::<Self>(ix, _cur))
            }
        }
    };
}

/// Defines a fieldless enum modelling a PER `ENUMERATED` type
///
/// Values listed after `...` are extension values. The generated enum always
/// derives `Clone`, `Copy`, `Debug`, `PartialEq`, `Eq` and `Hash`.
#[macro_export]
macro_rules! enumerated {
    (
        $(#[$m:meta])*
        $v:vis enum $name:ident {
            $( $(#[$rm:meta])* $root:ident ),+
            $(, ... $(, $(#[$em:meta])* $ext:ident )* )?
            $(,)?
        }
    ) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $v enum $name {
            $( $(#[$rm])* $root, )+
            $($( $(#[$em])* $ext, )*)?
        }

        impl $crate::adt::Enumerated for $name {
            const ROOT_VALUES: usize = [$(stringify!($root)),+].len();
            const EXTENSIBLE: bool = false $( || { $( stringify!($ext); )* true } )?;
            const VALUES: &'static [Self] = &[ $( Self::$root, )+ $($( Self::$ext, )*)? ];

            fn index(&self) -> usize {
                *self as usize
            }
        }

        impl $crate::conv::Encode for $name {
            fn write_to<U: $crate::conv::target::Target>(&self, buf: &mut U) -> $crate::error::EncodeResult<usize> {
                Ok($crate::adt::pack_enumerated(buf, *self)? + $crate::resolve_zero!(buf))
            }
        }

        impl $crate::conv::Decode for $name {
            fn parse<P: $crate::parse::Parser>(p: &mut P) -> $crate::parse::ParseResult<Self> {
                $crate::adt::unpack_enumerated(p)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::adt::{Choice, Enumerated};
    use crate::conv::error::DecodeError;
    use crate::int::RangedInt;
    use crate::parse::error::{ParseError, TokenError};
    use crate::{Decode, Encode};

    enumerated! {
        pub enum Colour { Red, Green, Blue }
    }

    enumerated! {
        pub enum Size { Small, Large, ..., Huge }
    }

    choice! {
        #[derive(Debug, PartialEq)]
        pub enum Closed {
            Flag(bool),
            Number(RangedInt<0, 15>),
            Colour(Colour),
        }
    }

    choice! {
        #[derive(Debug, PartialEq)]
        pub enum Open {
            Flag(bool),
            Size(Size),
            ...,
            Wide(u16),
            Pair((bool, bool)),
        }
    }

    #[test]
    fn descriptors() {
        assert_eq!(Closed::ROOT_ALTERNATIVES, 3);
        assert!(!Closed::EXTENSIBLE);
        assert_eq!(Open::ROOT_ALTERNATIVES, 2);
        assert!(Open::EXTENSIBLE);
        assert_eq!(Open::Pair((true, true)).index(), 3);
        assert_eq!(Open::Wide(1).alternative_name(), "Wide");
        assert_eq!(Colour::ROOT_VALUES, 3);
        assert!(!Colour::EXTENSIBLE);
        assert_eq!(Size::from_index(2), Some(Size::Huge));
        assert!(Size::EXTENSIBLE);
    }

    #[test]
    fn root_alternatives() {
        // index 01, value 1010
        assert_eq!(Closed::Number(RangedInt::new(10)).to_bytes().unwrap(), vec![0b0110_1000]);
        // index 10, value 10
        assert_eq!(Closed::Colour(Colour::Blue).to_bytes().unwrap(), vec![0b1010_0000]);
        assert_eq!(Closed::decode(vec![0b0110_1000]), Closed::Number(RangedInt::new(10)));
        // ext 0, index 1, ext 0, value 1
        assert_eq!(Open::Size(Size::Large).to_bytes().unwrap(), vec![0b0101_0000]);
    }

    #[test]
    fn extension_alternatives() {
        // ext 1, normally-small 0, length 2, 0xbeef
        let bytes = Open::Wide(0xbeef).to_bytes().unwrap();
        assert_eq!(bytes, vec![0x80, 0x02, 0xbe, 0xef]);
        assert_eq!(Open::decode(bytes), Open::Wide(0xbeef));
        assert_eq!(Size::Huge.to_bytes().unwrap(), vec![0x80]);
        assert_eq!(Size::decode(vec![0x80]), Size::Huge);
    }

    #[test]
    fn unknown_indices() {
        // index 11 in a three-alternative root
        assert!(matches!(
            Closed::try_decode(vec![0b1100_0000]),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidChoice(_))))
        ));
        // third extension alternative of Open is not known
        assert!(matches!(
            Open::try_decode(vec![0x82, 0x01, 0x00]),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidChoice(_))))
        ));
        assert!(matches!(
            Colour::try_decode(vec![0b1100_0000]),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidEnumerated(_))))
        ));
    }

    #[test]
    fn huge_extension_index() {
        // ext 1, semi-constrained index of eight 0xff octets
        let bytes = [0xc0u8, 0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            Size::try_decode(bytes.to_vec()),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidEnumerated(_))))
        ));
        assert!(matches!(
            Open::try_decode(bytes.to_vec()),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidChoice(_))))
        ));
        assert!(crate::e1ap::E1apPdu::try_decode(bytes.to_vec()).is_err());
        assert!(crate::e1ap::CauseTransport::try_decode(bytes.to_vec()).is_err());
    }
}
