//! Runtime for the ASN.1 Packed Encoding Rules as used by 3GPP application protocols
//!
//! # Overview
//!
//! This library provides the primitives that per-message bindings for protocols such as
//! E1AP (3GPP TS 38.463) are built from: a bit-level writer and reader, the integer and
//! length-determinant encodings of ITU-T X.691, open-type framing, `CHOICE` dispatch, and
//! the `ProtocolIE-Container` model in which every message body is expressed as a list of
//! `{id, criticality, value}` triples.
//!
//! Both variants of PER are supported. The ALIGNED variant (APER), which pads certain fields
//! to octet boundaries and is what the 3GPP protocols use on the wire, is the default; the
//! UNALIGNED variant (UPER) is selected per builder or parser through [`Variant`].
//!
//! The high-level traits [`Encode`] and [`Decode`] are the keystones of the library. Every
//! ASN.1 type is modelled by a Rust type implementing both, and composite types are encoded
//! by structural induction over their components:
//!
//! * `INTEGER (lb..ub)` and `INTEGER (lb..ub, ...)` by [`RangedInt`], and the unsigned
//!   machine integers; unconstrained `INTEGER` by [`bigint::Integer`]
//! * `SEQUENCE` by structs deriving [`Encode`] and [`Decode`]
//! * `SEQUENCE OF` by [`SeqOf`]
//! * `CHOICE` and `ENUMERATED` by the enums generated by [`choice!`] and [`enumerated!`]
//! * `OCTET STRING`, `BIT STRING` and `PrintableString` by the types in [`string`]
//! * `ProtocolIE-Container` by the structs generated by [`protocol_ies!`]
//!
//! # Errors
//!
//! Encoding never truncates: a value that violates its constraints yields an
//! [`EncodeError`](error::EncodeError), and nothing is written for the offending field.
//! Decoding stops at the first malformed field and reports a [`ParseError`], which is
//! wrapped in a [`DecodeError`](conv::error::DecodeError) by the top-level methods. Failures
//! are also logged through `tracing` at the point where they are detected.
//!
//! # Example
//!
//! ```
//! use asn1_per::e1ap::*;
//! use asn1_per::{Decode, Encode, RangedInt};
//!
//! let release = BearerContextReleaseCmdIes {
//!     gnb_cu_cp_ue_e1ap_id: RangedInt::new(7),
//!     gnb_cu_up_ue_e1ap_id: RangedInt::new(42),
//!     cause: Cause::RadioNetwork(CauseRadioNetwork::Unspecified),
//! };
//! let bytes = release.to_bytes().unwrap();
//! assert_eq!(&bytes[..2], &[0x00, 0x03]);
//! assert_eq!(BearerContextReleaseCmdIes::decode(bytes), release);
//! ```

extern crate decode_derive;
extern crate encode_derive;

// lets the derive macros name this crate as `asn1_per` from inside it
extern crate self as asn1_per;

pub mod adt;
pub mod bigint;
pub mod builder;
pub mod conv;
pub mod dynamic;
pub mod e1ap;
pub mod error;
pub mod ie;
pub mod int;
mod internal;
pub mod length;
pub mod parse;
pub mod prim;
pub mod schema;
pub mod seq;
pub mod string;
pub mod util;
pub mod variant;


pub use crate::builder::{strict::StrictBuilder, Builder};
pub use crate::conv::{
    error::{DecodeError, DecodeResult},
    target::{BitCounter, Target},
    Decode, Encode, EncodeLength,
};
pub use crate::dynamic::OpenType;
pub use crate::error::{EncodeError, EncodeResult};
pub use crate::ie::{Criticality, ExtensionContainer, Message, ObjectSet, Presence};
pub use crate::int::RangedInt;
pub use crate::parse::{bitparser::BitParser, error::ParseError, ParseResult, Parser, TryIntoParser};
pub use crate::schema::Null;
pub use crate::seq::SeqOf;
pub use crate::string::{BitString, OctetString, PrintableString};
pub use crate::variant::Variant;

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;
pub use ::lazy_static::lazy_static;
