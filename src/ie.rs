//! Protocol-IE containers and the object sets that govern them
//!
//! Every 3GPP application protocol carries the contents of its messages as a
//! *ProtocolIE-Container*: a `SEQUENCE (SIZE(0..65535)) OF` triples of an IE
//! identifier, a [`Criticality`] and the IE value as an open type. Which
//! identifiers may occur in a given container, with which criticality and
//! whether they must be present, is described by an *object set*, modelled
//! here by the [`ObjectSet`] trait and its lazily-built [`IeTable`].
//!
//! The macro [`protocol_ies!`](crate::protocol_ies) declares a container
//! struct with one field per IE, together with its object set and its
//! `Encode` and `Decode` impls:
//!
//! ```
//! use asn1_per::{protocol_ies, Decode, Encode, RangedInt};
//!
//! protocol_ies! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct PingIes {
//!         mandatory sequence: RangedInt<0, 255> = (1u16, Reject),
//!         optional urgent: bool = (2u16, Ignore),
//!     }
//! }
//!
//! let ies = PingIes { sequence: RangedInt::new(9), urgent: None };
//! let bytes = ies.to_bytes().unwrap();
//! assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x09]);
//! assert_eq!(PingIes::decode(bytes), ies);
//! ```
//!
//! # Decoding policy
//!
//! By default, an IE whose identifier is not in the object set fails the
//! decode regardless of its criticality. With the feature
//! `criticality_aware_ies`, such an IE is skipped (with a warning) unless its
//! criticality is `reject`.

use std::collections::HashMap;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::adt::{pack_enumerated, unpack_enumerated, Enumerated};
use crate::conv::{target::Target, Decode, Encode};
use crate::dynamic::{pack_open_octets, skip_open_type, unpack_open_octets, with_length_prefixed, with_window};
use crate::error::EncodeResult;
use crate::int::{pack_constrained_whole_number, unpack_constrained_whole_number};
use crate::length::{pack_length, unpack_length};
use crate::parse::error::{IeError, ParseError};
use crate::parse::{ParseResult, Parser};
use crate::schema::{finish_sequence, pack_preamble, unpack_preamble};
use crate::seq::SeqOf;

/// `maxProtocolIEs`, the largest number of IEs in a single container
pub const MAX_PROTOCOL_IES: usize = 65535;

/// `maxProtocolExtensions`
pub const MAX_PROTOCOL_EXTENSIONS: usize = 65535;

/// Largest IE identifier (`ProtocolIE-ID ::= INTEGER (0..65535)`)
const MAX_IE_ID: i64 = 65535;

/// `Criticality ::= ENUMERATED { reject, ignore, notify }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[repr(u8)]
pub enum Criticality {
    Reject = 0,
    Ignore = 1,
    Notify = 2,
}

impl Enumerated for Criticality {
    const ROOT_VALUES: usize = 3;
    const EXTENSIBLE: bool = false;
    const VALUES: &'static [Self] = &[Criticality::Reject, Criticality::Ignore, Criticality::Notify];

    fn index(&self) -> usize {
        u8::from(*self) as usize
    }

    fn from_index(ix: usize) -> Option<Self> {
        u8::try_from(ix).ok().and_then(|v| Self::try_from(v).ok())
    }
}

impl Encode for Criticality {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        pack_enumerated(buf, *self)
    }
}

impl Decode for Criticality {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        unpack_enumerated(p)
    }
}

/// `Presence ::= ENUMERATED { optional, conditional, mandatory }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub enum Presence {
    Optional,
    Conditional,
    Mandatory,
}

/// One row of an object set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IeSpec {
    pub id: u16,
    pub criticality: Criticality,
    pub presence: Presence,
    /// Name of the value type, for diagnostics
    pub value: &'static str,
}

/// Immutable lookup table over the rows of an object set
#[derive(Debug)]
pub struct IeTable {
    name: &'static str,
    specs: Vec<IeSpec>,
    index: HashMap<u16, usize>,
}

impl IeTable {
    /// Builds the table for the object set `name`.
    ///
    /// # Panics
    ///
    /// Panics if two rows share an identifier.
    pub fn new(name: &'static str, specs: Vec<IeSpec>) -> Self {
        let mut index = HashMap::with_capacity(specs.len());
        for (ix, spec) in specs.iter().enumerate() {
            if let Some(prev) = index.insert(spec.id, ix) {
                panic!(
                    "object set {} declares IE id {} at both rows {} and {}",
                    name, spec.id, prev, ix
                );
            }
        }
        Self { name, specs, index }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Row number of the IE with identifier `id`
    #[must_use]
    pub fn position(&self, id: u16) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[must_use]
    pub fn get(&self, id: u16) -> Option<&IeSpec> {
        self.position(id).map(|ix| &self.specs[ix])
    }

    #[must_use]
    pub fn spec_at(&self, ix: usize) -> Option<&IeSpec> {
        self.specs.get(ix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IeSpec> {
        self.specs.iter()
    }
}

/// Descriptor of the object set governing a protocol-IE container
///
/// Only [`table`](ObjectSet::table) is required; every other method is a
/// lookup into it.
pub trait ObjectSet {
    fn table() -> &'static IeTable;

    /// Identifier of the `ix`th row
    fn idx_to_id(ix: usize) -> Option<u16> {
        Self::table().spec_at(ix).map(|spec| spec.id)
    }

    fn is_id_valid(id: u16) -> bool {
        Self::table().position(id).is_some()
    }

    fn get_crit(id: u16) -> Option<Criticality> {
        Self::table().get(id).map(|spec| spec.criticality)
    }

    fn get_presence(id: u16) -> Option<Presence> {
        Self::table().get(id).map(|spec| spec.presence)
    }

    /// Name of the value type carried under `id`
    fn get_value(id: u16) -> Option<&'static str> {
        Self::table().get(id).map(|spec| spec.value)
    }

    fn nof_mandatory() -> usize {
        Self::table()
            .iter()
            .filter(|spec| spec.presence == Presence::Mandatory)
            .count()
    }

    fn mandatory_ids() -> Vec<u16> {
        Self::table()
            .iter()
            .filter(|spec| spec.presence == Presence::Mandatory)
            .map(|spec| spec.id)
            .collect()
    }
}

/// Identifier and criticality preceding an IE value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IeHeader {
    pub id: u16,
    pub criticality: Criticality,
}

/// Writes the IE count of a container.
pub fn pack_ie_count<U: Target>(buf: &mut U, count: usize) -> EncodeResult<usize> {
    pack_length(buf, count, 0, MAX_PROTOCOL_IES)
}

/// Writes a single IE: its identifier, its criticality and its value as an open type.
pub fn pack_ie<U, T>(buf: &mut U, id: u16, criticality: Criticality, value: &T) -> EncodeResult<usize>
where
    U: Target,
    T: Encode + ?Sized,
{
    let head = pack_constrained_whole_number(buf, i64::from(id), 0, MAX_IE_ID)? + criticality.write_to(buf)?;
    Ok(head + with_length_prefixed(buf, |scratch| value.write_to(scratch))?)
}

fn unpack_ie_header<P: Parser>(p: &mut P) -> ParseResult<IeHeader> {
    let id = unpack_constrained_whole_number(p, 0, MAX_IE_ID)? as u16;
    let criticality = Criticality::parse(p)?;
    Ok(IeHeader { id, criticality })
}

/// Logs and constructs the error for mandatory IEs absent from a container
pub fn missing_mandatory(object_set: &'static str, missing: Vec<u16>) -> ParseError {
    tracing::error!("Mandatory fields are missing: {:?} in {}", missing, object_set);
    IeError::MissingMandatory { object_set, missing }.into()
}

/// Reads a protocol-IE container governed by the object set `O`.
///
/// For each IE whose identifier belongs to `O`, `f` is called with a parser
/// restricted to the IE value, which it must consume entirely. Returns the
/// number of IEs read.
///
/// # Errors
///
/// Besides any error returned by `f`, decoding fails on an identifier outside
/// of `O` (see the module-level decoding policy), on a repeated identifier,
/// and when a mandatory IE of `O` is absent.
pub fn unpack_ies<P, O, F>(p: &mut P, mut f: F) -> ParseResult<usize>
where
    P: Parser,
    O: ObjectSet + ?Sized,
    F: FnMut(&mut P, IeHeader) -> ParseResult<()>,
{
    let table = O::table();
    let n = unpack_length(p, 0, MAX_PROTOCOL_IES)?;
    let mut seen = vec![false; table.len()];
    for _ in 0..n {
        let header = unpack_ie_header(p)?;
        let Some(ix) = table.position(header.id) else {
            if cfg!(feature = "criticality_aware_ies") && header.criticality != Criticality::Reject {
                let octets = skip_open_type(p)?;
                tracing::warn!(
                    "Skipping unrecognized object ID={} ({:?}, {} octets) in {}",
                    header.id,
                    header.criticality,
                    octets,
                    table.name()
                );
                continue;
            }
            tracing::error!("Unpacked object ID={} is not recognized", header.id);
            return Err(IeError::UnknownId {
                object_set: table.name(),
                id: header.id,
                criticality: header.criticality,
            }
            .into());
        };
        if seen[ix] {
            tracing::error!("Object ID={} occurs more than once in {}", header.id, table.name());
            return Err(IeError::Duplicate {
                object_set: table.name(),
                id: header.id,
            }
            .into());
        }
        seen[ix] = true;
        let expected = table.specs[ix].criticality;
        if header.criticality != expected {
            tracing::debug!(
                "Object ID={} has criticality {:?} where {:?} was expected",
                header.id,
                header.criticality,
                expected
            );
        }
        with_window(p, |p| f(p, header))?;
    }
    let missing: Vec<u16> = table
        .iter()
        .zip(seen)
        .filter(|(spec, seen)| spec.presence == Presence::Mandatory && !seen)
        .map(|(spec, _)| spec.id)
        .collect();
    if !missing.is_empty() {
        return Err(missing_mandatory(table.name(), missing));
    }
    Ok(n)
}

/// Expands the per-presence pieces of a [`protocol_ies!`](crate::protocol_ies) field
#[doc(hidden)]
#[macro_export]
macro_rules! ie_field {
    (@ty mandatory $t:ty) => { $t };
    (@ty optional $t:ty) => { ::std::option::Option<$t> };
    (@ty conditional $t:ty) => { ::std::option::Option<$t> };

    (@presence mandatory) => { $crate::ie::Presence::Mandatory };
    (@presence optional) => { $crate::ie::Presence::Optional };
    (@presence conditional) => { $crate::ie::Presence::Conditional };

    (@present mandatory $f:expr) => { true };
    (@present $_p:ident $f:expr) => { $f.is_some() };

    (@pack mandatory $buf:ident, $id:expr, $crit:expr, $f:expr) => {
        $crate::ie::pack_ie($buf, $id, $crit, $f)?
    };
    (@pack $_p:ident $buf:ident, $id:expr, $crit:expr, $f:expr) => {
        match $f {
            ::std::option::Option::Some(val) => $crate::ie::pack_ie($buf, $id, $crit, val)?,
            ::std::option::Option::None => 0,
        }
    };

    (@take mandatory $f:ident, $set:expr, $id:expr) => {
        match $f {
            ::std::option::Option::Some(val) => val,
            ::std::option::Option::None => {
                return Err($crate::ie::missing_mandatory($set, ::std::vec![$id]))
            }
        }
    };
    (@take $_p:ident $f:ident, $set:expr, $id:expr) => { $f };
}

/// Declares a protocol-IE container: a struct with one field per IE, its
/// [`ObjectSet`] impl, and its `Encode` and `Decode` impls
///
/// Each field is introduced by its presence (`mandatory`, `optional` or
/// `conditional`) and followed by the IE identifier (anything convertible
/// into a `u16`) and criticality. Optional and conditional IEs are held as
/// `Option`s. IEs are written in declaration order.
#[macro_export]
macro_rules! protocol_ies {
    (
        $(#[$m:meta])*
        $v:vis struct $name:ident {
            $(
                $(#[$fm:meta])*
                $presence:ident $field:ident : $ty:ty = ($id:expr, $crit:ident)
            ),* $(,)?
        }
    ) => {
        $(#[$m])*
        $v struct $name {
            $( $(#[$fm])* pub $field: $crate::ie_field!(@ty $presence $ty), )*
        }

        impl $name {
            /// Number of IEs that are present
            pub fn nof_ies(&self) -> usize {
                0usize $( + usize::from($crate::ie_field!(@present $presence self.$field)) )*
            }
        }

        impl $crate::ie::ObjectSet for $name {
            fn table() -> &'static $crate::ie::IeTable {
                $crate::lazy_static! {
                    static ref TABLE: $crate::ie::IeTable = $crate::ie::IeTable::new(
                        stringify!($name),
                        ::std::vec![
                            $(
                                $crate::ie::IeSpec {
                                    id: ::std::primitive::u16::from($id),
                                    criticality: $crate::ie::Criticality::$crit,
                                    presence: $crate::ie_field!(@presence $presence),
                                    value: stringify!($ty),
                                },
                            )*
                        ],
                    );
                }
                &*TABLE
            }
        }

        impl $crate::conv::Encode for $name {
            fn write_to<U: $crate::conv::target::Target>(&self, buf: &mut U) -> $crate::error::EncodeResult<usize> {
                let mut n = $crate::ie::pack_ie_count(buf, self.nof_ies())?;
                $(
                    n += $crate::ie_field!(
                        @pack $presence buf,
                        ::std::primitive::u16::from($id),
                        $crate::ie::Criticality::$crit,
                        &self.$field
                    );
                )*
                Ok(n + $crate::resolve_zero!(buf))
            }
        }

        impl $crate::conv::Decode for $name {
            fn parse<P: $crate::parse::Parser>(p: &mut P) -> $crate::parse::ParseResult<Self> {
                $( let mut $field: ::std::option::Option<$ty> = ::std::option::Option::None; )*
                let _ = $crate::ie::unpack_ies::<P, Self, _>(p, |_p, _header| {
                    $(
                        if _header.id == ::std::primitive::u16::from($id) {
                            $field = ::std::option::Option::Some(<$ty as $crate::conv::Decode>::parse(_p)?);
                            return Ok(());
                        }
                    )*
                    Ok(())
                })?;
                let _set = <Self as $crate::ie::ObjectSet>::table().name();
                Ok(Self {
                    $(
                        $field: $crate::ie_field!(
                            @take $presence $field, _set, ::std::primitive::u16::from($id)
                        ),
                    )*
                })
            }
        }
    };
}

/// `SEQUENCE { protocolIEs ProtocolIE-Container, ... }`, the body of every
/// E1AP message
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct Message<C> {
    pub protocol_ies: C,
}

impl<C> Message<C> {
    pub fn new(protocol_ies: C) -> Self {
        Self { protocol_ies }
    }
}

impl<C: Encode> Encode for Message<C> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        Ok(pack_preamble(buf, true, &[]) + self.protocol_ies.write_to(buf)?)
    }
}

impl<C: Decode> Decode for Message<C> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let preamble = unpack_preamble(p, true, 0)?;
        let protocol_ies = C::parse(p)?;
        finish_sequence(p, &preamble)?;
        Ok(Self { protocol_ies })
    }
}

/// An IE whose value is carried as uninterpreted octets
///
/// This is the element of a [`ExtensionContainer`] (`ProtocolExtensionField`),
/// whose object sets are empty for every type this library defines.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
pub struct RawIe {
    pub id: u16,
    pub criticality: Criticality,
    pub value: Vec<u8>,
}

impl Encode for RawIe {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        let head = pack_constrained_whole_number(buf, i64::from(self.id), 0, MAX_IE_ID)?
            + self.criticality.write_to(buf)?;
        Ok(head + pack_open_octets(buf, &self.value)?)
    }
}

impl Decode for RawIe {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let IeHeader { id, criticality } = unpack_ie_header(p)?;
        let value = unpack_open_octets(p)?;
        Ok(Self {
            id,
            criticality,
            value,
        })
    }
}

/// `ProtocolExtensionContainer`, held opaquely
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[cfg_attr(feature = "serde_impls", serde(transparent))]
pub struct ExtensionContainer(pub SeqOf<RawIe, 1, MAX_PROTOCOL_EXTENSIONS>);

impl Encode for ExtensionContainer {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        self.0.write_to(buf)
    }
}

impl Decode for ExtensionContainer {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self(SeqOf::parse(p)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::error::DecodeError;
    use crate::int::RangedInt;

    protocol_ies! {
        #[derive(Clone, Debug, PartialEq)]
        pub struct TestIes {
            mandatory first: RangedInt<0, 255> = (10u16, Reject),
            optional second: bool = (11u16, Ignore),
            mandatory third: u16 = (12u16, Ignore),
        }
    }

    fn sample() -> TestIes {
        TestIes {
            first: RangedInt::new(5),
            second: None,
            third: 0x1234,
        }
    }

    const SAMPLE: [u8; 13] = [
        0x00, 0x02, // count
        0x00, 0x0a, 0x00, 0x01, 0x05, // id 10, reject, value
        0x00, 0x0c, 0x40, 0x02, 0x12, 0x34, // id 12, ignore, value
    ];

    #[test]
    fn object_set() {
        assert_eq!(TestIes::idx_to_id(1), Some(11));
        assert_eq!(TestIes::idx_to_id(3), None);
        assert!(TestIes::is_id_valid(12));
        assert!(!TestIes::is_id_valid(13));
        assert_eq!(TestIes::get_crit(10), Some(Criticality::Reject));
        assert_eq!(TestIes::get_presence(11), Some(Presence::Optional));
        assert_eq!(TestIes::get_value(12), Some("u16"));
        assert_eq!(TestIes::nof_mandatory(), 2);
        assert_eq!(TestIes::mandatory_ids(), vec![10, 12]);
        assert_eq!(TestIes::table().name(), "TestIes");
    }

    #[test]
    #[should_panic]
    fn duplicate_rows() {
        let row = IeSpec {
            id: 1,
            criticality: Criticality::Reject,
            presence: Presence::Mandatory,
            value: "bool",
        };
        let _ = IeTable::new("Bad", vec![row.clone(), row]);
    }

    #[test]
    fn container_layout() {
        let ies = sample();
        assert_eq!(ies.nof_ies(), 2);
        assert_eq!(ies.to_bytes().unwrap(), SAMPLE.to_vec());
        assert_eq!(TestIes::decode(SAMPLE.to_vec()), ies);

        let full = TestIes {
            second: Some(true),
            ..sample()
        };
        assert_eq!(full.nof_ies(), 3);
        assert_eq!(TestIes::decode(full.to_bytes().unwrap()), full);
    }

    #[test]
    fn missing_mandatory_ie() {
        let bytes = [0x00u8, 0x01, 0x00, 0x0a, 0x00, 0x01, 0x05];
        match TestIes::try_decode(bytes.to_vec()) {
            Err(DecodeError::Parse(ParseError::Ie(IeError::MissingMandatory { object_set, missing }))) => {
                assert_eq!(object_set, "TestIes");
                assert_eq!(missing, vec![12]);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn duplicate_ie() {
        let bytes = [
            0x00u8, 0x02, 0x00, 0x0a, 0x00, 0x01, 0x05, 0x00, 0x0a, 0x00, 0x01, 0x05,
        ];
        assert!(matches!(
            TestIes::try_decode(bytes.to_vec()),
            Err(DecodeError::Parse(ParseError::Ie(IeError::Duplicate { id: 10, .. })))
        ));
    }

    #[test]
    fn unknown_reject_ie() {
        let bytes = [0x00u8, 0x01, 0x00, 0x63, 0x00, 0x01, 0x05];
        assert!(matches!(
            TestIes::try_decode(bytes.to_vec()),
            Err(DecodeError::Parse(ParseError::Ie(IeError::UnknownId {
                id: 99,
                criticality: Criticality::Reject,
                ..
            })))
        ));
    }

    #[test]
    fn unknown_ignore_ie() {
        let mut bytes = vec![0x00u8, 0x03, 0x00, 0x63, 0x40, 0x01, 0xff];
        bytes.extend_from_slice(&SAMPLE[2..]);
        let res = TestIes::try_decode(bytes);
        #[cfg(feature = "criticality_aware_ies")]
        assert_eq!(res.unwrap(), sample());
        #[cfg(not(feature = "criticality_aware_ies"))]
        assert!(matches!(
            res,
            Err(DecodeError::Parse(ParseError::Ie(IeError::UnknownId {
                id: 99,
                criticality: Criticality::Ignore,
                ..
            })))
        ));
    }

    #[test]
    fn mismatched_criticality_is_accepted() {
        // id 10 sent as ignore although the object set says reject
        let mut bytes = SAMPLE.to_vec();
        bytes[4] = 0x40;
        assert_eq!(TestIes::decode(bytes), sample());
    }

    #[test]
    fn truncated_container() {
        assert!(TestIes::try_decode(SAMPLE[..SAMPLE.len() - 1].to_vec()).is_err());
    }

    #[test]
    fn message_wrapper() {
        let msg = Message::new(sample());
        let bytes = msg.to_bytes().unwrap();
        assert_eq!(bytes[0], 0x00);
        assert_eq!(&bytes[1..], &SAMPLE[..]);
        assert_eq!(Message::<TestIes>::decode(bytes), msg);
    }

    #[test]
    fn extension_container() {
        let ext = ExtensionContainer(SeqOf::from_vec(vec![RawIe {
            id: 300,
            criticality: Criticality::Ignore,
            value: vec![0xab],
        }]));
        // count 1 as 16-bit offset 0, id 300, ignore, length 1, value
        let bytes = ext.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x01, 0x2c, 0x40, 0x01, 0xab]);
        assert_eq!(ExtensionContainer::decode(bytes), ext);
    }

    #[test]
    fn criticality_codes() {
        assert_eq!(Criticality::Notify.to_bytes().unwrap(), vec![0x80]);
        assert_eq!(Criticality::decode(vec![0x40u8]), Criticality::Ignore);
        assert_eq!(u8::from(Criticality::Ignore), 1);
        assert!(Criticality::try_decode(vec![0xc0u8]).is_err());
    }
}
