//! Extension trait for Targets that hold their contents
//!
//! This module is dedicated to the definition of the `Builder` trait, a
//! sub-trait of `Target`, borrowing the name from the ubiquitous Haskell
//! package `bytestring`.
//!
//! # Design
//!
//! A `Builder` is a kind of `Target` that retains every bit pushed to it, and
//! which can be *finalized* into a complete octet-aligned encoding once all
//! values have been written. Finalization is where the trailing padding of a
//! PER encoding is introduced, as well as the rule that a complete encoding
//! is never empty.
//!
//! # Layout
//!
//! This module contains the definition of the `Builder` trait itself, and the
//! submodule `strict` defining [`StrictBuilder`](strict::StrictBuilder).

use crate::conv::target::Target;
use crate::util::hex_of_bytes;

/// `Target` extension trait for buffers whose contents can be retrieved
///
/// `Final` is implementation-dependent, but at the very least is required to
/// implement `Into<Vec<u8>>`. Finalizing a `Builder` with the terminal
/// operation `finalize` will consume it and return a `Self::Final` value.
pub trait Builder
where
    Self: Target + Sized,
{
    /// Type suitable for presenting the finalized contents of a `Builder` object
    type Final: Into<Vec<u8>>;

    /// Converts a `Self` value into a `Self::Final` value once it is fully built.
    ///
    /// The finalized value is padded with zero bits up to an octet boundary,
    /// and consists of the single octet `0x00` if nothing was written.
    fn finalize(self) -> Self::Final;

    /// Consume the Builder object and return a vector of its finalized contents
    fn into_vec(self) -> Vec<u8> {
        self.finalize().into()
    }

    /// Return a string consisting of the raw hexadecimal sequence of octets in the Builder
    fn into_hex(self) -> String {
        hex_of_bytes(self.into_vec())
    }

    /// Return a Builder object containing zero bits, in the ALIGNED variant.
    fn empty() -> Self {
        Self::create()
    }

    /// Determine the length of the Builder value in bits
    fn len(&self) -> usize {
        self.bit_len()
    }

    /// Returns `true` if the receiver contains no bits
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod strict;
