//! Sequence-type with a size constraint
//!
//! This module defines [`SeqOf<T, MIN, MAX>`], which models
//! `SEQUENCE (SIZE(MIN..MAX)) OF T`: a length determinant for the element
//! count, followed by the elements themselves.
//!
//! Values violating the size constraint cannot be constructed through the
//! checked constructors, and are rejected by `Encode` if they are produced
//! through the panicking ones regardless.

use crate::conv::{target::Target, Decode, Encode};
use crate::error::{EncodeResult, LengthError};
use crate::length::{pack_length, unpack_length};
use crate::parse::{error::ParseResult, Parser};
use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};

/// `SEQUENCE (SIZE(MIN..MAX)) OF T`
///
/// Certain trait methods, such as [`FromIterator::from_iter`], panic when
/// they would oversaturate a `SeqOf<T, MIN, MAX>` value.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[cfg_attr(feature = "serde_impls", serde(transparent))]
pub struct SeqOf<T, const MIN: usize, const MAX: usize>(Vec<T>);

impl<T, const MIN: usize, const MAX: usize> SeqOf<T, MIN, MAX> {
    /// Converts a `Vec<T>` into a `SeqOf<T, MIN, MAX>` with the same contents
    ///
    /// # Panics
    ///
    /// This method will panic if the length of `value` violates the size constraint
    pub fn from_vec(value: Vec<T>) -> Self {
        match Self::try_from(value) {
            Ok(ret) => ret,
            Err(err) => panic!("cannot construct SeqOf from provided Vec: {}", err),
        }
    }

    /// Destruct a `SeqOf<T, MIN, MAX>` into a `Vec<T>` with the same contents
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    /// Appends an element, failing if the sequence is already at capacity.
    pub fn try_push(&mut self, value: T) -> Result<(), LengthError> {
        if self.0.len() >= MAX {
            return Err(LengthError::TooLong {
                limit: MAX,
                actual: self.0.len() + 1,
            });
        }
        self.0.push(value);
        Ok(())
    }
}

impl<T, const MIN: usize, const MAX: usize> From<SeqOf<T, MIN, MAX>> for Vec<T> {
    fn from(val: SeqOf<T, MIN, MAX>) -> Self {
        val.into_vec()
    }
}

impl<T, const MIN: usize, const MAX: usize> IntoIterator for SeqOf<T, MIN, MAX> {
    type Item = T;

    type IntoIter = std::vec::IntoIter<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T: 'a, const MIN: usize, const MAX: usize> IntoIterator for &'a SeqOf<T, MIN, MAX> {
    type Item = &'a T;

    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Create a `SeqOf<T, MIN, MAX>` from an iterator
///
/// ***Panics*** if the number of elements in the iterator violates the size constraint
impl<T, const MIN: usize, const MAX: usize> FromIterator<T> for SeqOf<T, MIN, MAX> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T, const MIN: usize, const MAX: usize> Deref for SeqOf<T, MIN, MAX> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl<T, const MIN: usize, const MAX: usize> DerefMut for SeqOf<T, MIN, MAX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.deref_mut()
    }
}

impl<T, const MIN: usize, const MAX: usize> std::convert::TryFrom<&'_ [T]> for SeqOf<T, MIN, MAX>
where
    T: Clone,
{
    type Error = LengthError;

    fn try_from(slice: &[T]) -> Result<Self, Self::Error> {
        LengthError::check(slice.len(), MIN, MAX)?;
        Ok(Self(slice.to_vec()))
    }
}

impl<T, const MIN: usize, const MAX: usize> std::convert::TryFrom<Vec<T>> for SeqOf<T, MIN, MAX> {
    type Error = LengthError;

    fn try_from(value: Vec<T>) -> Result<Self, Self::Error> {
        LengthError::check(value.len(), MIN, MAX)?;
        Ok(Self(value))
    }
}

impl<T: Encode, const MIN: usize, const MAX: usize> Encode for SeqOf<T, MIN, MAX> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        let mut n = pack_length(buf, self.len(), MIN, MAX)?;
        for item in self.iter() {
            n += item.write_to(buf)?;
        }
        Ok(n + buf.resolve_zero())
    }
}

impl<T, const MIN: usize, const MAX: usize> Decode for SeqOf<T, MIN, MAX>
where
    T: Decode,
{
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = unpack_length(p, MIN, MAX)?;
        let items = (0..len).map(|_| T::parse(p)).collect::<ParseResult<Vec<T>>>()?;
        Ok(Self(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    #[test]
    fn bounded() {
        assert!(SeqOf::<bool, 1, 4>::try_from(vec![]).is_err());
        assert!(SeqOf::<bool, 1, 4>::try_from(vec![true; 5]).is_err());
        let mut s = SeqOf::<bool, 1, 2>::from_vec(vec![true]);
        assert!(s.try_push(false).is_ok());
        assert_eq!(
            s.try_push(true),
            Err(LengthError::TooLong { limit: 2, actual: 3 })
        );
    }

    #[test]
    fn transcode() {
        let s: SeqOf<u8, 1, 4> = vec![0xaa, 0xbb].into_iter().collect();
        // 2-bit count of 1, padding, two octets
        assert_eq!(s.to_bytes().unwrap(), vec![0x40, 0xaa, 0xbb]);
        assert_eq!(SeqOf::<u8, 1, 4>::decode(vec![0x40u8, 0xaa, 0xbb]), s);
        let fixed: SeqOf<bool, 3, 3> = vec![true, false, true].into_iter().collect();
        assert_eq!(fixed.to_bytes().unwrap(), vec![0b1010_0000]);
    }

    #[test]
    fn oversaturated_is_rejected() {
        let mut s = SeqOf::<bool, 0, 1>::from_vec(vec![]);
        s.0.extend([true, true]);
        assert!(matches!(s.to_bytes(), Err(EncodeError::LengthViolation(_))));
    }

    #[test]
    #[should_panic]
    fn collect_panics() {
        let _: SeqOf<bool, 0, 1> = vec![true, true].into_iter().collect();
    }
}
