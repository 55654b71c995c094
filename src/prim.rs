//! Primitive schema types: `NULL`, `BOOLEAN`, and anonymous tuples of fields

use crate::conv::{target::Target, Decode, Encode};
use crate::error::EncodeResult;
use crate::parse::{ParseResult, Parser};

/// `NULL` contributes no bits to a PER encoding
impl Encode for () {
    #[inline(always)]
    fn write_to<U: Target>(&self, _: &mut U) -> EncodeResult<usize> {
        Ok(0)
    }
}

impl Decode for () {
    #[inline]
    fn parse<P: Parser>(_: &mut P) -> ParseResult<()> {
        Ok(())
    }
}

impl Encode for bool {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        Ok(buf.push_bit(*self) + crate::resolve_zero!(buf))
    }
}

impl Decode for bool {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.consume_bit()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
        self.as_ref().write_to(buf)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Box::new(T::parse(p)?))
    }
}

macro_rules! tuple_impls {
    ( $( ( $( $t:ident : $ix:tt ),+ ) ),+ $(,)? ) => {
        $(
            impl<$($t: Encode),+> Encode for ($($t,)+) {
                fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
                    Ok(0 $( + self.$ix.write_to(buf)? )+ + crate::resolve_zero!(buf))
                }
            }

            impl<$($t: Decode),+> Decode for ($($t,)+) {
                fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                    Ok(( $( $t::parse(p)?, )+ ))
                }
            }
        )+
    };
}

tuple_impls! {
    (A: 0, B: 1),
    (A: 0, B: 1, C: 2),
    (A: 0, B: 1, C: 2, D: 3),
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::conv::EncodeLength;
    use crate::{Builder, StrictBuilder};

    #[test]
    fn unit_test() {
        assert_eq!((), <()>::decode("00"));
        assert_eq!(().enc_bits().unwrap(), 0);
    }

    #[test]
    fn bools() {
        let b = (true, false, true, true).encode::<StrictBuilder>().unwrap();
        assert_eq!(b.len(), 4);
        assert_eq!(b.into_vec(), vec![0b1011_0000]);
        assert_eq!(<(bool, bool)>::decode([0b0100_0000u8]), (false, true));
    }
}
