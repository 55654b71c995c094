use bitvec::prelude::{BitSlice, Msb0};

use crate::variant::Variant;

/// Marker trait for bit-oriented buffers with incremental append operations
///
/// In most ways, it is convenient to think of `Target` as an analogous trait to
/// [`std::io::Write`], at the granularity of individual bits rather than bytes.
/// The principal difference between the two is the fact that the `push_XXX`
/// methods on `Target` are infallible and total; while they return a `usize`
/// value representing the number of bits written, this is used only for
/// summary book-keeping on the caller side, rather than a feedback mechanism
/// that may indicate failure or partial success.
///
/// Every `Target` carries the PER [`Variant`] it is being written in, which
/// encoders consult to decide whether alignment padding is emitted.
///
/// All implementors of `Target` must define the `push_XXX` methods as infallible and total.
pub trait Target {
    /// Performs any necessary operations that amortize the cost incurred by
    /// writing a certain number of additional bits to the end of the `Target`,
    /// over the course of an unknown number of push operations.
    ///
    /// For many implementors, this may simply be a no-op.
    fn anticipate(&mut self, extra_bits: usize);

    /// Returns a fresh object of the `Self` type with an initially empty buffer,
    /// in the ALIGNED variant.
    fn create() -> Self
    where
        Self: Sized,
    {
        Self::create_with(Variant::Aligned)
    }

    /// Returns a fresh object of the `Self` type with an initially empty buffer,
    /// in the specified variant.
    fn create_with(variant: Variant) -> Self
    where
        Self: Sized;

    /// PER variant the target is written in
    fn variant(&self) -> Variant;

    /// Returns `true` if alignment padding is to be emitted
    #[inline]
    fn aligned(&self) -> bool {
        self.variant().is_aligned()
    }

    /// Number of bits written so far
    fn bit_len(&self) -> usize;

    /// Appends a single bit, returning `1`.
    fn push_bit(&mut self, bit: bool) -> usize;

    /// Appends the `nbits` least-significant bits of `val`, most-significant first.
    ///
    /// The return value must be `nbits`, which callers guarantee to be at most 64.
    fn push_bits(&mut self, val: u64, nbits: usize) -> usize;

    /// Appends a single octet, returning `8`.
    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push_bits(u64::from(b), 8)
    }

    /// Appends the octets of an arbitrary-length byte-slice, without alignment.
    ///
    /// The operational semantics of this method should be indistinguishable
    /// from repeated calls to `push_one` over every element of the slice in
    /// order, and the return value must be eight times the length of the slice.
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.iter().map(|b| self.push_one(*b)).sum()
    }

    /// Appends the contents of a bit-slice verbatim.
    fn push_bitslice(&mut self, bits: &BitSlice<u8, Msb0>) -> usize;

    /// Appends zero bits up to the next octet boundary, returning the number of
    /// padding bits written.
    ///
    /// This is unconditional; callers are responsible for consulting
    /// [`aligned`](Target::aligned) first.
    fn align(&mut self) -> usize {
        let gap = (8 - self.bit_len() % 8) % 8;
        self.push_bits(0, gap)
    }

    /// Performs any necessary internal stateful operations that 'book-end' a sequence of `push_XXX` operations
    /// to record and preserve the fact that they represent a logical unit.
    ///
    /// By definition, the effect of this function must not have influence on the actual contents of the buffer
    /// beyond internal division or segmentation, and so a default no-op implementation is provided.
    #[inline(always)]
    fn resolve(&mut self) {}

    /// Perform the associated `Target::resolve` call on the argument expression and return `0usize`
    ///
    /// # Note
    ///
    /// No matter how it is implemented, the return value should always be `0`.
    #[inline]
    fn resolve_zero(&mut self) -> usize {
        self.resolve();
        0
    }
}

#[macro_export]
macro_rules! resolve_zero {
    ( $buf:expr ) => {{
        $crate::conv::target::Target::resolve($buf);
        0
    }};
}

/// Zero-allocation `Target` used to count the number of bits required to
/// serialize an arbitrary-typed object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCounter {
    bits: usize,
    variant: Variant,
}

impl Target for BitCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn create_with(variant: Variant) -> Self {
        Self { bits: 0, variant }
    }

    #[inline]
    fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    fn bit_len(&self) -> usize {
        self.bits
    }

    #[inline(always)]
    fn push_bit(&mut self, _: bool) -> usize {
        self.bits += 1;
        1
    }

    #[inline(always)]
    fn push_bits(&mut self, _: u64, nbits: usize) -> usize {
        self.bits += nbits;
        nbits
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.bits += buf.len() * 8;
        buf.len() * 8
    }

    #[inline(always)]
    fn push_bitslice(&mut self, bits: &BitSlice<u8, Msb0>) -> usize {
        self.bits += bits.len();
        bits.len()
    }
}
