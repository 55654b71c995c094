//! Selection between the ALIGNED and UNALIGNED variants of PER

/// The two variants of the Packed Encoding Rules.
///
/// The ALIGNED variant (APER) inserts zero-bit padding before certain
/// fields so that they start on an octet boundary; the UNALIGNED variant
/// (UPER) never pads. E1AP and its sibling 3GPP protocols use APER, which
/// is therefore the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Aligned,
    Unaligned,
}

impl Variant {
    #[inline]
    #[must_use]
    pub const fn is_aligned(self) -> bool {
        matches!(self, Variant::Aligned)
    }
}

impl From<bool> for Variant {
    fn from(aligned: bool) -> Self {
        if aligned {
            Variant::Aligned
        } else {
            Variant::Unaligned
        }
    }
}
