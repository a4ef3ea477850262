//! Hardfork identifiers and their relative ordering.

#![allow(non_camel_case_types)]

/// An Ethereum hardfork identifier.
///
/// Ordered by activation so that `self as u8 >= other as u8` answers
/// "is `other` active at `self`" — see [`SpecId::is_enabled_in`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecId {
    /// Frontier, block 0.
    FRONTIER = 0,
    /// Homestead, block 1150000.
    HOMESTEAD,
    /// Tangerine Whistle, block 2463000.
    TANGERINE,
    /// Spurious Dragon, block 2675000.
    SPURIOUS_DRAGON,
    /// Byzantium, block 4370000.
    BYZANTIUM,
    /// Constantinople, overwritten in-place by Petersburg.
    CONSTANTINOPLE,
    /// Petersburg, block 7280000.
    PETERSBURG,
    /// Istanbul, block 9069000.
    ISTANBUL,
    /// Muir Glacier, block 9200000.
    MUIR_GLACIER,
    /// Berlin, block 12244000.
    BERLIN,
    /// London, block 12965000.
    LONDON,
    /// Arrow Glacier, block 13773000.
    ARROW_GLACIER,
    /// Gray Glacier, block 15050000.
    GRAY_GLACIER,
    /// Paris/Merge, block 15537394.
    MERGE,
    /// Shanghai, block 17034870.
    SHANGHAI,
    /// Cancun, block 19426587.
    CANCUN,
    /// Prague.
    PRAGUE,
    /// Always the most recent hardfork known to this crate.
    #[default]
    LATEST = u8::MAX,
}

impl SpecId {
    /// True if `other` is activated at or before `self`.
    #[inline]
    pub const fn is_enabled_in(self, other: Self) -> bool {
        self as u8 >= other as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_activation_order() {
        assert!(SpecId::LONDON.is_enabled_in(SpecId::BERLIN));
        assert!(!SpecId::BERLIN.is_enabled_in(SpecId::LONDON));
        assert!(SpecId::LATEST.is_enabled_in(SpecId::PRAGUE));
    }
}
