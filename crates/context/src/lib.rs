//! Hardfork-parameterized chain rules: gas prices, feature flags and
//! precompile activation, looked up by [`SpecId`].
//!
//! Nothing here touches execution state; [`ChainRules`] is a pure function
//! of the active hardfork, shared-immutable across every call in a
//! transaction.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod env;
mod spec_id;

pub use env::{BlockEnv, Env, TxEnv};
pub use spec_id::SpecId;

use primitives::Address;

/// Hardfork-parameterized gas/price/feature lookups consulted by the
/// interpreter, message framing and precompile dispatch.
///
/// Constructed once per EVM (or per transaction, if the hardfork can change
/// mid-chain) and passed down by reference; it owns no mutable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainRules {
    spec_id: SpecId,
}

impl ChainRules {
    /// Builds the rule set for `spec_id`.
    pub const fn new(spec_id: SpecId) -> Self {
        Self { spec_id }
    }

    /// The active hardfork.
    #[inline]
    pub const fn spec_id(&self) -> SpecId {
        self.spec_id
    }

    /// True if `other` is activated at or before the active hardfork.
    #[inline]
    pub const fn is_enabled_in(&self, other: SpecId) -> bool {
        self.spec_id.is_enabled_in(other)
    }

    /// EIP-2929: cold SLOAD / cold account access surcharge active.
    #[inline]
    pub const fn warm_cold_access(&self) -> bool {
        self.is_enabled_in(SpecId::BERLIN)
    }

    /// EIP-3529: refund cap `gas/5` instead of `gas/2`, and smaller
    /// SSTORE-clear refund.
    #[inline]
    pub const fn reduced_refunds(&self) -> bool {
        self.is_enabled_in(SpecId::LONDON)
    }

    /// Divisor of `executionGas` used to cap the refund counter.
    #[inline]
    pub const fn refund_quotient(&self) -> i64 {
        if self.reduced_refunds() {
            5
        } else {
            2
        }
    }

    /// EIP-170: deployed-code size limit is enforced (unless the EVM was
    /// built with `allow_unlimited_contract_size`).
    #[inline]
    pub const fn enforces_max_code_size(&self) -> bool {
        self.is_enabled_in(SpecId::SPURIOUS_DRAGON)
    }

    /// EIP-3541: CREATE/CREATE2 reject runtime code starting with `0xEF`.
    #[inline]
    pub const fn rejects_eof_prefixed_code(&self) -> bool {
        self.is_enabled_in(SpecId::LONDON)
    }

    /// EIP-3860: initcode size limit and per-word initcode gas are active.
    #[inline]
    pub const fn enforces_initcode_limit(&self) -> bool {
        self.is_enabled_in(SpecId::SHANGHAI)
    }

    /// EIP-1884: `SLOAD` repriced, `SELFBALANCE` introduced.
    #[inline]
    pub const fn istanbul_repricing(&self) -> bool {
        self.is_enabled_in(SpecId::ISTANBUL)
    }

    /// EIP-2028: calldata non-zero byte cost reduced 68 -> 16.
    #[inline]
    pub const fn cheap_calldata(&self) -> bool {
        self.is_enabled_in(SpecId::ISTANBUL)
    }

    /// Pre-Byzantium receipts encode a post-state root; Byzantium onward
    /// encode a status code.
    #[inline]
    pub const fn status_code_receipts(&self) -> bool {
        self.is_enabled_in(SpecId::BYZANTIUM)
    }

    /// EIP-1153: `TLOAD`/`TSTORE` transient storage is available.
    #[inline]
    pub const fn has_transient_storage(&self) -> bool {
        self.is_enabled_in(SpecId::CANCUN)
    }

    /// EIP-3198: `BASEFEE` opcode is available.
    #[inline]
    pub const fn has_basefee_opcode(&self) -> bool {
        self.is_enabled_in(SpecId::LONDON)
    }

    /// Highest precompile address active at this hardfork (addresses
    /// `0x01..=N`). Tops out at `0x09` (Blake2F, Istanbul) — point
    /// evaluation (Cancun, `0x0A`) and the BLS12-381 suite (Prague,
    /// `0x0B..=0x11`) are out of scope here, so later hardforks don't widen
    /// the active range any further.
    pub fn max_precompile_address(&self) -> u8 {
        if self.is_enabled_in(SpecId::ISTANBUL) {
            0x09
        } else if self.is_enabled_in(SpecId::BYZANTIUM) {
            0x08
        } else {
            0x04
        }
    }

    /// True if `address` falls in the fixed precompile range for this
    /// hardfork.
    pub fn is_precompile(&self, address: Address) -> bool {
        let bytes = address.as_slice();
        if bytes[..19].iter().any(|b| *b != 0) {
            return false;
        }
        let last = bytes[19];
        last != 0 && last <= self.max_precompile_address()
    }
}

impl Default for ChainRules {
    fn default() -> Self {
        Self::new(SpecId::LATEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_has_no_eip2929() {
        let rules = ChainRules::new(SpecId::FRONTIER);
        assert!(!rules.warm_cold_access());
        assert_eq!(rules.refund_quotient(), 2);
    }

    #[test]
    fn london_reduces_refunds() {
        let rules = ChainRules::new(SpecId::LONDON);
        assert!(rules.reduced_refunds());
        assert_eq!(rules.refund_quotient(), 5);
    }

    #[test]
    fn precompile_range_grows_with_hardfork() {
        let byzantium = ChainRules::new(SpecId::BYZANTIUM);
        assert_eq!(byzantium.max_precompile_address(), 0x08);
        let istanbul = ChainRules::new(SpecId::ISTANBUL);
        assert_eq!(istanbul.max_precompile_address(), 0x09);
        let prague = ChainRules::new(SpecId::PRAGUE);
        assert_eq!(prague.max_precompile_address(), 0x09);
    }
}
