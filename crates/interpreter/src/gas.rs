//! Static gas costs and the dynamic-cost formulas opcode `gasFn`s consult.

use context::{ChainRules, SpecId};
use primitives::U256;

/// Cost of operations that consume no gas (e.g. `JUMPDEST` targets already
/// charged elsewhere).
pub const ZERO: u64 = 0;
/// `BASE`-tier opcodes (`ADDRESS`, `ORIGIN`, `CALLER`, …).
pub const BASE: u64 = 2;
/// `VERYLOW`-tier opcodes (`ADD`, `PUSH`, `DUP`, `SWAP`, …).
pub const VERYLOW: u64 = 3;
/// `LOW`-tier opcodes (`MUL`, `DIV`, `SIGNEXTEND`, …).
pub const LOW: u64 = 5;
/// `MID`-tier opcodes (`ADDMOD`, `MULMOD`, `JUMP`, …).
pub const MID: u64 = 8;
/// `HIGH`-tier opcodes (`JUMPI`).
pub const HIGH: u64 = 10;
/// `JUMPDEST` itself.
pub const JUMPDEST: u64 = 1;
/// Base `KECCAK256` cost, plus [`KECCAK256_WORD`] per word hashed.
pub const KECCAK256: u64 = 30;
/// Per-word cost for `KECCAK256`.
pub const KECCAK256_WORD: u64 = 6;
/// Per-word cost for `CODECOPY`/`CALLDATACOPY`/`EXTCODECOPY`/`RETURNDATACOPY`.
pub const COPY_WORD: u64 = 3;
/// Base cost of `LOG0`, plus [`LOG_TOPIC`] per topic and [`LOG_DATA`] per byte.
pub const LOG: u64 = 375;
/// Per-topic cost for `LOGn`.
pub const LOG_TOPIC: u64 = 375;
/// Per-byte cost for `LOGn` data.
pub const LOG_DATA: u64 = 8;
/// `BLOCKHASH`.
pub const BLOCKHASH: u64 = 20;
/// Cost per byte of deployed code (distilled spec §4.5 step 7).
pub const CODE_DEPOSIT_PER_BYTE: u64 = 200;
/// Base `CREATE`/`CREATE2` cost (excludes init-code hashing and deposit).
pub const CREATE: u64 = 32000;
/// Surcharge added to `CALL`-family gas when the call transfers value.
pub const CALL_VALUE: u64 = 9000;
/// Surcharge for a `CALL` that creates a new account as a side effect.
pub const NEW_ACCOUNT: u64 = 25000;
/// Gas stipend given to the callee when a call carries value.
pub const CALL_STIPEND: u64 = 2300;
/// EIP-2929 cold account/storage-slot access surcharge.
pub const COLD_ACCOUNT_ACCESS: u64 = 2600;
/// EIP-2929 cold SLOAD surcharge.
pub const COLD_SLOAD: u64 = 2100;
/// EIP-2929 warm storage read cost (also the post-Berlin base `SLOAD`).
pub const WARM_STORAGE_READ: u64 = 100;
/// Pre-Berlin flat `SLOAD` cost.
pub const SLOAD_FRONTIER: u64 = 50;
/// EIP-1884 `SLOAD` cost.
pub const SLOAD_ISTANBUL: u64 = 800;
/// `SSTORE` setting a slot from zero to non-zero.
pub const SSTORE_SET: u64 = 20000;
/// `SSTORE` modifying a non-zero slot.
pub const SSTORE_RESET: u64 = 5000;
/// Refund for clearing a storage slot to zero, pre EIP-3529.
pub const SSTORE_CLEAR_REFUND_PRE_LONDON: i64 = 15000;
/// `SELFDESTRUCT` base cost.
pub const SELFDESTRUCT: u64 = 5000;
/// `EIP-3860` per-word cost of initcode.
pub const INITCODE_WORD: u64 = 2;

/// `SLOAD` cost given hardfork and warm/cold status.
pub fn sload_cost(rules: &ChainRules, is_cold: bool) -> u64 {
    if rules.warm_cold_access() {
        if is_cold {
            COLD_SLOAD
        } else {
            WARM_STORAGE_READ
        }
    } else if rules.istanbul_repricing() {
        SLOAD_ISTANBUL
    } else {
        SLOAD_FRONTIER
    }
}

/// Cold-access surcharge for `EXTCODESIZE`/`EXTCODEHASH`/`BALANCE`/`CALL`-family,
/// zero once the address is warm or pre-Berlin (folded into the opcode's base fee then).
pub fn cold_account_access_cost(rules: &ChainRules, is_cold: bool) -> u64 {
    if !rules.warm_cold_access() {
        return 0;
    }
    if is_cold {
        COLD_ACCOUNT_ACCESS
    } else {
        WARM_STORAGE_READ
    }
}

/// `SSTORE` gas charge (excludes refund bookkeeping, see [`sstore_refund`]).
///
/// `original`/`current`/`new` follow distilled-spec §4 `StorageSlot`
/// semantics: `original` is the transaction-start value, `current` the
/// present value before this write.
pub fn sstore_cost(rules: &ChainRules, original: U256, current: U256, new: U256) -> u64 {
    if !rules.istanbul_repricing() {
        // Frontier/Homestead/Byzantium/Constantinople-without-net-gas schedule.
        return if current.is_zero() && !new.is_zero() {
            SSTORE_SET
        } else if !current.is_zero() && new.is_zero() {
            SSTORE_RESET
        } else {
            SSTORE_RESET
        };
    }
    // EIP-2200/EIP-1283 net-metered schedule, carried through Berlin's EIP-2929 split.
    let warm_sload = if rules.warm_cold_access() {
        WARM_STORAGE_READ
    } else {
        SLOAD_ISTANBUL
    };
    if current == new {
        return warm_sload;
    }
    if original == current {
        return if original.is_zero() { SSTORE_SET } else { SSTORE_RESET };
    }
    warm_sload
}

/// `SSTORE` refund delta for this write (distilled spec Glossary "Refund counter").
pub fn sstore_refund(rules: &ChainRules, original: U256, current: U256, new: U256) -> i64 {
    if !rules.istanbul_repricing() {
        return if !current.is_zero() && new.is_zero() {
            SSTORE_CLEAR_REFUND_PRE_LONDON
        } else {
            0
        };
    }
    let clears_schedule = if rules.reduced_refunds() {
        (SSTORE_RESET - COLD_SLOAD + ACCESS_LIST_STORAGE_KEY) as i64
    } else {
        SSTORE_CLEAR_REFUND_PRE_LONDON
    };
    if current == new {
        return 0;
    }
    let mut refund = 0i64;
    if !original.is_zero() {
        if current.is_zero() {
            refund -= clears_schedule;
        } else if new.is_zero() {
            refund += clears_schedule;
        }
    }
    if original == new {
        let (reset, sload) = if rules.warm_cold_access() {
            (SSTORE_RESET - COLD_SLOAD, WARM_STORAGE_READ)
        } else {
            (SSTORE_RESET, SLOAD_ISTANBUL)
        };
        if original.is_zero() {
            refund += (SSTORE_SET - sload) as i64;
        } else {
            refund += (reset - sload) as i64;
        }
    }
    refund
}

/// EIP-2929 access-list entry cost, used only by the (out-of-scope) tx
/// driver; kept here because [`sstore_refund`] references the constant for
/// the post-London clears schedule.
pub const ACCESS_LIST_STORAGE_KEY: u64 = 1900;

/// Gas cost of `CODECOPY`/`CALLDATACOPY`/`EXTCODECOPY`/`RETURNDATACOPY`'s
/// per-word component for `len` bytes.
pub fn copy_word_cost(len: usize) -> u64 {
    crate::memory::num_words(len) as u64 * COPY_WORD
}

/// `KECCAK256` cost for hashing `len` bytes.
pub fn keccak256_cost(len: usize) -> u64 {
    KECCAK256 + crate::memory::num_words(len) as u64 * KECCAK256_WORD
}

/// `LOGn` cost for `n` topics and `data_len` bytes.
pub fn log_cost(n: u8, data_len: usize) -> u64 {
    LOG + LOG_TOPIC * n as u64 + LOG_DATA * data_len as u64
}

/// `EXP` cost: base 10 plus a per-byte-of-exponent surcharge (50 before
/// Spurious Dragon, 10 from Spurious Dragon on).
pub fn exp_cost(rules: &ChainRules, exponent: U256) -> u64 {
    const EXP: u64 = 10;
    if exponent.is_zero() {
        return EXP;
    }
    let byte_len = (exponent.bit_len() + 7) / 8;
    let per_byte = if rules.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        50
    } else {
        10
    };
    EXP + per_byte * byte_len as u64
}

/// Maximum refund as a fraction of execution gas used (distilled spec
/// Glossary "Refund counter").
pub fn max_refund(rules: &ChainRules, execution_gas_used: u64) -> u64 {
    execution_gas_used / rules.refund_quotient() as u64
}
