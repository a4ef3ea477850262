//! In-memory account representation tracked by the [`crate::Journal`].

use alloc::collections::BTreeMap;
use bitflags::bitflags;
use bytecode::Bytecode;
use primitives::{Address, B256, KECCAK_EMPTY, U256};

bitflags! {
    /// Lifecycle flags tracked per loaded account, mirroring the bookkeeping
    /// a journal needs to decide what to persist or discard at commit time.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AccountStatus: u8 {
        /// Account was loaded from the database this transaction (cold on first touch).
        const LOADED = 0b0000_0001;
        /// Account was created by this transaction (`CREATE`/`CREATE2`).
        const CREATED = 0b0000_0010;
        /// Account was touched (balance/nonce/code/storage write, or is the
        /// recipient of a zero-value call) and is a candidate for EIP-161 cleanup.
        const TOUCHED = 0b0000_0100;
        /// Account is warm per EIP-2929 (already charged the cold-access surcharge).
        const WARM = 0b0000_1000;
        /// Account was marked for destruction via `SELFDESTRUCT`.
        const SELFDESTRUCTED = 0b0001_0000;
    }
}

/// Account header fields, independent of storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    /// Wei balance.
    pub balance: U256,
    /// Transaction count / contract creation counter.
    pub nonce: u64,
    /// Keccak-256 hash of the account's code.
    pub code_hash: B256,
    /// Analyzed bytecode, `None` until first loaded (lazily fetched from the database).
    pub code: Option<Bytecode>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code_hash: KECCAK_EMPTY,
            code: None,
        }
    }
}

impl AccountInfo {
    /// Builds an externally-owned account with a balance and no code.
    pub fn from_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// True per EIP-161: zero balance, zero nonce, no code.
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code_hash == KECCAK_EMPTY
    }

    /// True if this is a contract account (non-empty code hash).
    pub fn has_code(&self) -> bool {
        self.code_hash != KECCAK_EMPTY
    }
}

/// A loaded account: its info plus the per-slot storage cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Account header.
    pub info: AccountInfo,
    /// Storage slots touched this transaction, original value included for revert/refund accounting.
    pub storage: BTreeMap<U256, StorageSlot>,
    /// Lifecycle flags.
    pub status: AccountStatus,
}

impl Account {
    /// Wraps freshly loaded account info with empty storage, marked loaded+warm.
    pub fn new_loaded(info: AccountInfo) -> Self {
        Self {
            info,
            storage: BTreeMap::new(),
            status: AccountStatus::LOADED | AccountStatus::WARM,
        }
    }

    /// True once [`AccountStatus::TOUCHED`] is set.
    pub fn is_touched(&self) -> bool {
        self.status.contains(AccountStatus::TOUCHED)
    }

    /// Sets [`AccountStatus::TOUCHED`].
    pub fn mark_touch(&mut self) {
        self.status.insert(AccountStatus::TOUCHED);
    }

    /// True if the account is warm per EIP-2929.
    pub fn is_warm(&self) -> bool {
        self.status.contains(AccountStatus::WARM)
    }

    /// Marks the account warm (first access in a transaction).
    pub fn mark_warm(&mut self) -> bool {
        let was_cold = !self.is_warm();
        self.status.insert(AccountStatus::WARM);
        was_cold
    }

    /// Clears the warm flag without a journal entry. Used only by checkpoint revert.
    pub fn mark_cold(&mut self) {
        self.status.remove(AccountStatus::WARM);
    }

    /// True if marked for destruction.
    pub fn is_selfdestructed(&self) -> bool {
        self.status.contains(AccountStatus::SELFDESTRUCTED)
    }
}

/// A single storage slot, tracking both the value as of transaction start and
/// the current value, plus whether it has been accessed this transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageSlot {
    /// Value at the start of the transaction (for SSTORE gas/refund accounting).
    pub original_value: U256,
    /// Current value.
    pub present_value: U256,
    /// True once the slot has been accessed this transaction (EIP-2929).
    pub is_warm: bool,
}

impl StorageSlot {
    /// Creates a slot freshly loaded from the database: original == present.
    pub fn new(original_value: U256) -> Self {
        Self {
            original_value,
            present_value: original_value,
            is_warm: false,
        }
    }
}
