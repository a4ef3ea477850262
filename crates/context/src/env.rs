//! Block- and transaction-level environment read by environment opcodes
//! (`COINBASE`, `TIMESTAMP`, `ORIGIN`, `GASPRICE`, …) and by message framing.
//!
//! Unlike [`crate::ChainRules`], which is a pure function of the hardfork,
//! these values vary per block/transaction and are supplied by the caller
//! that builds an EVM run.

use primitives::{Address, U256};

/// Per-block context visible to `COINBASE`/`TIMESTAMP`/`NUMBER`/`DIFFICULTY`
/// (`PREVRANDAO` post-Merge)/`GASLIMIT`/`BASEFEE`/`BLOCKHASH`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockEnv {
    /// `COINBASE`.
    pub coinbase: Address,
    /// `TIMESTAMP`, seconds since the Unix epoch.
    pub timestamp: U256,
    /// `NUMBER`.
    pub number: U256,
    /// `DIFFICULTY` pre-Merge, `PREVRANDAO` from the Merge on (EIP-4399
    /// repurposes the same opcode and slot).
    pub difficulty: U256,
    /// `GASLIMIT`.
    pub gas_limit: U256,
    /// `BASEFEE`, zero before London.
    pub base_fee: U256,
}

impl Default for BlockEnv {
    fn default() -> Self {
        Self {
            coinbase: Address::ZERO,
            timestamp: U256::ZERO,
            number: U256::ZERO,
            difficulty: U256::ZERO,
            gas_limit: U256::ZERO,
            base_fee: U256::ZERO,
        }
    }
}

/// Per-transaction context visible to `ORIGIN`/`GASPRICE`/`CHAINID`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEnv {
    /// `ORIGIN`: the externally-owned account that signed the transaction.
    pub origin: Address,
    /// `GASPRICE`: the effective gas price paid by this transaction.
    pub gas_price: U256,
    /// `CHAINID`.
    pub chain_id: u64,
}

impl Default for TxEnv {
    fn default() -> Self {
        Self {
            origin: Address::ZERO,
            gas_price: U256::ZERO,
            chain_id: 1,
        }
    }
}

/// Combined block/transaction environment, cheap to clone and share across
/// every call frame of one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Env {
    /// Block context.
    pub block: BlockEnv,
    /// Transaction context.
    pub tx: TxEnv,
}
