//! The narrow key-value-ish interface the journal consults on a cache miss.
//!
//! This is deliberately small: block/header parsing, RLP, trie storage and
//! networking are out of scope for the core and live behind this trait so
//! tests can swap in an in-memory map.

use alloc::string::String;
use bytecode::Bytecode;
use primitives::{Address, B256, U256};

/// Error surfaced by a [`Database`] implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseError(pub String);

impl core::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "database error: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DatabaseError {}

/// Account header as stored by a [`Database`], without the lazily-populated
/// bytecode handle that [`crate::Account`] carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DbAccount {
    /// Wei balance.
    pub balance: U256,
    /// Nonce.
    pub nonce: u64,
    /// Code hash; `KECCAK_EMPTY` for an account with no code.
    pub code_hash: B256,
}

/// Backing store consulted by the [`crate::Journal`] on a cache miss.
///
/// Implementations are free to be synchronous wrappers over a trie, a flat
/// key-value store, or (in tests) a plain in-memory map.
pub trait Database {
    /// Loads account header fields, `None` if the account does not exist.
    fn basic(&mut self, address: Address) -> Result<Option<DbAccount>, DatabaseError>;

    /// Loads a single storage slot, defaulting to zero for absent slots.
    fn storage(&mut self, address: Address, index: U256) -> Result<U256, DatabaseError>;

    /// Loads bytecode by hash.
    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, DatabaseError>;

    /// Loads the hash of block `number`, used by the `BLOCKHASH` opcode.
    fn block_hash(&mut self, number: u64) -> Result<B256, DatabaseError>;
}
