//! A plain in-memory [`Database`], for tests and the `ecli` front end.
//!
//! Mirrors the role of the teacher's `CacheDB`/`EmptyDB` pair but flattened
//! into a single map-backed store — there is no external `DatabaseRef` layer
//! to fall back to, since nothing here needs to fetch from a real trie.

use crate::{Database, DatabaseError, DbAccount};
use alloc::collections::BTreeMap;
use bytecode::Bytecode;
use primitives::{Address, B256, U256};

/// Map-backed [`Database`] that never fails and defaults every unset
/// account/slot to its zero value.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDb {
    accounts: BTreeMap<Address, DbAccount>,
    code: BTreeMap<B256, Bytecode>,
    storage: BTreeMap<(Address, U256), U256>,
    block_hashes: BTreeMap<u64, B256>,
}

impl InMemoryDb {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account's header fields.
    pub fn set_account(&mut self, address: Address, account: DbAccount) {
        self.accounts.insert(address, account);
    }

    /// Inserts code, keyed by its own hash, and points `address` at it.
    pub fn set_code(&mut self, address: Address, code: Bytecode) {
        let hash = primitives::keccak256(code.bytes());
        self.code.insert(hash, code);
        let account = self.accounts.entry(address).or_default();
        account.code_hash = hash;
    }

    /// Sets a single storage slot directly, bypassing the journal.
    pub fn set_storage(&mut self, address: Address, key: U256, value: U256) {
        self.storage.insert((address, key), value);
    }

    /// Sets the hash returned for `BLOCKHASH(number)`.
    pub fn set_block_hash(&mut self, number: u64, hash: B256) {
        self.block_hashes.insert(number, hash);
    }
}

impl Database for InMemoryDb {
    fn basic(&mut self, address: Address) -> Result<Option<DbAccount>, DatabaseError> {
        Ok(self.accounts.get(&address).cloned())
    }

    fn storage(&mut self, address: Address, index: U256) -> Result<U256, DatabaseError> {
        Ok(self
            .storage
            .get(&(address, index))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, DatabaseError> {
        self.code
            .get(&code_hash)
            .cloned()
            .ok_or_else(|| DatabaseError(alloc::format!("no code for hash {code_hash}")))
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, DatabaseError> {
        Ok(self.block_hashes.get(&number).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_account_is_none() {
        let mut db = InMemoryDb::new();
        assert_eq!(db.basic(Address::ZERO).unwrap(), None);
    }

    #[test]
    fn unset_storage_is_zero() {
        let mut db = InMemoryDb::new();
        assert_eq!(db.storage(Address::ZERO, U256::from(1)).unwrap(), U256::ZERO);
    }

    #[test]
    fn code_round_trips_by_hash() {
        let mut db = InMemoryDb::new();
        let code = Bytecode::new_legacy(primitives::Bytes::from_static(&[0x60, 0x01]));
        let hash = primitives::keccak256(code.bytes());
        db.set_code(Address::ZERO, code.clone());
        assert_eq!(db.code_by_hash(hash).unwrap(), code);
    }
}
