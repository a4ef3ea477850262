//! The narrow key-value interface [`ReceiptStore`](crate::ReceiptStore) is
//! built on (distilled spec §5: "Storage for the `ReceiptStore` is accessed
//! through an external key-value interface; its concurrency contract is:
//! single writer per key at a time, reads may proceed concurrently").
//!
//! This crate never picks a concrete backing store; callers plug in
//! whatever durable KV engine their client already uses. [`InMemoryKvStore`]
//! exists only for tests, mirroring the role `state::InMemoryDb` plays for
//! the `state` crate.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Byte-string key/value storage, read/write/delete only — exactly what
/// [`ReceiptStore`](crate::ReceiptStore) needs and nothing a particular
/// backing engine might add (iteration, transactions, compaction...).
///
/// Fallible: a real disk-backed store can fail on write, and the save path
/// must surface that (distilled spec §5: "loss of a save corrupts lookups
/// and must be reported"). Index deletion errors are deliberately discarded
/// by the caller instead of widening this trait with a "best effort" mode.
pub trait KvStore {
    /// Error type for a failed read/write/delete.
    type Error: core::fmt::Debug;
    /// Looks up `key`, `None` if absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error>;
    /// Inserts or overwrites `key`.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), Self::Error>;
    /// Removes `key` if present; removing an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error>;
}

/// Map-backed [`KvStore`] for tests and single-process tools.
#[derive(Default)]
pub struct InMemoryKvStore {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKvStore {
    /// An empty store.
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }
}

impl KvStore for InMemoryKvStore {
    type Error = core::convert::Infallible;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.map.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), Self::Error> {
        self.map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error> {
        self.map.remove(key);
        Ok(())
    }
}
