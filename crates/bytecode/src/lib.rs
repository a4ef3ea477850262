//! Legacy EVM bytecode and its `JUMPDEST` analysis.
//!
//! A [`Bytecode`] is analyzed exactly once, at the point it is loaded for a
//! call: the analysis walks the byte string, skipping `PUSHn` immediates, and
//! records which offsets hold a `0x5B` (`JUMPDEST`) opcode that is a genuine
//! instruction boundary rather than push data. `JUMP`/`JUMPI` consult this set
//! to reject jumps into the middle of a `PUSH` argument.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod jump_table;

pub use jump_table::JumpTable;

use alloc::sync::Arc;
use alloc::vec::Vec;
use primitives::{keccak256, Bytes, B256, KECCAK_EMPTY};

/// `PUSH1` opcode, first of the push range.
pub const PUSH1: u8 = 0x60;
/// `PUSH32` opcode, last of the push range.
pub const PUSH32: u8 = 0x7f;
/// `JUMPDEST` opcode.
pub const JUMPDEST: u8 = 0x5b;

/// Shared, analyzed legacy bytecode.
///
/// Cloning a `Bytecode` is cheap: the underlying bytes and jump table are
/// reference counted and never recomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bytecode {
    bytecode: Bytes,
    jump_table: JumpTable,
    hash: Option<B256>,
}

impl Default for Bytecode {
    fn default() -> Self {
        // A single STOP, matching the convention used for empty/non-existent code.
        Self::new_legacy(Bytes::from_static(&[0x00]))
    }
}

impl Bytecode {
    /// Analyzes `raw` and returns the resulting bytecode.
    pub fn new_legacy(raw: Bytes) -> Self {
        let jump_table = JumpTable::analyze(&raw);
        Self {
            bytecode: raw,
            jump_table,
            hash: None,
        }
    }

    /// Analyzes `raw` and caches its Keccak-256 hash.
    pub fn new_legacy_with_hash(raw: Bytes, hash: B256) -> Self {
        let jump_table = JumpTable::analyze(&raw);
        Self {
            bytecode: raw,
            jump_table,
            hash: Some(hash),
        }
    }

    /// Raw, un-padded bytecode bytes.
    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.bytecode
    }

    /// Number of bytes in the bytecode.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    /// True if the bytecode is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    /// Returns true if `pc` is a valid `JUMPDEST`.
    #[inline]
    pub fn is_valid_jump(&self, pc: usize) -> bool {
        self.jump_table.is_valid(pc)
    }

    /// Returns the cached hash, computing and caching it if absent.
    pub fn hash_slow(&mut self) -> B256 {
        if let Some(hash) = self.hash {
            return hash;
        }
        let hash = if self.bytecode.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(&self.bytecode)
        };
        self.hash = Some(hash);
        hash
    }

    /// Returns the cached hash without computing it.
    pub fn hash(&self) -> Option<B256> {
        self.hash
    }
}

/// Bytecode plus its code hash, as stored on an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBytecode {
    /// Shared analyzed bytecode.
    pub code: Arc<Bytecode>,
    /// Keccak-256 hash of the raw bytecode.
    pub hash: B256,
}

impl AccountBytecode {
    /// Wraps already-analyzed bytecode.
    pub fn new(mut code: Bytecode) -> Self {
        let hash = code.hash_slow();
        Self {
            code: Arc::new(code),
            hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_hash_is_keccak_empty() {
        let mut code = Bytecode::new_legacy(Bytes::new());
        assert_eq!(code.hash_slow(), KECCAK_EMPTY);
    }

    #[test]
    fn jumpdest_inside_push_data_is_rejected() {
        // PUSH2 0x5B5B JUMPDEST
        let code = Bytecode::new_legacy(Bytes::from_static(&[0x61, 0x5b, 0x5b, JUMPDEST]));
        assert!(!code.is_valid_jump(1));
        assert!(!code.is_valid_jump(2));
        assert!(code.is_valid_jump(3));
    }
}
