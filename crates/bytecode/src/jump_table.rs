//! Precomputed set of valid `JUMPDEST` offsets for a piece of bytecode.

use crate::{JUMPDEST, PUSH1, PUSH32};
use alloc::sync::Arc;
use bitvec::{bitvec, order::Lsb0, vec::BitVec};

/// Bit-per-offset map of valid jump destinations.
///
/// Built once per analyzed [`crate::Bytecode`] by walking the byte string and
/// skipping over `PUSHn` immediates, so a `JUMPDEST` byte that is actually
/// push data never counts as a valid target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpTable(Arc<BitVec<u8, Lsb0>>);

impl JumpTable {
    /// Walks `code` and records every offset holding a genuine `JUMPDEST`.
    pub fn analyze(code: &[u8]) -> Self {
        let mut map: BitVec<u8, Lsb0> = bitvec![u8, Lsb0; 0; code.len()];
        let mut pc = 0usize;
        while pc < code.len() {
            let op = code[pc];
            if op == JUMPDEST {
                map.set(pc, true);
                pc += 1;
            } else if (PUSH1..=PUSH32).contains(&op) {
                let push_len = (op - PUSH1 + 1) as usize;
                pc += 1 + push_len;
            } else {
                pc += 1;
            }
        }
        Self(Arc::new(map))
    }

    /// Returns true if `pc` is within bounds and marked as a `JUMPDEST`.
    #[inline]
    pub fn is_valid(&self, pc: usize) -> bool {
        self.0.get(pc).map(|b| *b).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push32_skips_jumpdest_byte_at_boundary() {
        let mut code = alloc::vec![0x7f]; // PUSH32
        code.extend([0x5b; 32]); // all JUMPDEST bytes, all push data
        code.push(JUMPDEST); // real jumpdest right after
        let table = JumpTable::analyze(&code);
        for i in 1..33 {
            assert!(!table.is_valid(i), "offset {i} should be push data");
        }
        assert!(table.is_valid(33));
    }
}
