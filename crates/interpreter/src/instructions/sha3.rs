//! `KECCAK256` (a.k.a. `SHA3`).

use super::support::{as_usize, desc, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::gas;
use alloc::sync::Arc;
use primitives::U256;

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(
            0x20,
            "KECCAK256",
            gas::KECCAK256,
            2,
            1023,
            Arc::new(|rs, _host, _base| {
                let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                let expansion = rs.memory.expansion_cost(offset, len);
                Ok(gas::keccak256_cost(len) + expansion)
            }),
            Arc::new(|rs, _host| {
                let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                rs.memory.resize(offset, len);
                let data = rs.memory.load(offset, len);
                let hash = primitives::keccak256(&data);
                rs.stack.push(U256::from_be_bytes(hash.0)).map_err(stack_halt)
            }),
        ),
    );
}
