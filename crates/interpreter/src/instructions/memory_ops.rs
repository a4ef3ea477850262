//! `MLOAD`, `MSTORE`, `MSTORE8`, `MSIZE`, `MCOPY`.

use super::support::{as_usize, desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::gas;
use alloc::sync::Arc;
use primitives::U256;

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(
            0x51,
            "MLOAD",
            gas::VERYLOW,
            1,
            1024,
            Arc::new(|rs, _host, base| {
                let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                Ok(base + rs.memory.expansion_cost(offset, 32))
            }),
            Arc::new(|rs, _host| {
                let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                rs.memory.resize(offset, 32);
                rs.stack.push(rs.memory.load_word(offset)).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(
            0x52,
            "MSTORE",
            gas::VERYLOW,
            2,
            1022,
            Arc::new(|rs, _host, base| {
                let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                Ok(base + rs.memory.expansion_cost(offset, 32))
            }),
            Arc::new(|rs, _host| {
                let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let value = rs.stack.pop().map_err(stack_halt)?;
                rs.memory.resize(offset, 32);
                rs.memory.store(offset, &value.to_be_bytes::<32>());
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(
            0x53,
            "MSTORE8",
            gas::VERYLOW,
            2,
            1022,
            Arc::new(|rs, _host, base| {
                let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                Ok(base + rs.memory.expansion_cost(offset, 1))
            }),
            Arc::new(|rs, _host| {
                let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let value = rs.stack.pop().map_err(stack_halt)?;
                rs.memory.resize(offset, 1);
                rs.memory.store_byte(offset, value.byte(0));
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(0x59, "MSIZE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack
                .push(U256::from(rs.memory.len() as u64))
                .map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x5e,
            "MCOPY",
            gas::VERYLOW,
            3,
            1021,
            Arc::new(|rs, _host, base| {
                let dst = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(2).map_err(stack_halt)?)?;
                let expansion = rs.memory.expansion_cost(dst.max(src), len);
                Ok(base + gas::copy_word_cost(len) + expansion)
            }),
            Arc::new(|rs, _host| {
                let dst = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                rs.memory.resize(dst.max(src), len);
                rs.memory.copy_within(dst, src, len);
                Ok(())
            }),
        ),
    );
}
