//! `STOP`, `JUMP`, `JUMPI`, `PC`, `JUMPDEST`, `GAS`, `RETURN`, `REVERT`,
//! `INVALID`.

use super::support::{as_usize, desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::{gas, HaltReason};
use alloc::sync::Arc;
use primitives::U256;

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x00, "STOP", gas::ZERO, 0, 1024, fixed_gas(), Arc::new(|_rs, _host| {
            Err(HaltReason::Stop)
        })),
    );
    install(
        table,
        desc(0x56, "JUMP", gas::MID, 1, 1024, fixed_gas(), Arc::new(|rs, _host| {
            let dest = rs.stack.pop().map_err(stack_halt)?;
            jump_to(rs, dest)
        })),
    );
    install(
        table,
        desc(0x57, "JUMPI", gas::HIGH, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let dest = rs.stack.pop().map_err(stack_halt)?;
            let cond = rs.stack.pop().map_err(stack_halt)?;
            if cond.is_zero() {
                Ok(())
            } else {
                jump_to(rs, dest)
            }
        })),
    );
    install(
        table,
        desc(0x58, "PC", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            // `pc` was already advanced past this opcode by the main loop;
            // `PC` must report its own position.
            rs.stack.push(U256::from((rs.pc - 1) as u64)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x5a, "GAS", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.push(U256::from(rs.gas_left)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x5b, "JUMPDEST", gas::JUMPDEST, 0, 1024, fixed_gas(), Arc::new(|_rs, _host| Ok(()))),
    );
    install(
        table,
        desc(
            0xf3,
            "RETURN",
            gas::ZERO,
            2,
            1024,
            Arc::new(|rs, _host, _base| {
                let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                Ok(rs.memory.expansion_cost(offset, len))
            }),
            Arc::new(|rs, _host| {
                let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                rs.memory.resize(offset, len);
                let data = rs.memory.load(offset, len);
                Err(HaltReason::Return(data.into()))
            }),
        ),
    );
    install(
        table,
        desc(
            0xfd,
            "REVERT",
            gas::ZERO,
            2,
            1024,
            Arc::new(|rs, _host, _base| {
                let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                Ok(rs.memory.expansion_cost(offset, len))
            }),
            Arc::new(|rs, _host| {
                let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                rs.memory.resize(offset, len);
                let data = rs.memory.load(offset, len);
                Err(HaltReason::Revert(data.into()))
            }),
        ),
    );
    install(
        table,
        desc(0xfe, "INVALID", gas::ZERO, 0, 1024, fixed_gas(), Arc::new(|_rs, _host| {
            Err(HaltReason::InvalidOpcode)
        })),
    );
}

fn jump_to(rs: &mut crate::RunState, dest: U256) -> Result<(), HaltReason> {
    let dest = as_usize(dest).map_err(|_| HaltReason::InvalidJump)?;
    if !rs.code.is_valid_jump(dest) {
        return Err(HaltReason::InvalidJump);
    }
    rs.pc = dest;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHost;
    use crate::{OpcodeTable, RunState};
    use bytecode::Bytecode;
    use primitives::{Address, Bytes};
    use state::{InMemoryDb, Journal};

    #[test]
    fn return_halts_with_memory_slice() {
        let table = OpcodeTable::new();
        let mut host = TestHost::new(Journal::new(InMemoryDb::new()));
        // PUSH1 5 PUSH1 0 MSTORE PUSH1 0x20 PUSH1 0 RETURN
        let code = hex::decode("600560005260206000f3").unwrap();
        let mut state = RunState::new(
            Bytecode::new_legacy(Bytes::copy_from_slice(&code)),
            100_000,
            Address::ZERO,
            Address::ZERO,
            primitives::U256::ZERO,
            Bytes::new(),
            false,
            0,
        );
        let halt = crate::interpreter::run(&mut state, &mut host, &table);
        let mut expected = [0u8; 32];
        expected[31] = 5;
        assert_eq!(halt, HaltReason::Return(Bytes::copy_from_slice(&expected)));
    }
}
