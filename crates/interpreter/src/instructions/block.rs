//! `BLOCKHASH`, `COINBASE`, `TIMESTAMP`, `NUMBER`, `DIFFICULTY`/`PREVRANDAO`,
//! `GASLIMIT`, `CHAINID`, `BASEFEE`.

use super::support::{db_err, desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::{gas, HaltReason};
use alloc::sync::Arc;
use primitives::U256;

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x40, "BLOCKHASH", gas::BLOCKHASH, 1, 1024, fixed_gas(), Arc::new(|rs, host| {
            let number = rs.stack.pop().map_err(stack_halt)?;
            let number: u64 = number.try_into().unwrap_or(u64::MAX);
            let hash = host.block_hash(number).map_err(db_err)?;
            rs.stack.push(U256::from_be_bytes(hash.0)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x41, "COINBASE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack
                .push(U256::from_be_slice(host.env().block.coinbase.as_slice()))
                .map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x42, "TIMESTAMP", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack.push(host.env().block.timestamp).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x43, "NUMBER", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack.push(host.env().block.number).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x44, "DIFFICULTY", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack.push(host.env().block.difficulty).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x45, "GASLIMIT", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack.push(host.env().block.gas_limit).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x46, "CHAINID", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack.push(U256::from(host.env().tx.chain_id)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x48,
            "BASEFEE",
            gas::BASE,
            0,
            1023,
            Arc::new(|rs, _host, base| {
                require_london(rs)?;
                Ok(base)
            }),
            Arc::new(|rs, host| {
                require_london(rs)?;
                rs.stack.push(host.env().block.base_fee).map_err(stack_halt)
            }),
        ),
    );
}

fn require_london(rs: &crate::RunState) -> Result<(), HaltReason> {
    if rs.rules.has_basefee_opcode() {
        Ok(())
    } else {
        Err(HaltReason::InvalidOpcode)
    }
}
