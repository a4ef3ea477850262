//! `SLOAD`, `SSTORE`, `TLOAD`, `TSTORE`.

use super::support::{db_err, desc, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::{gas, HaltReason, RunState};
use alloc::sync::Arc;

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(
            0x54,
            "SLOAD",
            gas::WARM_STORAGE_READ,
            1,
            1024,
            Arc::new(|rs, host, _base| {
                let key = rs.stack.peek(0).map_err(stack_halt)?;
                let (_, is_cold) = host.sload(rs.address, key).map_err(db_err)?;
                Ok(gas::sload_cost(&rs.rules, is_cold))
            }),
            Arc::new(|rs, host| {
                let key = rs.stack.pop().map_err(stack_halt)?;
                let (value, _cold) = host.sload(rs.address, key).map_err(db_err)?;
                rs.stack.push(value).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(
            0x55,
            "SSTORE",
            0,
            2,
            1024,
            Arc::new(|rs, host, _base| {
                reject_static_write(rs)?;
                let key = rs.stack.peek(0).map_err(stack_halt)?;
                let new_value = rs.stack.peek(1).map_err(stack_halt)?;
                let (original, current, is_cold) =
                    host.storage_state(rs.address, key).map_err(db_err)?;
                let cold_surcharge = if is_cold { gas::COLD_SLOAD } else { 0 };
                Ok(gas::sstore_cost(&rs.rules, original, current, new_value) + cold_surcharge)
            }),
            Arc::new(|rs, host| {
                reject_static_write(rs)?;
                let key = rs.stack.pop().map_err(stack_halt)?;
                let new_value = rs.stack.pop().map_err(stack_halt)?;
                let (original, present_before, _cold) =
                    host.sstore(rs.address, key, new_value).map_err(db_err)?;
                let refund = gas::sstore_refund(&rs.rules, original, present_before, new_value);
                host.add_refund(refund);
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(
            0x5c,
            "TLOAD",
            gas::WARM_STORAGE_READ,
            1,
            1024,
            Arc::new(|rs, _host, base| {
                require_cancun(rs)?;
                Ok(base)
            }),
            Arc::new(|rs, host| {
                require_cancun(rs)?;
                let key = rs.stack.pop().map_err(stack_halt)?;
                let value = host.tload(rs.address, key);
                rs.stack.push(value).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(
            0x5d,
            "TSTORE",
            gas::WARM_STORAGE_READ,
            2,
            1024,
            Arc::new(|rs, _host, base| {
                require_cancun(rs)?;
                reject_static_write(rs)?;
                Ok(base)
            }),
            Arc::new(|rs, host| {
                require_cancun(rs)?;
                reject_static_write(rs)?;
                let key = rs.stack.pop().map_err(stack_halt)?;
                let value = rs.stack.pop().map_err(stack_halt)?;
                host.tstore(rs.address, key, value);
                Ok(())
            }),
        ),
    );
}

fn require_cancun(rs: &RunState) -> Result<(), HaltReason> {
    if rs.rules.has_transient_storage() {
        Ok(())
    } else {
        Err(HaltReason::InvalidOpcode)
    }
}

fn reject_static_write(rs: &RunState) -> Result<(), HaltReason> {
    if rs.is_static {
        Err(HaltReason::StaticStateChange)
    } else {
        Ok(())
    }
}
