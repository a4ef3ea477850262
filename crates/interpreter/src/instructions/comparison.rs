//! `LT`, `GT`, `SLT`, `SGT`, `EQ`, `ISZERO`.

use super::support::{desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::gas;
use alloc::sync::Arc;
use primitives::U256;

const SIGN_BIT: U256 = U256::from_limbs([0, 0, 0, 0x8000_0000_0000_0000]);

fn is_negative(v: U256) -> bool {
    v & SIGN_BIT != U256::ZERO
}

fn signed_lt(a: U256, b: U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

fn bool_word(b: bool) -> U256 {
    if b {
        U256::from(1)
    } else {
        U256::ZERO
    }
}

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x10, "LT", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(bool_word(a < b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x11, "GT", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(bool_word(a > b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x12, "SLT", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(bool_word(signed_lt(a, b))).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x13, "SGT", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(bool_word(signed_lt(b, a))).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x14, "EQ", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(bool_word(a == b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x15, "ISZERO", gas::VERYLOW, 1, 1024, fixed_gas(), Arc::new(|rs, _host| {
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(bool_word(a.is_zero())).map_err(stack_halt)
        })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_lt_treats_high_bit_as_negative() {
        assert!(signed_lt(SIGN_BIT, U256::from(1)));
        assert!(!signed_lt(U256::from(1), SIGN_BIT));
    }
}
