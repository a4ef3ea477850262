//! `AND`, `OR`, `XOR`, `NOT`, `BYTE`, `SHL`, `SHR`, `SAR`.

use super::support::{desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::gas;
use alloc::sync::Arc;
use primitives::U256;

const SIGN_BIT: U256 = U256::from_limbs([0, 0, 0, 0x8000_0000_0000_0000]);

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x16, "AND", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(a & b).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x17, "OR", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(a | b).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x18, "XOR", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(a ^ b).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x19, "NOT", gas::VERYLOW, 1, 1024, fixed_gas(), Arc::new(|rs, _host| {
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(!a).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x1a, "BYTE", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let i = rs.stack.pop().map_err(stack_halt)?;
            let value = rs.stack.pop().map_err(stack_halt)?;
            let result = if i >= U256::from(32) {
                U256::ZERO
            } else {
                U256::from(value.byte(31 - i.byte(0) as usize))
            };
            rs.stack.push(result).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x1b, "SHL", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let shift = rs.stack.pop().map_err(stack_halt)?;
            let value = rs.stack.pop().map_err(stack_halt)?;
            let result = if shift >= U256::from(256) {
                U256::ZERO
            } else {
                value << shift_amount(shift)
            };
            rs.stack.push(result).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x1c, "SHR", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let shift = rs.stack.pop().map_err(stack_halt)?;
            let value = rs.stack.pop().map_err(stack_halt)?;
            let result = if shift >= U256::from(256) {
                U256::ZERO
            } else {
                value >> shift_amount(shift)
            };
            rs.stack.push(result).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x1d, "SAR", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let shift = rs.stack.pop().map_err(stack_halt)?;
            let value = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(arithmetic_shift_right(value, shift)).map_err(stack_halt)
        })),
    );
}

/// `shift` is always `< 256` by the time this is called from `SHR`/`SAR`.
fn shift_amount(shift: U256) -> usize {
    shift.as_limbs()[0] as usize
}

fn arithmetic_shift_right(value: U256, shift: U256) -> U256 {
    if shift >= U256::from(256) {
        return if value & SIGN_BIT != U256::ZERO {
            U256::MAX
        } else {
            U256::ZERO
        };
    }
    let shift = shift_amount(shift);
    if value & SIGN_BIT == U256::ZERO {
        value >> shift
    } else if shift == 0 {
        value
    } else {
        let shifted = value >> shift;
        let mask = U256::MAX << (256 - shift);
        shifted | mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sar_of_negative_one_is_negative_one() {
        assert_eq!(arithmetic_shift_right(U256::MAX, U256::from(4)), U256::MAX);
    }

    #[test]
    fn sar_large_shift_of_positive_is_zero() {
        assert_eq!(arithmetic_shift_right(U256::from(5), U256::from(300)), U256::ZERO);
    }
}
