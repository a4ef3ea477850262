//! `ADD`, `SUB`, `MUL`, `DIV`, `SDIV`, `MOD`, `SMOD`, `ADDMOD`, `MULMOD`,
//! `EXP`, `SIGNEXTEND`.

use super::support::{desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::gas;
use alloc::sync::Arc;
use primitives::U256;

const SIGN_BIT: U256 = U256::from_limbs([0, 0, 0, 0x8000_0000_0000_0000]);

fn is_negative(v: U256) -> bool {
    v & SIGN_BIT != U256::ZERO
}

fn negate(v: U256) -> U256 {
    (!v).wrapping_add(U256::from(1))
}

/// Two's-complement division, matching EVM `SDIV` semantics (`MIN/-1 == MIN`,
/// `x/0 == 0`).
fn signed_div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::ZERO;
    }
    let a_neg = is_negative(a);
    let b_neg = is_negative(b);
    let a_abs = if a_neg { negate(a) } else { a };
    let b_abs = if b_neg { negate(b) } else { b };
    let result = a_abs / b_abs;
    if a_neg != b_neg {
        negate(result)
    } else {
        result
    }
}

fn signed_mod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::ZERO;
    }
    let a_neg = is_negative(a);
    let a_abs = if a_neg { negate(a) } else { a };
    let b_abs = if is_negative(b) { negate(b) } else { b };
    let result = a_abs % b_abs;
    if a_neg {
        negate(result)
    } else {
        result
    }
}

/// `(a + b) mod n`, safe against the intermediate sum overflowing 256 bits.
fn add_mod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::ZERO;
    }
    let a = a % n;
    let b = b % n;
    let (sum, overflowed) = a.overflowing_add(b);
    if overflowed {
        // True sum is `sum + 2^256`; `2^256 mod n == (2^256 - n) mod n`.
        let wraparound = (U256::MAX - n).wrapping_add(U256::from(1)) % n;
        (sum % n).wrapping_add(wraparound) % n
    } else {
        sum % n
    }
}

/// `(a * b) mod n` via double-and-add, avoiding the need for a native
/// 512-bit intermediate.
fn mul_mod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::ZERO;
    }
    let mut result = U256::ZERO;
    let mut addend = a % n;
    let mut multiplier = b;
    while !multiplier.is_zero() {
        if multiplier & U256::from(1) == U256::from(1) {
            result = add_mod(result, addend, n);
        }
        addend = add_mod(addend, addend, n);
        multiplier >>= 1;
    }
    result
}

/// `base ^ exponent`, wrapping modulo 2^256, via square-and-multiply. The
/// exponent is a full `U256`, so this cannot delegate to a fixed-width
/// `pow`.
fn exp(base: U256, exponent: U256) -> U256 {
    let mut result = U256::from(1);
    let mut base = base;
    let mut exponent = exponent;
    while !exponent.is_zero() {
        if exponent & U256::from(1) == U256::from(1) {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exponent >>= 1;
    }
    result
}

fn sign_extend(byte_num: U256, value: U256) -> U256 {
    if byte_num >= U256::from(32) {
        return value;
    }
    let byte_num = byte_num.byte(0) as u32;
    let bit_index = byte_num * 8 + 7;
    let bit = value.bit(bit_index as usize);
    let mask = (U256::from(1) << (bit_index + 1)) - U256::from(1);
    if bit {
        value | !mask
    } else {
        value & mask
    }
}

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x01, "ADD", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(a.wrapping_add(b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x02, "MUL", gas::LOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(a.wrapping_mul(b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x03, "SUB", gas::VERYLOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(a.wrapping_sub(b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x04, "DIV", gas::LOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            let result = if b.is_zero() { U256::ZERO } else { a / b };
            rs.stack.push(result).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x05, "SDIV", gas::LOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(signed_div(a, b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x06, "MOD", gas::LOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            let result = if b.is_zero() { U256::ZERO } else { a % b };
            rs.stack.push(result).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x07, "SMOD", gas::LOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let b = rs.stack.pop().map_err(stack_halt)?;
            let a = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(signed_mod(a, b)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x08, "ADDMOD", gas::MID, 3, 1022, fixed_gas(), Arc::new(|rs, _host| {
            let a = rs.stack.pop().map_err(stack_halt)?;
            let b = rs.stack.pop().map_err(stack_halt)?;
            let n = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(add_mod(a, b, n)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x09, "MULMOD", gas::MID, 3, 1022, fixed_gas(), Arc::new(|rs, _host| {
            let a = rs.stack.pop().map_err(stack_halt)?;
            let b = rs.stack.pop().map_err(stack_halt)?;
            let n = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(mul_mod(a, b, n)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x0a,
            "EXP",
            10,
            2,
            1023,
            Arc::new(|rs, _host, _base| {
                let exponent = rs.stack.peek(1).map_err(stack_halt)?;
                Ok(gas::exp_cost(&rs.rules, exponent))
            }),
            Arc::new(|rs, _host| {
                let base = rs.stack.pop().map_err(stack_halt)?;
                let exponent = rs.stack.pop().map_err(stack_halt)?;
                rs.stack.push(exp(base, exponent)).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(0x0b, "SIGNEXTEND", gas::LOW, 2, 1023, fixed_gas(), Arc::new(|rs, _host| {
            let byte_num = rs.stack.pop().map_err(stack_halt)?;
            let value = rs.stack.pop().map_err(stack_halt)?;
            rs.stack.push(sign_extend(byte_num, value)).map_err(stack_halt)
        })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdiv_min_by_minus_one_is_min() {
        let min = SIGN_BIT;
        let minus_one = U256::MAX;
        assert_eq!(signed_div(min, minus_one), min);
    }

    #[test]
    fn div_by_zero_is_zero() {
        assert_eq!(signed_mod(U256::from(7), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn add_mod_wraps_past_256_bits() {
        let n = U256::from(10u64);
        assert_eq!(add_mod(U256::MAX, U256::from(2), n), (U256::MAX % n + U256::from(2)) % n);
    }

    #[test]
    fn mul_mod_matches_naive_small_case() {
        assert_eq!(mul_mod(U256::from(7), U256::from(6), U256::from(10)), U256::from(2));
    }

    #[test]
    fn exp_matches_pow_for_small_values() {
        assert_eq!(exp(U256::from(2), U256::from(10)), U256::from(1024));
    }

    #[test]
    fn sign_extend_negative_byte() {
        // SIGNEXTEND(0, 0xff) == all-ones (sign bit of the low byte set).
        assert_eq!(sign_extend(U256::ZERO, U256::from(0xffu64)), U256::MAX);
    }
}
