//! `MODEXP` (address `0x05`): arbitrary-precision modular exponentiation
//! (EIP-198, repriced by EIP-2565 at Berlin).
//!
//! Input: `[32 bytes base_len][32 bytes exp_len][32 bytes mod_len][base][exp][mod]`.
//! Output: `base^exp mod modulus`, left-padded to `mod_len` bytes. If
//! `modulus` is zero-length or all zero, the output is `mod_len` zero bytes
//! and the exponentiation is never actually performed.

use crate::{right_pad, PrecompileError, PrecompileOutput, PrecompileResult};
use alloc::vec;
use alloc::vec::Vec;
use primitives::U256;

const BERLIN_MIN_GAS: u64 = 200;

struct Lengths {
    base_len: usize,
    exp_len: usize,
    mod_len: usize,
}

fn read_lengths(input: &[u8]) -> Lengths {
    let header = right_pad::<96>(input);
    let base_len = usize_from_be(&header[0..32]);
    let exp_len = usize_from_be(&header[32..64]);
    let mod_len = usize_from_be(&header[64..96]);
    Lengths {
        base_len,
        exp_len,
        mod_len,
    }
}

/// Saturates to `usize::MAX` if the 32-byte length word doesn't fit; the
/// gas formula's own growth will make such an input fail on cost long
/// before any allocation would be attempted.
fn usize_from_be(word: &[u8]) -> usize {
    U256::from_be_slice(word).try_into().unwrap_or(usize::MAX)
}

/// Byte length of the base-2 representation of the first 32 bytes of the
/// exponent (or fewer, if the exponent is shorter), used by the "adjusted
/// exponent length" formulas of both EIP-198 and EIP-2565.
fn exp_head_bit_len(exp_head: &[u8]) -> u64 {
    let first_nonzero = exp_head.iter().position(|b| *b != 0);
    match first_nonzero {
        None => 0,
        Some(i) => {
            let top_byte = exp_head[i];
            let bits_in_top_byte = 8 - top_byte.leading_zeros() as u64;
            (exp_head.len() - i - 1) as u64 * 8 + bits_in_top_byte
        }
    }
}

/// EIP-198 (Byzantium/pre-Berlin): `floor(max(mod_len, base_len)^2 * max(adjusted_exp_len, 1) / GQUADDIVISOR)`.
fn byzantium_gas(lens: &Lengths, exp_head: &[u8]) -> u64 {
    const GQUADDIVISOR: u64 = 20;

    let max_len = lens.base_len.max(lens.mod_len) as u64;
    let complexity = mult_complexity_pre_eip2565(max_len);

    let adjusted_exp_len = adjusted_exponent_length(lens.exp_len, exp_head).max(1);
    complexity
        .saturating_mul(adjusted_exp_len)
        .checked_div(GQUADDIVISOR)
        .unwrap_or(u64::MAX)
}

fn mult_complexity_pre_eip2565(x: u64) -> u64 {
    if x <= 64 {
        x * x
    } else if x <= 1024 {
        x * x / 4 + 96 * x - 3072
    } else {
        x * x / 16 + 480 * x - 199_680
    }
}

/// EIP-2565 (Berlin onward): `ceil(max(mod_len, base_len)^2 / 3) * max(adjusted_exp_len, 1) / GQUADDIVISOR`,
/// `GQUADDIVISOR = 3`, floored at 200 gas.
fn berlin_gas(lens: &Lengths, exp_head: &[u8]) -> u64 {
    const GQUADDIVISOR: u64 = 3;

    let max_len = lens.base_len.max(lens.mod_len) as u64;
    let words = max_len.div_ceil(8);
    let complexity = words.saturating_mul(words);

    let adjusted_exp_len = adjusted_exponent_length(lens.exp_len, exp_head).max(1);
    complexity
        .saturating_mul(adjusted_exp_len)
        .checked_div(GQUADDIVISOR)
        .unwrap_or(u64::MAX)
        .max(BERLIN_MIN_GAS)
}

/// `adjusted_exponent_length`: if the exponent fits the first 32 bytes of
/// its field, it's the bit length of that value minus one (floored at 0);
/// otherwise it's `8*(exp_len-32)` plus the bit length of the top 32 bytes.
fn adjusted_exponent_length(exp_len: usize, exp_head: &[u8]) -> u64 {
    let head_bits = exp_head_bit_len(exp_head);
    if exp_len <= 32 {
        head_bits.saturating_sub(1)
    } else {
        8 * (exp_len as u64 - 32) + head_bits.saturating_sub(1)
    }
}

fn run_with_gas_fn(input: &[u8], gas_limit: u64, gas_fn: impl Fn(&Lengths, &[u8]) -> u64) -> PrecompileResult {
    let lens = read_lengths(input);
    let body = input.get(96..).unwrap_or(&[]);

    let exp_head_len = lens.exp_len.min(32);
    let exp_head_start = lens.base_len.min(body.len());
    let exp_head_end = (exp_head_start + exp_head_len).min(body.len());
    let exp_head = body.get(exp_head_start..exp_head_end).unwrap_or(&[]);

    let gas_used = gas_fn(&lens, exp_head);
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    if lens.mod_len == 0 {
        return Ok(PrecompileOutput::new(gas_used, primitives::Bytes::new()));
    }

    let base = read_segment(body, 0, lens.base_len);
    let exp = read_segment(body, lens.base_len, lens.exp_len);
    let modulus = read_segment(body, lens.base_len + lens.exp_len, lens.mod_len);

    if modulus.iter().all(|b| *b == 0) {
        return Ok(PrecompileOutput::new(gas_used, vec![0u8; lens.mod_len].into()));
    }

    let result = aurora_engine_modexp::modexp(&base, &exp, &modulus);
    let mut out = vec![0u8; lens.mod_len];
    let start = lens.mod_len.saturating_sub(result.len());
    let copy_len = result.len().min(lens.mod_len);
    out[start..start + copy_len].copy_from_slice(&result[result.len() - copy_len..]);
    Ok(PrecompileOutput::new(gas_used, out.into()))
}

fn read_segment(body: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let start = offset.min(body.len());
    let end = (offset + len).min(body.len());
    let mut out = vec![0u8; len];
    if start < end {
        out[..end - start].copy_from_slice(&body[start..end]);
    }
    out
}

/// Byzantium through Istanbul.
pub fn byzantium_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_with_gas_fn(input, gas_limit, byzantium_gas)
}

/// Berlin onward.
pub fn berlin_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_with_gas_fn(input, gas_limit, berlin_gas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(base: &[u8], exp: &[u8], modulus: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&U256::from(base.len()).to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(exp.len()).to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(modulus.len()).to_be_bytes::<32>());
        out.extend_from_slice(base);
        out.extend_from_slice(exp);
        out.extend_from_slice(modulus);
        out
    }

    #[test]
    fn three_pow_two_mod_five_is_four() {
        let input = encode(&[3], &[2], &[5]);
        let out = berlin_run(&input, 100_000).unwrap();
        assert_eq!(out.bytes.as_ref(), &[4]);
    }

    #[test]
    fn zero_modulus_len_returns_empty() {
        let input = encode(&[3], &[2], &[]);
        let out = berlin_run(&input, 100_000).unwrap();
        assert!(out.bytes.is_empty());
    }

    #[test]
    fn zero_modulus_value_returns_zero_padded() {
        let input = encode(&[3], &[2], &[0, 0]);
        let out = berlin_run(&input, 100_000).unwrap();
        assert_eq!(out.bytes.as_ref(), &[0, 0]);
    }

    #[test]
    fn minimum_gas_floor_applies() {
        let input = encode(&[1], &[1], &[1]);
        let out = berlin_run(&input, 100_000).unwrap();
        assert_eq!(out.gas_used, BERLIN_MIN_GAS);
    }

    #[test]
    fn insufficient_gas() {
        let input = encode(&[3], &[2], &[5]);
        assert_eq!(berlin_run(&input, 10), Err(PrecompileError::OutOfGas));
    }
}
