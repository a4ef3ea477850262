//! Identity (address `0x04`): returns its input unchanged.

use crate::{calc_linear_cost_u32, PrecompileError, PrecompileOutput, PrecompileResult};
use primitives::Bytes;

/// `base=15, word=3`.
pub fn run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let cost = calc_linear_cost_u32(input.len(), 15, 3);
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    Ok(PrecompileOutput::new(cost, Bytes::copy_from_slice(input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_input() {
        let out = run(b"hello world", 1_000).unwrap();
        assert_eq!(out.bytes.as_ref(), b"hello world");
        assert_eq!(out.gas_used, 15 + 3);
    }

    #[test]
    fn out_of_gas() {
        assert_eq!(run(&[0u8; 64], 10), Err(PrecompileError::OutOfGas));
    }
}
