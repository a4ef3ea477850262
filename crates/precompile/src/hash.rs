//! SHA-256 (address `0x02`) and RIPEMD-160 (address `0x03`).

use crate::{calc_linear_cost_u32, PrecompileError, PrecompileOutput, PrecompileResult};
use alloc::vec::Vec;

/// `base=60, word=12`.
pub fn sha256_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let cost = calc_linear_cost_u32(input.len(), 60, 12);
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    use sha2::Digest;
    let digest = sha2::Sha256::digest(input);
    Ok(PrecompileOutput::new(cost, digest.to_vec().into()))
}

/// `base=600, word=120`. Output is left-padded with 12 zero bytes to fill
/// out a 32-byte word, per the yellow paper's `RIPEMD160` definition.
pub fn ripemd160_run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    let cost = calc_linear_cost_u32(input.len(), 600, 120);
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    use ripemd::Digest;
    let mut hasher = ripemd::Ripemd160::new();
    hasher.update(input);
    let mut out = Vec::with_capacity(32);
    out.extend_from_slice(&[0u8; 12]);
    out.extend_from_slice(&hasher.finalize());
    Ok(PrecompileOutput::new(cost, out.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        let out = sha256_run(&[], 1_000).unwrap();
        assert_eq!(out.gas_used, 60);
        assert_eq!(
            hex::encode(&out.bytes),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn ripemd160_pads_to_32_bytes() {
        let out = ripemd160_run(b"hello", 10_000).unwrap();
        assert_eq!(out.bytes.len(), 32);
        assert_eq!(&out.bytes[..12], &[0u8; 12]);
    }

    #[test]
    fn insufficient_gas_is_out_of_gas() {
        assert_eq!(sha256_run(&[], 10), Err(PrecompileError::OutOfGas));
    }
}
