//! `alt_bn128` (BN254) point addition, scalar multiplication and pairing —
//! addresses `0x06`, `0x07`, `0x08`. Costs drop at Istanbul (EIP-1108).

use crate::{right_pad, PrecompileError, PrecompileOutput, PrecompileResult};
use bn::{AffineG1, AffineG2, Fq, Fq2, Group, Gt, G1, G2};
use primitives::Bytes;

const FQ_LEN: usize = 32;
const FQ2_LEN: usize = 2 * FQ_LEN;
const G1_LEN: usize = 2 * FQ_LEN;
const G2_LEN: usize = 2 * FQ2_LEN;
const SCALAR_LEN: usize = 32;
const PAIR_LEN: usize = G1_LEN + G2_LEN;

fn read_fq(input: &[u8]) -> Result<Fq, PrecompileError> {
    Fq::from_slice(&input[..FQ_LEN]).map_err(|_| PrecompileError::InvalidInput("bn128 field element not a member"))
}

fn read_fq2(input: &[u8]) -> Result<Fq2, PrecompileError> {
    // Big-endian point encoding orders the imaginary part first.
    let y = read_fq(&input[..FQ_LEN])?;
    let x = read_fq(&input[FQ_LEN..2 * FQ_LEN])?;
    Ok(Fq2::new(x, y))
}

fn new_g1_point(px: Fq, py: Fq) -> Result<G1, PrecompileError> {
    if px == Fq::zero() && py == Fq::zero() {
        Ok(G1::zero())
    } else {
        AffineG1::new(px, py)
            .map(Into::into)
            .map_err(|_| PrecompileError::InvalidInput("bn128 G1 point not on curve"))
    }
}

fn new_g2_point(x: Fq2, y: Fq2) -> Result<G2, PrecompileError> {
    if x.is_zero() && y.is_zero() {
        Ok(G2::zero())
    } else {
        AffineG2::new(x, y)
            .map(Into::into)
            .map_err(|_| PrecompileError::InvalidInput("bn128 G2 point not on curve"))
    }
}

fn read_g1_point(input: &[u8]) -> Result<G1, PrecompileError> {
    let px = read_fq(&input[0..FQ_LEN])?;
    let py = read_fq(&input[FQ_LEN..2 * FQ_LEN])?;
    new_g1_point(px, py)
}

fn read_g2_point(input: &[u8]) -> Result<G2, PrecompileError> {
    let x = read_fq2(&input[0..FQ2_LEN])?;
    let y = read_fq2(&input[FQ2_LEN..2 * FQ2_LEN])?;
    new_g2_point(x, y)
}

fn encode_g1_point(point: G1) -> [u8; G1_LEN] {
    let mut out = [0u8; G1_LEN];
    if let Some(affine) = AffineG1::from_jacobian(point) {
        affine.x().to_big_endian(&mut out[..FQ_LEN]).unwrap();
        affine.y().to_big_endian(&mut out[FQ_LEN..]).unwrap();
    }
    out
}

fn run_add(input: &[u8], gas_limit: u64, cost: u64) -> PrecompileResult {
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let input = right_pad::<{ G1_LEN * 2 }>(input);
    let p1 = read_g1_point(&input[0..G1_LEN])?;
    let p2 = read_g1_point(&input[G1_LEN..2 * G1_LEN])?;
    let sum = p1 + p2;
    Ok(PrecompileOutput::new(cost, Bytes::copy_from_slice(&encode_g1_point(sum))))
}

/// Pre-Istanbul: 500 gas.
pub fn add_byzantium(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_add(input, gas_limit, 500)
}

/// Istanbul onward (EIP-1108): 150 gas.
pub fn add_istanbul(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_add(input, gas_limit, 150)
}

fn run_mul(input: &[u8], gas_limit: u64, cost: u64) -> PrecompileResult {
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let input = right_pad::<{ G1_LEN + SCALAR_LEN }>(input);
    let point = read_g1_point(&input[0..G1_LEN])?;
    let scalar = bn::Fr::from_slice(&input[G1_LEN..G1_LEN + SCALAR_LEN])
        .map_err(|_| PrecompileError::InvalidInput("bn128 scalar out of range"))?;
    let product = point * scalar;
    Ok(PrecompileOutput::new(cost, Bytes::copy_from_slice(&encode_g1_point(product))))
}

/// Pre-Istanbul: 40,000 gas.
pub fn mul_byzantium(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_mul(input, gas_limit, 40_000)
}

/// Istanbul onward (EIP-1108): 6,000 gas.
pub fn mul_istanbul(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_mul(input, gas_limit, 6_000)
}

fn run_pairing(input: &[u8], gas_limit: u64, base: u64, per_pair: u64) -> PrecompileResult {
    if input.len() % PAIR_LEN != 0 {
        return Err(PrecompileError::InvalidInput("bn128 pairing input not a multiple of 192 bytes"));
    }
    let num_pairs = input.len() / PAIR_LEN;
    let cost = base + per_pair * num_pairs as u64;
    if cost > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let mut pairs = alloc::vec::Vec::with_capacity(num_pairs);
    for chunk in input.chunks_exact(PAIR_LEN) {
        let g1 = read_g1_point(&chunk[0..G1_LEN])?;
        let g2 = read_g2_point(&chunk[G1_LEN..PAIR_LEN])?;
        pairs.push((g1, g2));
    }

    let success = if pairs.is_empty() {
        true
    } else {
        bn::pairing_batch(&pairs) == Gt::one()
    };

    let mut out = [0u8; 32];
    if success {
        out[31] = 1;
    }
    Ok(PrecompileOutput::new(cost, Bytes::copy_from_slice(&out)))
}

/// Pre-Istanbul: `base=100_000, per_pair=80_000`.
pub fn pairing_byzantium(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_pairing(input, gas_limit, 100_000, 80_000)
}

/// Istanbul onward (EIP-1108): `base=45_000, per_pair=34_000`.
pub fn pairing_istanbul(input: &[u8], gas_limit: u64) -> PrecompileResult {
    run_pairing(input, gas_limit, 45_000, 34_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_identity_is_identity() {
        let out = add_istanbul(&[0u8; G1_LEN * 2], 1_000).unwrap();
        assert_eq!(out.bytes.as_ref(), &[0u8; G1_LEN]);
    }

    #[test]
    fn pairing_empty_input_succeeds() {
        let out = pairing_istanbul(&[], 1_000_000).unwrap();
        assert_eq!(out.bytes[31], 1);
        assert_eq!(out.gas_used, 45_000);
    }

    #[test]
    fn pairing_rejects_misaligned_input() {
        assert!(matches!(
            pairing_istanbul(&[0u8; 10], 1_000_000),
            Err(PrecompileError::InvalidInput(_))
        ));
    }

    #[test]
    fn mul_out_of_gas() {
        assert_eq!(mul_istanbul(&[0u8; G1_LEN + SCALAR_LEN], 10), Err(PrecompileError::OutOfGas));
    }
}
