//! `BLAKE2F` (address `0x09`, EIP-152): exposes the BLAKE2b compression
//! function `F` directly, so contracts can verify BLAKE2b hashes computed
//! off-chain without re-implementing the whole hash in EVM bytecode.
//!
//! Input (213 bytes): `[4 bytes rounds][64 bytes h][128 bytes m][8 bytes t0][8 bytes t1][1 byte f]`.
//! `rounds` and the state words are read big-endian/little-endian exactly
//! as BLAKE2b itself defines them — see the IETF RFC 7693 reference
//! implementation, which this compression function follows byte for byte.

use crate::{PrecompileError, PrecompileOutput, PrecompileResult};
use primitives::Bytes;

const INPUT_LENGTH: usize = 213;

const IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// The `F` compression function, run for exactly `rounds` rounds.
fn compress(rounds: usize, h: &mut [u64; 8], m: [u64; 16], t: [u64; 2], final_block: bool) {
    let mut v = [0u64; 16];
    v[0..8].copy_from_slice(h);
    v[8..16].copy_from_slice(&IV);
    v[12] ^= t[0];
    v[13] ^= t[1];
    if final_block {
        v[14] = !v[14];
    }

    for round in 0..rounds {
        let s = &SIGMA[round % 10];
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

pub fn run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if input.len() != INPUT_LENGTH {
        return Err(PrecompileError::InvalidInput("blake2f input must be exactly 213 bytes"));
    }

    let rounds = u32::from_be_bytes(input[0..4].try_into().unwrap());
    let gas_used = rounds as u64;
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }

    let final_block = match input[212] {
        0 => false,
        1 => true,
        _ => return Err(PrecompileError::InvalidInput("blake2f final-block flag must be 0 or 1")),
    };

    let mut h = [0u64; 8];
    for (i, word) in h.iter_mut().enumerate() {
        *word = u64::from_le_bytes(input[4 + i * 8..4 + i * 8 + 8].try_into().unwrap());
    }
    let mut m = [0u64; 16];
    for (i, word) in m.iter_mut().enumerate() {
        *word = u64::from_le_bytes(input[68 + i * 8..68 + i * 8 + 8].try_into().unwrap());
    }
    let t = [
        u64::from_le_bytes(input[196..204].try_into().unwrap()),
        u64::from_le_bytes(input[204..212].try_into().unwrap()),
    ];

    compress(rounds as usize, &mut h, m, t, final_block);

    let mut out = [0u8; 64];
    for (i, word) in h.iter().enumerate() {
        out[i * 8..i * 8 + 8].copy_from_slice(&word.to_le_bytes());
    }
    Ok(PrecompileOutput::new(gas_used, Bytes::copy_from_slice(&out)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_changes_state() {
        let mut input = [0u8; INPUT_LENGTH];
        input[0..4].copy_from_slice(&12u32.to_be_bytes());
        input[212] = 1;
        let out = run(&input, 1_000).unwrap();
        assert_eq!(out.gas_used, 12);
        assert_ne!(out.bytes.as_ref(), &[0u8; 64][..]);
    }

    #[test]
    fn wrong_length_is_invalid_input() {
        assert!(matches!(run(&[0u8; 10], 1_000), Err(PrecompileError::InvalidInput(_))));
    }

    #[test]
    fn bad_final_flag_is_invalid_input() {
        let mut input = [0u8; INPUT_LENGTH];
        input[212] = 2;
        assert!(matches!(run(&input, 1_000), Err(PrecompileError::InvalidInput(_))));
    }

    #[test]
    fn zero_rounds_costs_no_gas() {
        let input = [0u8; INPUT_LENGTH];
        let out = run(&input, 0).unwrap();
        assert_eq!(out.gas_used, 0);
    }

    #[test]
    fn insufficient_gas_for_requested_rounds() {
        let mut input = [0u8; INPUT_LENGTH];
        input[0..4].copy_from_slice(&10u32.to_be_bytes());
        assert_eq!(run(&input, 5), Err(PrecompileError::OutOfGas));
    }
}
