//! `ECRECOVER` (address `0x01`): secp256k1 public key recovery.
//!
//! Input: `[32 bytes msg hash][32 bytes v][32 bytes r][32 bytes s]`
//! (`v` occupies the low byte of its word and must be `27` or `28`).
//! Output: the recovered address, left-padded to 32 bytes, or empty bytes
//! if recovery fails for any reason — a failed recovery is not an error,
//! it's a successful precompile call that returns nothing.

use crate::{right_pad, PrecompileError, PrecompileOutput, PrecompileResult};
use primitives::{keccak256, Bytes};

const ECRECOVER_BASE: u64 = 3_000;

pub fn run(input: &[u8], gas_limit: u64) -> PrecompileResult {
    if ECRECOVER_BASE > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    let input = right_pad::<128>(input);

    if !input[32..63].iter().all(|b| *b == 0) || !matches!(input[63], 27 | 28) {
        return Ok(PrecompileOutput::new(ECRECOVER_BASE, Bytes::new()));
    }
    let recovery_byte = input[63] - 27;

    let Some(address) = recover_address(&input[0..32], recovery_byte, &input[64..128]) else {
        return Ok(PrecompileOutput::new(ECRECOVER_BASE, Bytes::new()));
    };
    Ok(PrecompileOutput::new(ECRECOVER_BASE, address))
}

fn recover_address(msg_hash: &[u8], recovery_byte: u8, sig: &[u8]) -> Option<Bytes> {
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    let signature = Signature::from_slice(sig).ok()?;
    let recovery_id = RecoveryId::from_byte(recovery_byte)?;
    let verifying_key = VerifyingKey::recover_from_prehash(msg_hash, &signature, recovery_id).ok()?;

    let uncompressed = verifying_key.to_encoded_point(false);
    let hash = keccak256(&uncompressed.as_bytes()[1..]);
    let mut out = alloc::vec![0u8; 32];
    out[12..].copy_from_slice(&hash[12..]);
    Some(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_address_of_its_own_signature() {
        use k256::ecdsa::SigningKey;

        let signing_key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let verifying_key = signing_key.verifying_key();
        let expected_hash = keccak256(&verifying_key.to_encoded_point(false).as_bytes()[1..]);

        let msg_hash = [42u8; 32];
        let (signature, recovery_id) = signing_key.sign_prehash_recoverable(&msg_hash).unwrap();

        let mut input = [0u8; 128];
        input[0..32].copy_from_slice(&msg_hash);
        input[63] = 27 + recovery_id.to_byte();
        input[64..128].copy_from_slice(&signature.to_bytes());

        let out = run(&input, 10_000).unwrap();
        assert_eq!(out.gas_used, ECRECOVER_BASE);
        assert_eq!(&out.bytes[12..], &expected_hash[12..]);
    }

    #[test]
    fn invalid_v_returns_empty_success() {
        let mut input = [0u8; 128];
        input[63] = 29; // not 27 or 28
        let out = run(&input, 10_000).unwrap();
        assert_eq!(out.bytes.len(), 0);
        assert_eq!(out.gas_used, ECRECOVER_BASE);
    }

    #[test]
    fn out_of_gas() {
        assert_eq!(run(&[0u8; 128], 100), Err(PrecompileError::OutOfGas));
    }
}
