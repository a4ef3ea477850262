//! `CREATE`/`CREATE2` address derivation (distilled spec §4.5 step 7).
//!
//! Hand-rolled rather than pulled in from a general RLP crate: the legacy
//! scheme only ever encodes a 20-byte address and a `u64` nonce, so the
//! encoding is two lines of arithmetic, not worth a dependency.

use alloc::vec::Vec;
use primitives::{keccak256, Address, B256, U256};

fn rlp_encode_nonce(nonce: u64) -> Vec<u8> {
    if nonce == 0 {
        return alloc::vec![0x80];
    }
    let bytes = nonce.to_be_bytes();
    let first_nonzero = bytes.iter().position(|b| *b != 0).expect("nonce != 0");
    let trimmed = &bytes[first_nonzero..];
    if trimmed.len() == 1 && trimmed[0] < 0x80 {
        trimmed.to_vec()
    } else {
        let mut out = Vec::with_capacity(1 + trimmed.len());
        out.push(0x80 + trimmed.len() as u8);
        out.extend_from_slice(trimmed);
        out
    }
}

/// `CREATE`: `keccak256(rlp([caller, nonce]))[12..]`.
pub fn create_address(caller: Address, nonce: u64) -> Address {
    let nonce_rlp = rlp_encode_nonce(nonce);
    // address field: 0x94 prefix (0x80 + 20) + 20 bytes = 21 bytes.
    let total_len = 21 + nonce_rlp.len();
    debug_assert!(total_len <= 55, "address+nonce never exceeds a short RLP list");
    let mut buf = Vec::with_capacity(1 + total_len);
    buf.push(0xc0 + total_len as u8);
    buf.push(0x80 + 20);
    buf.extend_from_slice(caller.as_slice());
    buf.extend_from_slice(&nonce_rlp);
    let hash = keccak256(&buf);
    Address::from_slice(&hash[12..])
}

/// `CREATE2`: `keccak256(0xff ‖ caller ‖ salt ‖ keccak256(init_code))[12..]`.
pub fn create2_address(caller: Address, salt: U256, init_code_hash: B256) -> Address {
    let mut buf = Vec::with_capacity(1 + 20 + 32 + 32);
    buf.push(0xff);
    buf.extend_from_slice(caller.as_slice());
    buf.extend_from_slice(&salt.to_be_bytes::<32>());
    buf.extend_from_slice(init_code_hash.as_slice());
    let hash = keccak256(&buf);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_address_matches_known_vector() {
        // Sender 0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0, nonce 0 -> the
        // canonical go-ethereum `crypto.CreateAddress` test vector.
        let caller = Address::from_slice(&hex::decode("6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0").unwrap());
        let addr = create_address(caller, 0);
        assert_eq!(
            addr,
            Address::from_slice(&hex::decode("cd234a471b72ba2f1ccf0a70fcaba648a5eecd8d").unwrap())
        );
    }

    #[test]
    fn create_address_nonce_128_uses_two_byte_encoding() {
        // Regression for the RLP "single byte < 0x80" special case: nonce
        // 128 must be length-prefixed, not emitted bare (which would read
        // back as nonce 0 on decode).
        let caller = Address::ZERO;
        let a = create_address(caller, 128);
        let b = create_address(caller, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn create2_is_deterministic() {
        let caller = Address::from_slice(&[0x11; 20]);
        let salt = U256::from(42);
        let hash = keccak256(b"init");
        assert_eq!(create2_address(caller, salt, hash), create2_address(caller, salt, hash));
    }
}
