//! Primitive types shared by every crate in the execution pipeline.
//!
//! This crate intentionally owns nothing but data: 256-bit words, addresses,
//! byte strings and the event log shape. Everything that interprets those
//! bytes (bytecode, gas, state) lives one layer up.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod log;

pub use alloy_primitives::{self, Address, Bytes, FixedBytes, B256, B512, U256};
pub use log::Log;

/// 256-bit word. All EVM arithmetic is modulo 2^256 over this type.
pub type Word = U256;

/// `keccak256(rlp(()))`, the code hash of an account with empty code.
pub const KECCAK_EMPTY: B256 = alloy_primitives::b256!(
    "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
);

/// Hashes `data` with Keccak-256.
#[inline]
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    alloy_primitives::keccak256(data)
}

/// Maximum depth of nested `CALL`/`CREATE` frames.
pub const CALL_STACK_LIMIT: usize = 1024;

/// EIP-170: maximum size of deployed contract code, in bytes.
pub const MAX_CODE_SIZE: usize = 24_576;

/// EIP-3860: maximum size of initcode, in bytes.
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;
