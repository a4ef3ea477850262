//! Native precompiled contracts: fixed low-address "contracts" that the
//! message-call framing invokes directly instead of running interpreter
//! bytecode (distilled spec §4.6).
//!
//! [`Precompiles`] mirrors the interpreter crate's [`OpcodeTable`][ot]
//! shape on purpose: a shared, hardfork-staged set of built-ins plus a
//! per-EVM overlay that can install or delete individual addresses. Built-in
//! dispatch is a plain `fn` pointer (no allocation, no indirection); an
//! overlay entry may instead be a boxed closure, for callers who need to
//! close over state a bare function can't reach.
//!
//! [ot]: https://docs.rs/ethercore-interpreter (conceptually; no such crate
//! is published, this just means "the sibling interpreter crate's
//! `OpcodeTable`").

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "bn128")]
mod bn128;
mod ecrecover;
#[cfg(feature = "hash")]
mod hash;
#[cfg(feature = "identity")]
mod identity;
#[cfg(feature = "modexp")]
mod modexp;

mod blake2;

use alloc::sync::Arc;
use alloc::vec::Vec;
use context::{ChainRules, SpecId};
use core::fmt;
use primitives::{Address, Bytes};

/// A precompile's result: the gas it charged and the bytes it returns, or
/// the reason it failed.
pub type PrecompileResult = Result<PrecompileOutput, PrecompileError>;

/// Successful precompile execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Gas charged. Always `<= gas_limit` the precompile was called with.
    pub gas_used: u64,
    /// Return data.
    pub bytes: Bytes,
}

impl PrecompileOutput {
    /// Builds a successful output.
    pub fn new(gas_used: u64, bytes: Bytes) -> Self {
        Self { gas_used, bytes }
    }
}

/// Why a precompile call failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecompileError {
    /// The declared cost exceeds the gas the caller supplied. All of
    /// `gas_limit` is consumed; the return value is empty.
    OutOfGas,
    /// Input was malformed in a way specific to this precompile (wrong
    /// length, a field element outside its curve's modulus, and so on).
    InvalidInput(&'static str),
}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfGas => f.write_str("out of gas"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl core::error::Error for PrecompileError {}

/// Built-in precompile signature. No state, no allocation to call it.
pub type StaticPrecompileFn = fn(&[u8], u64) -> PrecompileResult;

/// A custom precompile installed via [`Precompiles::with_overlay`]; boxed so
/// it may close over caller state a bare `fn` pointer can't reach.
pub type DynPrecompileFn = Arc<dyn Fn(&[u8], u64) -> PrecompileResult + Send + Sync>;

/// Either kind of precompile, resolved and ready to call.
#[derive(Clone)]
pub enum Precompile {
    /// One of the fixed built-ins.
    Static(StaticPrecompileFn),
    /// An overlay-installed closure.
    Dynamic(DynPrecompileFn),
}

impl Precompile {
    /// Runs the precompile.
    pub fn call(&self, input: &[u8], gas_limit: u64) -> PrecompileResult {
        match self {
            Self::Static(f) => f(input, gas_limit),
            Self::Dynamic(f) => f(input, gas_limit),
        }
    }
}

/// Hardfork-staged built-in table plus a per-EVM address overlay (distilled
/// spec §4.6, `customPrecompiles`).
///
/// An overlay entry with `function: None` deletes that address from the
/// active set even if it falls within the hardfork's built-in range; an
/// entry with `Some` installs (or overrides) a precompile at that address,
/// built-in range or not.
#[derive(Clone)]
pub struct Precompiles {
    rules: ChainRules,
    overlay: Vec<(Address, Option<DynPrecompileFn>)>,
}

impl Precompiles {
    /// Table with no overlay: just the hardfork's built-ins.
    pub fn new(rules: ChainRules) -> Self {
        Self {
            rules,
            overlay: Vec::new(),
        }
    }

    /// Table applying `overlay` in order over the hardfork's built-ins.
    pub fn with_overlay(rules: ChainRules, overlay: Vec<(Address, Option<DynPrecompileFn>)>) -> Self {
        Self { rules, overlay }
    }

    /// Resolves `address` to a callable precompile, if any. `None` means
    /// "not a precompile" — message framing should treat `address` as an
    /// ordinary account (distilled spec §4.6: "unknown address in active
    /// set → empty code contract, not precompile").
    pub fn get(&self, address: Address) -> Option<Precompile> {
        for (addr, function) in self.overlay.iter().rev() {
            if *addr == address {
                return function.clone().map(Precompile::Dynamic);
            }
        }
        if !self.rules.is_precompile(address) {
            return None;
        }
        builtin(self.rules.spec_id(), address).map(Precompile::Static)
    }

    /// True if `address` resolves to a precompile under this table.
    pub fn is_precompile(&self, address: Address) -> bool {
        self.get(address).is_some()
    }
}

/// Looks up the built-in at `address` for `spec_id`, if the opcode/EIP that
/// introduces it has activated.
fn builtin(spec_id: SpecId, address: Address) -> Option<StaticPrecompileFn> {
    let bytes = address.as_slice();
    if bytes[..19].iter().any(|b| *b != 0) {
        return None;
    }
    #[allow(unused_variables)]
    let byte = bytes[19];
    match byte {
        1 => Some(ecrecover::run),
        #[cfg(feature = "hash")]
        2 => Some(hash::sha256_run),
        #[cfg(feature = "hash")]
        3 => Some(hash::ripemd160_run),
        #[cfg(feature = "identity")]
        4 => Some(identity::run),
        #[cfg(feature = "modexp")]
        5 if spec_id.is_enabled_in(SpecId::BERLIN) => Some(modexp::berlin_run),
        #[cfg(feature = "modexp")]
        5 => Some(modexp::byzantium_run),
        #[cfg(feature = "bn128")]
        6 if spec_id.is_enabled_in(SpecId::ISTANBUL) => Some(bn128::add_istanbul),
        #[cfg(feature = "bn128")]
        6 => Some(bn128::add_byzantium),
        #[cfg(feature = "bn128")]
        7 if spec_id.is_enabled_in(SpecId::ISTANBUL) => Some(bn128::mul_istanbul),
        #[cfg(feature = "bn128")]
        7 => Some(bn128::mul_byzantium),
        #[cfg(feature = "bn128")]
        8 if spec_id.is_enabled_in(SpecId::ISTANBUL) => Some(bn128::pairing_istanbul),
        #[cfg(feature = "bn128")]
        8 => Some(bn128::pairing_byzantium),
        9 => Some(blake2::run),
        _ => None,
    }
}

/// `base + ceil(len/32) * word`, the linear cost shape most precompiles use.
pub(crate) fn calc_linear_cost_u32(len: usize, base: u64, word: u64) -> u64 {
    (len as u64).div_ceil(32) * word + base
}

/// Right-pads (or truncates) `input` to exactly `N` bytes.
pub(crate) fn right_pad<const N: usize>(input: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = input.len().min(N);
    out[..n].copy_from_slice(&input[..n]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last_byte: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last_byte;
        Address::from(bytes)
    }

    #[test]
    fn unknown_address_is_not_a_precompile() {
        let rules = ChainRules::new(SpecId::LATEST);
        let table = Precompiles::new(rules);
        assert!(!table.is_precompile(Address::ZERO));
        assert!(!table.is_precompile(addr(0xff)));
    }

    #[test]
    fn overlay_can_delete_a_builtin() {
        let rules = ChainRules::new(SpecId::LATEST);
        let four = addr(4);
        let table = Precompiles::new(rules);
        assert!(table.is_precompile(four));
        let overlaid = Precompiles::with_overlay(rules, alloc::vec![(four, None)]);
        assert!(!overlaid.is_precompile(four));
    }

    #[test]
    fn overlay_can_install_a_custom_address() {
        let rules = ChainRules::new(SpecId::LATEST);
        let custom = addr(0x12);
        let overlaid = Precompiles::with_overlay(
            rules,
            alloc::vec![(
                custom,
                Some(Arc::new(|input: &[u8], _gas_limit: u64| {
                    Ok(PrecompileOutput::new(0, Bytes::copy_from_slice(input)))
                }) as DynPrecompileFn)
            )],
        );
        assert!(overlaid.is_precompile(custom));
        let out = overlaid.get(custom).unwrap().call(&[1, 2, 3], 100).unwrap();
        assert_eq!(out.bytes.as_ref(), &[1, 2, 3]);
    }
}
