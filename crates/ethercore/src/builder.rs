//! [`EvmBuilder`]: collects the construction options distilled spec §6
//! names ("EVM construction options") and produces an [`crate::Evm`].
//!
//! Grounded on `revm`'s `EvmBuilder` (`crates/revm/src/builder.rs`), but
//! without its type-state staging (`SettingDbStage`/`SettingExternalStage`/
//! `SettingHandlerStage`): that machinery exists there to let `revm`
//! plug in an entirely different `Handler` (op-stack, custom inspectors,
//! …), a degree of freedom distilled spec §6 doesn't ask for — this
//! builder only ever produces one kind of `Evm`, so a plain chain of
//! `with_*` setters is the right amount of ceremony.

use alloc::vec::Vec;
use context::{ChainRules, Env, SpecId};
use handler::MessageCallConfig;
use interpreter::OverlayEntry;
use precompile::{DynPrecompileFn, Precompiles};
use primitives::Address;
use state::{Database, Journal};

use crate::evm::Evm;

/// Builds an [`Evm`] from the construction options distilled spec §6 lists:
/// `common`/`chainRules`, `customOpcodes`, `customPrecompiles` and
/// `allowUnlimitedContractSize`. `eei` (the database handle) is supplied
/// last, to [`EvmBuilder::build`], since it's the one option every other
/// setter is independent of.
#[derive(Clone, Default)]
pub struct EvmBuilder {
    spec_id: SpecId,
    custom_opcodes: Vec<OverlayEntry>,
    custom_precompiles: Vec<(Address, Option<DynPrecompileFn>)>,
    allow_unlimited_contract_size: bool,
    env: Env,
}

impl EvmBuilder {
    /// A builder for the latest known hardfork, no overlays, default env.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the active hardfork (`common`/`chainRules`).
    pub fn with_spec_id(mut self, spec_id: SpecId) -> Self {
        self.spec_id = spec_id;
        self
    }

    /// Appends one opcode-table overlay entry (`customOpcodes`), applied in
    /// the order added.
    pub fn with_custom_opcode(mut self, entry: OverlayEntry) -> Self {
        self.custom_opcodes.push(entry);
        self
    }

    /// Appends the full opcode-table overlay in one call.
    pub fn with_custom_opcodes(mut self, entries: Vec<OverlayEntry>) -> Self {
        self.custom_opcodes.extend(entries);
        self
    }

    /// Appends one precompile-table overlay entry (`customPrecompiles`):
    /// `None` deletes a built-in at `address`, `Some` installs or overrides.
    pub fn with_custom_precompile(mut self, address: Address, function: Option<DynPrecompileFn>) -> Self {
        self.custom_precompiles.push((address, function));
        self
    }

    /// Appends the full precompile overlay in one call.
    pub fn with_custom_precompiles(mut self, entries: Vec<(Address, Option<DynPrecompileFn>)>) -> Self {
        self.custom_precompiles.extend(entries);
        self
    }

    /// Skips the EIP-170 deployed-code size check (`allowUnlimitedContractSize`).
    pub fn with_allow_unlimited_contract_size(mut self, allow: bool) -> Self {
        self.allow_unlimited_contract_size = allow;
        self
    }

    /// Sets the block/transaction environment `ORIGIN`/`COINBASE`/…
    /// opcodes read.
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    /// Consumes the builder, pairing it with `db` (`eei`), and produces a
    /// ready-to-run [`Evm`].
    pub fn build<DB: Database>(self, db: DB) -> Evm<DB> {
        let rules = ChainRules::new(self.spec_id);
        Evm::from_parts(
            Journal::new(db),
            interpreter::OpcodeTable::with_overlay(self.custom_opcodes),
            Precompiles::with_overlay(rules, self.custom_precompiles),
            rules,
            MessageCallConfig {
                allow_unlimited_contract_size: self.allow_unlimited_contract_size,
            },
            self.env,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloning_a_builder_copies_custom_opcodes_by_value() {
        let original = EvmBuilder::new().with_custom_opcode(OverlayEntry::delete(0x01));
        let mut clone = original.clone();
        clone.custom_opcodes.push(OverlayEntry::delete(0x02));
        assert_eq!(original.custom_opcodes.len(), 1);
        assert_eq!(clone.custom_opcodes.len(), 2);
    }
}
