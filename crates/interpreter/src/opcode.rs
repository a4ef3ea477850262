//! Pluggable opcode dispatch table (distilled spec §4.3).
//!
//! [`OpcodeTable::new`] shares one process-wide, shared-immutable default
//! table (built lazily, once, via `once_cell`) that is never mutated; each
//! [`OpcodeTable`] instance adds its own overlay on top, which can delete or
//! override individual opcode slots without touching the defaults or any
//! other table's overlay.

use crate::{HaltReason, Host, RunState};
use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use once_cell::sync::Lazy;

/// `gasFn`: computes the total gas (including the static `base_fee`)
/// charged for one step of this opcode. May read or warm the journal
/// (e.g. EIP-2929 cold/warm bookkeeping) as a side effect of pricing.
pub type GasFn = Arc<dyn Fn(&mut RunState, &mut dyn Host, u64) -> Result<u64, HaltReason> + Send + Sync>;

/// `logicFn`: performs the opcode's effect. `Ok(())` continues the loop
/// (advancing `pc` as the opcode dictates); `Err` halts the frame.
pub type LogicFn = Arc<dyn Fn(&mut RunState, &mut dyn Host) -> Result<(), HaltReason> + Send + Sync>;

/// One opcode's complete behavior: identity, pricing, stack contract and
/// effect (distilled spec §3 `OpcodeDescriptor`).
#[derive(Clone)]
pub struct OpcodeDescriptor {
    /// The single byte this descriptor answers to.
    pub code: u8,
    /// Human-readable mnemonic, surfaced in step events and error messages.
    pub name: Cow<'static, str>,
    /// Static component of the gas charge; `gas_fn` is given this and
    /// returns the total (static + dynamic) cost.
    pub base_fee: u64,
    /// Minimum stack depth required to execute.
    pub min_stack: usize,
    /// Maximum stack depth allowed and still leave room for this opcode's
    /// net pushes (`1024 - max(0, pushes - pops)`).
    pub max_stack: usize,
    /// Reserved for non-blocking/async opcode variants; no built-in opcode
    /// sets this and the synchronous interpreter loop does not consult it
    /// (distilled spec §5: "No opcode may suspend").
    pub is_async: bool,
    /// Dynamic + static gas cost function.
    pub gas_fn: GasFn,
    /// Opcode effect.
    pub logic_fn: LogicFn,
}

impl core::fmt::Debug for OpcodeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpcodeDescriptor")
            .field("code", &self.code)
            .field("name", &self.name)
            .field("base_fee", &self.base_fee)
            .finish()
    }
}

/// One overlay entry: deletes `opcode` if `descriptor` is `None`, otherwise
/// installs the given descriptor in that slot (distilled spec §4.3 step 2).
#[derive(Clone)]
pub struct OverlayEntry {
    /// Slot this entry affects.
    pub opcode: u8,
    /// `None` deletes the slot; `Some` overrides it.
    pub descriptor: Option<OpcodeDescriptor>,
}

impl OverlayEntry {
    /// Deletes `opcode`'s slot.
    pub fn delete(opcode: u8) -> Self {
        Self {
            opcode,
            descriptor: None,
        }
    }

    /// Installs `descriptor` at `descriptor.code`.
    pub fn install(descriptor: OpcodeDescriptor) -> Self {
        Self {
            opcode: descriptor.code,
            descriptor: Some(descriptor),
        }
    }
}

type DefaultTable = [Option<OpcodeDescriptor>; 256];

static DEFAULTS: Lazy<Arc<DefaultTable>> = Lazy::new(|| Arc::new(crate::instructions::build_default_table()));

/// Immutable default table plus a per-EVM overlay (distilled spec §4.3,
/// §4.4 and the "default isolation" testable property).
///
/// Constructing one EVM's overlay never affects another's — each
/// `OpcodeTable` clones the same `Arc` handle to the shared defaults but
/// owns an independent overlay `Vec`. Cloning a table copies that overlay
/// list by value, per distilled spec §4.3 step 4.
#[derive(Clone)]
pub struct OpcodeTable {
    defaults: Arc<DefaultTable>,
    overlay: Vec<OverlayEntry>,
}

impl OpcodeTable {
    /// Builds a table over the shared defaults with no overlay.
    pub fn new() -> Self {
        Self {
            defaults: Lazy::force(&DEFAULTS).clone(),
            overlay: Vec::new(),
        }
    }

    /// Builds a table applying `overlay` in order over the shared defaults.
    pub fn with_overlay(overlay: Vec<OverlayEntry>) -> Self {
        Self {
            defaults: Lazy::force(&DEFAULTS).clone(),
            overlay,
        }
    }

    /// Effective lookup: the last overlay entry for `opcode` wins; absent
    /// from the overlay falls through to the defaults. A slot marked
    /// deleted in the overlay returns `None` regardless of defaults.
    pub fn get(&self, opcode: u8) -> Option<&OpcodeDescriptor> {
        for entry in self.overlay.iter().rev() {
            if entry.opcode == opcode {
                return entry.descriptor.as_ref();
            }
        }
        self.defaults[opcode as usize].as_ref()
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHost;
    use crate::RunState;
    use primitives::{Address, Bytes, U256};
    use state::{DatabaseError, InMemoryDb, Journal};

    fn run_code(table: &OpcodeTable, code: &[u8], gas_limit: u64) -> (u64, Vec<U256>, Option<HaltReason>) {
        let mut host = TestHost::new(Journal::new(InMemoryDb::new()));
        let mut state = RunState::new(
            bytecode::Bytecode::new_legacy(Bytes::copy_from_slice(code)),
            gas_limit,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
            Bytes::new(),
            false,
            0,
        );
        let halt = crate::interpreter::run(&mut state, &mut host, table);
        (state.gas_used(), state.stack.data().to_vec(), Some(halt))
    }

    #[test]
    fn custom_opcode_gas_and_logic() {
        let descriptor = OpcodeDescriptor {
            code: 0x21,
            name: "TEST".into(),
            base_fee: 333,
            min_stack: 0,
            max_stack: 1024,
            is_async: false,
            gas_fn: Arc::new(|_rs, _host, base| Ok(base + 33)),
            logic_fn: Arc::new(|rs, _host| {
                rs.stack
                    .push(U256::from(1))
                    .map_err(|_| HaltReason::StackOverflow)
            }),
        };
        let table = OpcodeTable::with_overlay(alloc::vec![OverlayEntry::install(descriptor)]);
        let (gas_used, stack, halt) = run_code(&table, &[0x21], 123_456);
        assert_eq!(gas_used, 366);
        assert_eq!(stack, alloc::vec![U256::from(1)]);
        assert_eq!(halt, Some(HaltReason::Stop));
    }

    #[test]
    fn opcode_deletion_is_invalid_opcode() {
        let table = OpcodeTable::with_overlay(alloc::vec![OverlayEntry::delete(0x20)]);
        let (gas_used, _stack, halt) = run_code(&table, &[0x20], 123_456);
        assert_eq!(gas_used, 123_456);
        assert_eq!(halt, Some(HaltReason::InvalidOpcode));
    }

    #[test]
    fn default_table_is_unaffected_by_another_tables_overlay() {
        let _deleting_table = OpcodeTable::with_overlay(alloc::vec![OverlayEntry::delete(0x01)]);
        let fresh = OpcodeTable::new();
        // PUSH1 4 PUSH1 1 ADD PUSH1 0 MSTORE PUSH1 0x20 PUSH1 0 RETURN
        let code = hex::decode("60046001016000526001601ff3").unwrap();
        let (_gas_used, _stack, halt) = run_code(&fresh, &code, 100_000);
        assert_eq!(halt, Some(HaltReason::Return(Bytes::from_static(&[0x05]))));
    }

    #[test]
    fn overriding_default_slot() {
        let descriptor = OpcodeDescriptor {
            code: 0x20,
            name: "TEST".into(),
            base_fee: 333,
            min_stack: 0,
            max_stack: 1024,
            is_async: false,
            gas_fn: Arc::new(|_rs, _host, base| Ok(base + 33)),
            logic_fn: Arc::new(|rs, _host| {
                rs.stack
                    .push(U256::from(1))
                    .map_err(|_| HaltReason::StackOverflow)
            }),
        };
        let table = OpcodeTable::with_overlay(alloc::vec![OverlayEntry::install(descriptor)]);
        let (gas_used, stack, _halt) = run_code(&table, &[0x20], 123_456);
        assert_eq!(gas_used, 366);
        assert_eq!(stack, alloc::vec![U256::from(1)]);
    }

    #[allow(dead_code)]
    fn assert_database_error_is_used(_: DatabaseError) {}
}
