//! Fetch/decode/execute main loop (distilled spec §4.4).
//!
//! [`run`] drives one call frame to completion, dispatching through an
//! [`OpcodeTable`] and notifying any registered [`Inspector`] before each
//! opcode's `logicFn` runs. It never recurses into a sub-call itself — that
//! is [`Host::call`]/[`Host::create`]'s job, one layer up in the `handler`
//! crate — so this loop stays a flat, synchronous state machine.

use crate::{HaltReason, Host, OpcodeTable, RunState};

/// A single opcode fetch, passed to every registered [`Inspector`] just
/// before the opcode's `logicFn` runs (distilled spec §4.4 step 7, §9
/// "Step events").
#[derive(Clone, Copy, Debug)]
pub struct StepEvent<'a> {
    /// Program counter of the fetched opcode.
    pub pc: usize,
    /// The opcode byte itself.
    pub op: u8,
    /// Mnemonic, or `"UNKNOWN"` if no descriptor exists for `op`.
    pub name: &'a str,
    /// Gas remaining *before* this step's charge is deducted.
    pub gas_left: u64,
    /// Call-frame depth.
    pub depth: usize,
}

/// Observer notified synchronously around every opcode step.
///
/// Implementations must not retain references to the [`RunState`] they are
/// passed beyond the call, and must not mutate it (distilled spec §5:
/// "observers must not mutate RunState").
pub trait Inspector {
    /// Called after gas has been charged but before `logicFn` runs.
    fn step(&mut self, event: &StepEvent<'_>, state: &RunState);
}

/// An [`Inspector`] that does nothing; the default when no tracing is
/// requested.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInspector;

impl Inspector for NoopInspector {
    #[inline]
    fn step(&mut self, _event: &StepEvent<'_>, _state: &RunState) {}
}

/// Runs `state` to completion against `table`, consulting `host` for every
/// state-touching opcode, notifying `inspector` before each step.
///
/// Returns the terminal [`HaltReason`]. Every exceptional variant has
/// already zeroed `state.gas_left` by the time this returns; only
/// [`HaltReason::Revert`] (and the success variants) leave gas standing.
pub fn run_inspected(
    state: &mut RunState,
    host: &mut dyn Host,
    table: &OpcodeTable,
    inspector: &mut dyn Inspector,
) -> HaltReason {
    loop {
        if state.pc >= state.code.len() {
            return HaltReason::Stop;
        }

        let op = state.code.bytes()[state.pc];
        let Some(descriptor) = table.get(op) else {
            state.consume_all_gas();
            return HaltReason::InvalidOpcode;
        };

        let depth = state.stack.len();
        if depth < descriptor.min_stack {
            state.consume_all_gas();
            return HaltReason::StackUnderflow;
        }
        if depth > descriptor.max_stack {
            state.consume_all_gas();
            return HaltReason::StackOverflow;
        }

        if state.is_static && is_state_mutating(op) {
            state.consume_all_gas();
            return HaltReason::StaticStateChange;
        }

        let charge = match (descriptor.gas_fn)(state, host, descriptor.base_fee) {
            Ok(charge) => charge,
            Err(halt) => {
                if halt.consumes_all_gas() {
                    state.consume_all_gas();
                }
                return halt;
            }
        };
        if charge > state.gas_left {
            state.consume_all_gas();
            return HaltReason::OutOfGas;
        }
        state.deduct_gas(charge);

        let event = StepEvent {
            pc: state.pc,
            op,
            name: descriptor.name.as_ref(),
            gas_left: state.gas_left,
            depth: state.depth,
        };
        inspector.step(&event, state);

        // Default next-instruction pointer; PUSHn advances it further,
        // JUMP/JUMPI overwrite it outright (distilled spec §4.4 step 8).
        state.pc += 1;

        if let Err(halt) = (descriptor.logic_fn)(state, host) {
            if halt.consumes_all_gas() {
                state.consume_all_gas();
            }
            return halt;
        }
    }
}

/// Runs `state` to completion with no inspector attached.
pub fn run(state: &mut RunState, host: &mut dyn Host, table: &OpcodeTable) -> HaltReason {
    run_inspected(state, host, table, &mut NoopInspector)
}

/// True for opcodes the static-call check (distilled spec §4.4 step 5)
/// rejects outright: `SSTORE`, `LOG0..LOG4`, `CREATE`, `CREATE2`,
/// `SELFDESTRUCT`, and `CALL` (but only when it carries value — that extra
/// condition is checked by `CALL`'s own `logicFn`, since it needs the stack
/// value argument this dispatch-time check does not have access to).
fn is_state_mutating(op: u8) -> bool {
    matches!(
        op,
        0x55 | 0xa0..=0xa4 | 0xf0 | 0xf5 | 0xff
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHost;
    use bytecode::Bytecode;
    use primitives::{Address, Bytes, U256};
    use state::{InMemoryDb, Journal};

    fn exec(code: &[u8], gas_limit: u64) -> (RunState, HaltReason) {
        let table = OpcodeTable::new();
        let mut host = TestHost::new(Journal::new(InMemoryDb::new()));
        let mut state = RunState::new(
            Bytecode::new_legacy(Bytes::copy_from_slice(code)),
            gas_limit,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
            Bytes::new(),
            false,
            0,
        );
        let halt = run(&mut state, &mut host, &table);
        (state, halt)
    }

    #[test]
    fn empty_code_halts_stop() {
        let (_state, halt) = exec(&[], 100);
        assert_eq!(halt, HaltReason::Stop);
    }

    #[test]
    fn add_two_numbers() {
        // PUSH1 1 PUSH1 2 ADD
        let (state, halt) = exec(&[0x60, 0x01, 0x60, 0x02, 0x01], 100_000);
        assert_eq!(halt, HaltReason::Stop);
        assert_eq!(state.stack.data(), &[U256::from(3)]);
    }

    #[test]
    fn jump_to_valid_dest() {
        // PUSH1 3 JUMP JUMPDEST STOP  -- pc 0..1 push, pc2 jump, pc3 jumpdest, pc4 stop
        let (state, halt) = exec(&[0x60, 0x04, 0x56, 0x00, 0x5b, 0x00], 100_000);
        assert_eq!(halt, HaltReason::Stop);
        assert_eq!(state.pc, 5);
    }

    #[test]
    fn jump_to_invalid_dest_halts() {
        // PUSH1 3 JUMP (pc 3 is not a JUMPDEST)
        let (_state, halt) = exec(&[0x60, 0x03, 0x56, 0x00], 100_000);
        assert_eq!(halt, HaltReason::InvalidJump);
    }

    #[test]
    fn out_of_gas_consumes_all() {
        let (state, halt) = exec(&[0x60, 0x01, 0x60, 0x02, 0x01], 5);
        assert_eq!(halt, HaltReason::OutOfGas);
        assert_eq!(state.gas_left, 0);
    }

    #[test]
    fn revert_preserves_remaining_gas() {
        // PUSH1 0 PUSH1 0 REVERT
        let (state, halt) = exec(&[0x60, 0x00, 0x60, 0x00, 0xfd], 100_000);
        assert_eq!(halt, HaltReason::Revert(Bytes::new()));
        assert!(state.gas_left > 0);
    }
}
