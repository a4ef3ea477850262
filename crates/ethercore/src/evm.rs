//! [`Evm`]: a built execution pipeline, and its `runCode` entry point
//! (distilled spec §6).
//!
//! Grounded on `revm`'s top-level `Evm<EXT, DB>` (`crates/revm/src/evm.rs`),
//! narrowed to the one operation distilled spec §6 names: running a single
//! blob of code against an explicit caller/origin/address/value/depth
//! context, not a full signed-transaction pipeline (intrinsic gas, nonce
//! and chain-id validation are the "transaction-fatal" errors distilled
//! spec §7 explicitly pushes out to "the transaction driver" — a layer
//! this crate doesn't implement).

use alloc::vec::Vec;
use bytecode::Bytecode;
use context::{ChainRules, Env};
use handler::MessageCallConfig;
use interpreter::{HaltReason, Host, Inspector, NoopInspector, OpcodeTable};
use precompile::Precompiles;
use primitives::{Address, Bytes, Log, U256};
use state::{Database, Journal};

use handler::MessageCall;

/// Arguments to [`Evm::run_code`] (distilled spec §6
/// `runCode({code, data?, gasLimit, caller?, origin?, address?, value?,
/// depth?, isStatic?})`). Every field but `code`/`gas_limit` defaults to its
/// zero value, matching the `?` fields the distilled spec marks optional.
#[derive(Clone, Debug)]
pub struct RunCodeParams {
    /// Bytecode to execute, run as legacy (non-EOF) code.
    pub code: Bytes,
    /// `CALLDATA`.
    pub data: Bytes,
    /// Gas made available to the run.
    pub gas_limit: u64,
    /// `CALLER`.
    pub caller: Address,
    /// `ORIGIN`. Not read by this entry point directly (`ORIGIN` is read
    /// from `Env::tx`, set at `Evm` construction) but accepted for
    /// API-compatibility with the distilled spec's parameter list; callers
    /// that need a per-run origin should rebuild the `Evm` with a matching
    /// `Env` instead.
    pub origin: Address,
    /// `ADDRESS`.
    pub address: Address,
    /// `CALLVALUE`. Not transferred between accounts — `runCode` runs code
    /// directly rather than entering an account via message-call framing,
    /// so there is no balance to move; this only sets what `CALLVALUE`
    /// reads.
    pub value: U256,
    /// Call-stack depth to run at.
    pub depth: usize,
    /// Forces the static-call restriction on.
    pub is_static: bool,
}

impl RunCodeParams {
    /// The only two fields distilled spec §6 marks required; every other
    /// field defaults to zero/`false`.
    pub fn new(code: Bytes, gas_limit: u64) -> Self {
        Self {
            code,
            data: Bytes::new(),
            gas_limit,
            caller: Address::ZERO,
            origin: Address::ZERO,
            address: Address::ZERO,
            value: U256::ZERO,
            depth: 0,
            is_static: false,
        }
    }
}

/// A minimal post-execution snapshot of the interpreter frame `runCode` ran,
/// for debugging (distilled spec §6 `runState?`). Message-call framing
/// deliberately doesn't expose a nested frame's live `pc`/stack/memory
/// across the `Host` boundary (`handler::MessageCall::enter_call`/
/// `enter_create` return only `CallOutcome`/`CreateOutcome`), so this is
/// only ever populated for the outermost frame `runCode` itself ran — the
/// one case where `Evm::run_code` holds the `RunState` directly.
#[derive(Clone, Debug)]
pub struct RunStateSummary {
    /// Program counter at halt.
    pub pc: usize,
    /// Gas left in the frame at halt.
    pub gas_left: u64,
    /// Operand stack depth at halt.
    pub stack_depth: usize,
    /// Linear memory size, in bytes, at halt.
    pub memory_size: usize,
}

/// Result of [`Evm::run_code`] (distilled spec §6 `{executionGasUsed,
/// returnValue, exceptionError?, runState?, gas, logs?}`).
#[derive(Clone, Debug)]
pub struct RunCodeResult {
    /// Gas consumed by the run (`gasLimit - gas`).
    pub execution_gas_used: u64,
    /// `RETURN`/`REVERT` data; empty for every other halt reason.
    pub return_value: Bytes,
    /// Present exactly when the run failed, carrying the stable taxonomy
    /// string from distilled spec §6 (`interpreter::HaltReason::as_str`).
    /// Its presence always means failure, even when `return_value` is
    /// non-empty (the `Revert` case), matching distilled spec §7's
    /// "presence of `exceptionError` always means this execution failed".
    pub exception_error: Option<&'static str>,
    /// Debugging snapshot of the frame at halt, see [`RunStateSummary`].
    pub run_state: Option<RunStateSummary>,
    /// Gas remaining in the frame at halt.
    pub gas: u64,
    /// Logs emitted by the run, `None` on failure (a reverted or
    /// exceptionally-halted frame's logs are discarded along with the
    /// rest of its state, same as every nested call).
    pub logs: Option<Vec<Log>>,
    /// SSTORE/SELFDESTRUCT refund counter accumulated so far this `Evm`'s
    /// lifetime (distilled spec's refund counter is transaction-scoped;
    /// since `Evm` persists its `Journal` across calls rather than
    /// starting a fresh one per `run_code`, this accumulates until the
    /// caller builds a new `Evm`).
    pub refund: i64,
}

/// A built execution pipeline: one [`Journal`] (and the [`Database`] it
/// wraps), plus the opcode table, precompile set, hardfork rules and
/// message-call config an [`crate::EvmBuilder`] assembled.
///
/// The [`Journal`] persists across calls to [`Evm::run_code`] rather than
/// being rebuilt fresh each time, so a sequence of `run_code` calls against
/// the same `Evm` behaves like a scripted sequence of transactions against
/// one piece of state — the natural reading of distilled spec §6's
/// `runCode` as a REPL-style entry point into an already-running EVM,
/// rather than a one-shot throwaway.
pub struct Evm<DB> {
    journal: Option<Journal<DB>>,
    table: OpcodeTable,
    precompiles: Precompiles,
    rules: ChainRules,
    config: MessageCallConfig,
    env: Env,
}

impl<DB: Database> Evm<DB> {
    pub(crate) fn from_parts(
        journal: Journal<DB>,
        table: OpcodeTable,
        precompiles: Precompiles,
        rules: ChainRules,
        config: MessageCallConfig,
        env: Env,
    ) -> Self {
        Self {
            journal: Some(journal),
            table,
            precompiles,
            rules,
            config,
            env,
        }
    }

    /// Active hardfork.
    pub fn spec_id(&self) -> context::SpecId {
        self.rules.spec_id()
    }

    /// Block/transaction environment this `Evm` runs code against.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Replaces the block/transaction environment for subsequent runs.
    pub fn set_env(&mut self, env: Env) {
        self.env = env;
    }

    /// Runs `params.code`, tracing every opcode step through `inspector`.
    pub fn run_code_inspected(&mut self, params: RunCodeParams, inspector: &mut dyn Inspector) -> RunCodeResult {
        let journal = self
            .journal
            .take()
            .expect("journal is always restored before the next call");

        let mut env = self.env.clone();
        env.tx.origin = params.origin;

        let mut message_call = MessageCall::new(
            journal,
            self.table.clone(),
            self.precompiles.clone(),
            env,
            self.rules,
            self.config,
            inspector,
        );

        let (halt, state) = message_call.run_code(
            Bytecode::new_legacy(params.code),
            params.gas_limit,
            params.caller,
            params.address,
            params.value,
            params.data,
            params.is_static,
            params.depth,
        );
        let refund = message_call.refund();
        self.journal = Some(message_call.into_journal());

        let execution_gas_used = state.gas_used();
        let return_value = match &halt {
            HaltReason::Return(data) | HaltReason::Revert(data) => data.clone(),
            _ => Bytes::new(),
        };
        let exception_error = if halt.is_success() { None } else { Some(halt.as_str()) };
        let logs = if halt.is_success() { Some(state.logs) } else { None };

        RunCodeResult {
            execution_gas_used,
            return_value,
            exception_error,
            run_state: Some(RunStateSummary {
                pc: state.pc,
                gas_left: state.gas_left,
                stack_depth: state.stack.len(),
                memory_size: state.memory.len(),
            }),
            gas: state.gas_left,
            logs,
            refund,
        }
    }

    /// Runs `params.code` with no step tracing (distilled spec §6 `runCode`).
    pub fn run_code(&mut self, params: RunCodeParams) -> RunCodeResult {
        self.run_code_inspected(params, &mut NoopInspector)
    }

    /// Drops every account touched this `Evm`'s lifetime that ended up
    /// empty per EIP-161 (distilled spec's EEI `cleanupTouchedAccounts`).
    /// Not run automatically after every `run_code` call, since a caller
    /// scripting several calls against the same `Evm` may want touched
    /// accounts to stay visible (e.g. to a tracer) between them; call this
    /// once after the outermost call of what the caller considers "one
    /// transaction" is done.
    pub fn cleanup_touched_accounts(&mut self) {
        if let Some(journal) = self.journal.as_mut() {
            journal.cleanup_touched_accounts();
        }
    }

    /// Every account this `Evm`'s `Journal` has modified since it was
    /// built, for a caller that wants to inspect or persist the resulting
    /// state diff (distilled spec's EEI has no single "commit" call for
    /// this — `state::Journal::dirty_accounts` is the lower-level
    /// mechanism every EEI method like `putAccount`/`putContractCode`
    /// ultimately feeds).
    pub fn dirty_accounts(&self) -> alloc::vec::Vec<(Address, U256, u64)> {
        self.journal
            .as_ref()
            .map(|journal| {
                journal
                    .dirty_accounts()
                    .map(|(address, account)| (*address, account.info.balance, account.info.nonce))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvmBuilder;
    use context::SpecId;
    use state::InMemoryDb;

    #[test]
    fn run_code_returns_value_without_message_framing() {
        // PUSH1 5 PUSH1 0 MSTORE PUSH1 0x20 PUSH1 0 RETURN
        let code = hex::decode("6005600052602060006000f3").unwrap();
        let mut evm = EvmBuilder::new()
            .with_spec_id(SpecId::LATEST)
            .build(InMemoryDb::new());
        let result = evm.run_code(RunCodeParams::new(Bytes::copy_from_slice(&code), 1_000_000));
        assert!(result.exception_error.is_none());
        assert_eq!(result.return_value.as_ref(), U256::from(5).to_be_bytes::<32>().as_slice());
        assert_eq!(result.execution_gas_used + result.gas, 1_000_000);
    }

    #[test]
    fn run_code_surfaces_stable_error_string_on_stack_underflow() {
        let code = [0x01]; // ADD with an empty stack
        let mut evm = EvmBuilder::new().build(InMemoryDb::new());
        let result = evm.run_code(RunCodeParams::new(Bytes::copy_from_slice(&code), 1_000));
        assert_eq!(result.exception_error, Some("stack underflow"));
        assert_eq!(result.gas, 0);
    }

    #[test]
    fn allow_unlimited_contract_size_flag_reaches_the_built_evm() {
        let evm = EvmBuilder::new()
            .with_allow_unlimited_contract_size(true)
            .build(InMemoryDb::new());
        assert!(evm.config.allow_unlimited_contract_size);
    }
}
