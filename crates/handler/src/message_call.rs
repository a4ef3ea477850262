//! [`MessageCall`]: the [`Host`] implementation that frames `CALL`/`CREATE`
//! (distilled spec §4.5) by recursing into a fresh [`RunState`] for every
//! nested sub-call, all sharing the one [`Journal`] whose checkpoints this
//! type opens and closes.

use crate::address::{create2_address, create_address};
use crate::{MessageCallConfig, MAX_CALL_DEPTH};
use alloc::rc::Rc;
use alloc::vec::Vec;
use bytecode::Bytecode;
use context::{ChainRules, Env};
use core::cell::RefCell;
use interpreter::{
    gas, run_inspected, CallInputs, CallKind, CallOutcome, CreateInputs, CreateKind, CreateOutcome, HaltReason,
    Host, Inspector, OpcodeTable, RunState, StepEvent,
};
use precompile::Precompiles;
use primitives::{Address, Bytes, Log, B256, KECCAK_EMPTY, MAX_CODE_SIZE, U256};
use state::{Database, DatabaseError, Journal, JournalCheckpoint};

/// Cheap-to-clone handle to the caller's [`Inspector`], so [`MessageCall`]'s
/// [`Host::call`]/[`Host::create`] can hand a fresh inspector reference down
/// into each nested [`run_inspected`] without needing two independent
/// `&mut` borrows of `self` in the same call (one as `&mut dyn Host`, one
/// as `&mut dyn Inspector`) — the borrow checker cannot split a trait
/// object's borrow by field, so the inspector lives behind its own
/// reference-counted cell instead of a `MessageCall` field accessed
/// directly.
struct SharedInspector<'i>(Rc<RefCell<&'i mut dyn Inspector>>);

impl<'i> Clone for SharedInspector<'i> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<'i> Inspector for SharedInspector<'i> {
    fn step(&mut self, event: &StepEvent<'_>, state: &RunState) {
        self.0.borrow_mut().step(event, state)
    }
}

/// Outcome of the outermost `CALL` or `CREATE` of a transaction: everything
/// [`crate`]'s caller (the `ethercore` facade) needs to assemble the
/// `runCode` result (distilled spec §6).
#[derive(Debug)]
pub struct TransactOutcome {
    /// Terminal reason the outermost frame stopped.
    pub halt: HaltReason,
    /// Gas left in the outermost frame when it stopped.
    pub gas_left: u64,
    /// Every log emitted by the outermost call and everything it called,
    /// empty if the outermost call failed.
    pub logs: Vec<Log>,
    /// Deployed contract address, only set by a successful `transact_create`.
    pub created_address: Option<Address>,
    /// Raw (uncapped) refund counter accumulated this transaction.
    pub refund: i64,
}

fn failed_call(gas_left: u64) -> CallOutcome {
    CallOutcome {
        success: false,
        gas_left,
        return_data: Bytes::new(),
        logs: Vec::new(),
    }
}

fn failed_create(gas_left: u64) -> CreateOutcome {
    CreateOutcome {
        success: false,
        gas_left,
        address: None,
        return_data: Bytes::new(),
        logs: Vec::new(),
    }
}

/// Owns the [`Journal`] for one transaction and frames every `CALL`/`CREATE`
/// against it, recursing through the `interpreter` crate's fetch/decode/
/// execute loop for each nested frame.
pub struct MessageCall<'i, DB> {
    journal: Journal<DB>,
    table: OpcodeTable,
    precompiles: Precompiles,
    env: Env,
    rules: ChainRules,
    config: MessageCallConfig,
    depth: usize,
    inspector: SharedInspector<'i>,
}

impl<'i, DB: Database> MessageCall<'i, DB> {
    /// Builds a fresh message-call driver over `journal`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        journal: Journal<DB>,
        table: OpcodeTable,
        precompiles: Precompiles,
        env: Env,
        rules: ChainRules,
        config: MessageCallConfig,
        inspector: &'i mut dyn Inspector,
    ) -> Self {
        Self {
            journal,
            table,
            precompiles,
            env,
            rules,
            config,
            depth: 0,
            inspector: SharedInspector(Rc::new(RefCell::new(inspector))),
        }
    }

    /// Runs the outermost `CALL` of a transaction.
    pub fn transact_call(&mut self, inputs: CallInputs) -> TransactOutcome {
        let outcome = self.enter_call(0, inputs);
        TransactOutcome {
            halt: if outcome.success { HaltReason::Stop } else { HaltReason::Revert(Bytes::new()) },
            gas_left: outcome.gas_left,
            logs: outcome.logs,
            created_address: None,
            refund: self.journal.refund(),
        }
    }

    /// Runs the outermost `CREATE`/`CREATE2` of a transaction.
    pub fn transact_create(&mut self, inputs: CreateInputs) -> TransactOutcome {
        let outcome = self.enter_create(0, inputs);
        TransactOutcome {
            halt: if outcome.success { HaltReason::Stop } else { HaltReason::Revert(outcome.return_data.clone()) },
            gas_left: outcome.gas_left,
            logs: outcome.logs,
            created_address: outcome.address,
            refund: self.journal.refund(),
        }
    }

    /// Releases the underlying journal once the transaction driver has read
    /// [`TransactOutcome`], so it can run `cleanup_touched_accounts` and
    /// commit dirty accounts to the real database.
    pub fn into_journal(self) -> Journal<DB> {
        self.journal
    }

    /// Runs `code` directly against `address`/`caller`/`value`, bypassing
    /// message-call framing entirely: no balance transfer, no precompile
    /// dispatch, no collision or empty-code short-circuit. This is the
    /// `ethercore` facade's `runCode` entry point (distilled spec §6),
    /// mirroring the narrower contract of "execute this bytecode" rather
    /// than "call this account".
    #[allow(clippy::too_many_arguments)]
    pub fn run_code(
        &mut self,
        code: Bytecode,
        gas_limit: u64,
        caller: Address,
        address: Address,
        value: U256,
        call_data: Bytes,
        is_static: bool,
        depth: usize,
    ) -> (HaltReason, RunState) {
        let mut state = RunState::with_rules(
            code, gas_limit, caller, address, value, call_data, is_static, depth, self.rules,
        );
        let halt = self.run_frame(&mut state, depth);
        (halt, state)
    }

    /// True per EIP-161: zero balance, zero nonce, no code.
    fn account_is_empty(&mut self, address: Address) -> Result<bool, DatabaseError> {
        let balance = self.journal.balance(address)?;
        let nonce = self.journal.nonce(address)?;
        let code_hash = self.journal.code_hash(address)?;
        Ok(balance.is_zero() && nonce == 0 && code_hash == KECCAK_EMPTY)
    }

    fn enter_call(&mut self, frame_depth: usize, inputs: CallInputs) -> CallOutcome {
        tracing::debug!(
            kind = ?inputs.kind,
            depth = frame_depth,
            gas = inputs.gas,
            target = %inputs.target,
            "entering call"
        );
        let outcome = self.enter_call_inner(frame_depth, inputs);
        tracing::trace!(success = outcome.success, gas_left = outcome.gas_left, "call exited");
        outcome
    }

    fn enter_call_inner(&mut self, frame_depth: usize, inputs: CallInputs) -> CallOutcome {
        if frame_depth > MAX_CALL_DEPTH {
            return failed_call(inputs.gas);
        }

        let transfers_value = matches!(inputs.kind, CallKind::Call | CallKind::CallCode) && !inputs.value.is_zero();
        if transfers_value {
            match self.journal.balance(inputs.caller) {
                Ok(balance) if balance >= inputs.value => {}
                _ => return failed_call(inputs.gas),
            }
        }

        let checkpoint = self.journal.checkpoint();

        if transfers_value {
            if self.journal.transfer(inputs.caller, inputs.target, inputs.value).is_err() {
                self.journal.revert(checkpoint);
                return failed_call(0);
            }
        } else if inputs.kind == CallKind::Call {
            // A zero-value CALL still touches the recipient (EIP-161 cleanup candidate).
            let _ = self.journal.touch_account(inputs.target);
        }

        if let Some(precompile) = self.precompiles.get(inputs.code_address) {
            return match precompile.call(&inputs.data, inputs.gas) {
                Ok(output) => {
                    self.journal.commit(checkpoint);
                    CallOutcome {
                        success: true,
                        gas_left: inputs.gas - output.gas_used,
                        return_data: output.bytes,
                        logs: Vec::new(),
                    }
                }
                Err(_) => {
                    self.journal.revert(checkpoint);
                    failed_call(0)
                }
            };
        }

        let code = match self.journal.code(inputs.code_address) {
            Ok(code) => code,
            Err(_) => {
                self.journal.revert(checkpoint);
                return failed_call(0);
            }
        };
        if code.is_empty() {
            self.journal.commit(checkpoint);
            return CallOutcome {
                success: true,
                gas_left: inputs.gas,
                return_data: Bytes::new(),
                logs: Vec::new(),
            };
        }

        let mut state = RunState::with_rules(
            code,
            inputs.gas,
            inputs.caller,
            inputs.target,
            inputs.value,
            inputs.data,
            inputs.is_static,
            frame_depth,
            self.rules,
        );
        let halt = self.run_frame(&mut state, frame_depth);

        if halt.is_success() {
            self.journal.commit(checkpoint);
            let return_data = match &halt {
                HaltReason::Return(data) => data.clone(),
                _ => Bytes::new(),
            };
            CallOutcome {
                success: true,
                gas_left: state.gas_left,
                return_data,
                logs: state.logs,
            }
        } else if let HaltReason::Revert(data) = halt {
            self.journal.revert(checkpoint);
            CallOutcome {
                success: false,
                gas_left: state.gas_left,
                return_data: data,
                logs: Vec::new(),
            }
        } else {
            self.journal.revert(checkpoint);
            CallOutcome {
                success: false,
                gas_left: state.gas_left,
                return_data: Bytes::new(),
                logs: Vec::new(),
            }
        }
    }

    fn enter_create(&mut self, frame_depth: usize, inputs: CreateInputs) -> CreateOutcome {
        tracing::debug!(
            kind = ?inputs.kind,
            depth = frame_depth,
            gas = inputs.gas,
            caller = %inputs.caller,
            "entering create"
        );
        let outcome = self.enter_create_inner(frame_depth, inputs);
        tracing::trace!(
            success = outcome.success,
            gas_left = outcome.gas_left,
            address = ?outcome.address,
            "create exited"
        );
        outcome
    }

    fn enter_create_inner(&mut self, frame_depth: usize, inputs: CreateInputs) -> CreateOutcome {
        if frame_depth > MAX_CALL_DEPTH {
            return failed_create(inputs.gas);
        }
        if !inputs.value.is_zero() {
            match self.journal.balance(inputs.caller) {
                Ok(balance) if balance >= inputs.value => {}
                _ => return failed_create(inputs.gas),
            }
        }

        let nonce = match self.journal.nonce(inputs.caller) {
            Ok(nonce) => nonce,
            Err(_) => return failed_create(0),
        };
        if self.journal.bump_nonce(inputs.caller).is_err() {
            return failed_create(0);
        }

        let init_code_hash = primitives::keccak256(&inputs.init_code);
        let address = match inputs.kind {
            CreateKind::Create => create_address(inputs.caller, nonce),
            CreateKind::Create2 => create2_address(inputs.caller, inputs.salt.unwrap_or_default(), init_code_hash),
        };

        let collides = self.journal.nonce(address).unwrap_or(0) != 0
            || self.journal.code_hash(address).unwrap_or(KECCAK_EMPTY) != KECCAK_EMPTY;
        if collides {
            return failed_create(0);
        }

        let checkpoint = self.journal.checkpoint();
        self.journal.mark_created(address);

        if !inputs.value.is_zero() {
            if self.journal.transfer(inputs.caller, address, inputs.value).is_err() {
                self.journal.revert(checkpoint);
                return failed_create(0);
            }
        } else {
            let _ = self.journal.touch_account(address);
        }
        // New contract accounts start at nonce 1 (EIP-161).
        if self.journal.bump_nonce(address).is_err() {
            self.journal.revert(checkpoint);
            return failed_create(0);
        }

        let mut state = RunState::with_rules(
            Bytecode::new_legacy(inputs.init_code),
            inputs.gas,
            inputs.caller,
            address,
            inputs.value,
            Bytes::new(),
            false,
            frame_depth,
            self.rules,
        );
        let halt = self.run_frame(&mut state, frame_depth);

        match halt {
            HaltReason::Stop => {
                self.journal.commit(checkpoint);
                CreateOutcome {
                    success: true,
                    gas_left: state.gas_left,
                    address: Some(address),
                    return_data: Bytes::new(),
                    logs: state.logs,
                }
            }
            HaltReason::Return(deployed) => self.deposit_code(checkpoint, address, state, deployed),
            HaltReason::Revert(data) => {
                self.journal.revert(checkpoint);
                CreateOutcome {
                    success: false,
                    gas_left: state.gas_left,
                    address: None,
                    return_data: data,
                    logs: Vec::new(),
                }
            }
            _ => {
                self.journal.revert(checkpoint);
                CreateOutcome {
                    success: false,
                    gas_left: state.gas_left,
                    address: None,
                    return_data: Bytes::new(),
                    logs: Vec::new(),
                }
            }
        }
    }

    /// Validates and persists initcode's returned bytes as the new
    /// contract's code (distilled spec §4.5 step 7).
    fn deposit_code(
        &mut self,
        checkpoint: JournalCheckpoint,
        address: Address,
        mut state: RunState,
        deployed: Bytes,
    ) -> CreateOutcome {
        if self.rules.rejects_eof_prefixed_code() && deployed.first() == Some(&0xEF) {
            self.journal.revert(checkpoint);
            return failed_create(0);
        }
        if self.rules.enforces_max_code_size()
            && !self.config.allow_unlimited_contract_size
            && deployed.len() > MAX_CODE_SIZE
        {
            self.journal.revert(checkpoint);
            return failed_create(0);
        }
        let deposit_cost = gas::CODE_DEPOSIT_PER_BYTE * deployed.len() as u64;
        if deposit_cost > state.gas_left {
            self.journal.revert(checkpoint);
            return failed_create(0);
        }
        state.gas_left -= deposit_cost;

        let code_hash = primitives::keccak256(&deployed);
        let bytecode = Bytecode::new_legacy_with_hash(deployed, code_hash);
        if self.journal.set_code(address, code_hash, bytecode).is_err() {
            self.journal.revert(checkpoint);
            return failed_create(0);
        }
        self.journal.commit(checkpoint);
        CreateOutcome {
            success: true,
            gas_left: state.gas_left,
            address: Some(address),
            return_data: Bytes::new(),
            logs: state.logs,
        }
    }

    /// Runs one interpreter frame at `frame_depth`, temporarily becoming the
    /// currently-executing frame's depth so a nested `Host::call`/`create`
    /// computes its own depth as `self.depth + 1`.
    fn run_frame(&mut self, state: &mut RunState, frame_depth: usize) -> HaltReason {
        let old_depth = self.depth;
        self.depth = frame_depth;
        let table = self.table.clone();
        let mut inspector = self.inspector.clone();
        let halt = run_inspected(state, self, &table, &mut inspector);
        self.depth = old_depth;
        halt
    }
}

impl<'i, DB: Database> Host for MessageCall<'i, DB> {
    fn env(&self) -> &Env {
        &self.env
    }

    fn load_account(&mut self, address: Address) -> Result<bool, DatabaseError> {
        self.journal.load_account(address)
    }

    fn balance(&mut self, address: Address) -> Result<U256, DatabaseError> {
        self.journal.balance(address)
    }

    fn nonce(&mut self, address: Address) -> Result<u64, DatabaseError> {
        self.journal.nonce(address)
    }

    fn code_hash(&mut self, address: Address) -> Result<B256, DatabaseError> {
        self.journal.code_hash(address)
    }

    fn code(&mut self, address: Address) -> Result<Bytecode, DatabaseError> {
        self.journal.code(address)
    }

    fn sload(&mut self, address: Address, key: U256) -> Result<(U256, bool), DatabaseError> {
        self.journal.sload(address, key)
    }

    fn storage_state(&mut self, address: Address, key: U256) -> Result<(U256, U256, bool), DatabaseError> {
        self.journal.storage_state(address, key)
    }

    fn sstore(&mut self, address: Address, key: U256, new_value: U256) -> Result<(U256, U256, bool), DatabaseError> {
        self.journal.sstore(address, key, new_value)
    }

    fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.journal.tload(address, key)
    }

    fn tstore(&mut self, address: Address, key: U256, value: U256) {
        self.journal.tstore(address, key, value)
    }

    fn warm_address(&mut self, address: Address) -> Result<bool, DatabaseError> {
        self.journal.warm_address(address)
    }

    fn warm_storage(&mut self, address: Address, key: U256) -> Result<bool, DatabaseError> {
        self.journal.warm_storage(address, key)
    }

    fn touch_account(&mut self, address: Address) -> Result<(), DatabaseError> {
        self.journal.touch_account(address)
    }

    fn add_refund(&mut self, delta: i64) {
        self.journal.add_refund(delta)
    }

    fn refund(&self) -> i64 {
        self.journal.refund()
    }

    fn selfdestruct(&mut self, address: Address, target: Address) -> Result<U256, DatabaseError> {
        self.journal.selfdestruct(address, target)
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, DatabaseError> {
        self.journal.database().block_hash(number)
    }

    fn checkpoint(&mut self) -> JournalCheckpoint {
        self.journal.checkpoint()
    }

    fn commit(&mut self, checkpoint: JournalCheckpoint) {
        self.journal.commit(checkpoint)
    }

    fn revert(&mut self, checkpoint: JournalCheckpoint) {
        self.journal.revert(checkpoint)
    }

    fn call(&mut self, inputs: CallInputs) -> CallOutcome {
        let frame_depth = self.depth + 1;
        self.enter_call(frame_depth, inputs)
    }

    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome {
        let frame_depth = self.depth + 1;
        self.enter_create(frame_depth, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context::SpecId;
    use interpreter::NoopInspector;
    use primitives::Bytes;
    use state::{DbAccount, InMemoryDb};

    fn rules() -> ChainRules {
        ChainRules::new(SpecId::LATEST)
    }

    fn setup(code: &[u8], caller_balance: U256) -> (InMemoryDb, Address, Address) {
        let mut db = InMemoryDb::new();
        let caller = Address::from_slice(&[0x11; 20]);
        let target = Address::from_slice(&[0x22; 20]);
        db.set_account(
            caller,
            DbAccount {
                balance: caller_balance,
                nonce: 0,
                code_hash: primitives::KECCAK_EMPTY,
            },
        );
        db.set_code(target, Bytecode::new_legacy(Bytes::copy_from_slice(code)));
        (db, caller, target)
    }

    #[test]
    fn simple_call_returns_value_and_commits() {
        // PUSH1 5 PUSH1 0 MSTORE PUSH1 0x20 PUSH1 0 RETURN
        let code = hex::decode("6005600052602060006000f3").unwrap();
        let (db, caller, target) = setup(&code, U256::ZERO);
        let mut inspector = NoopInspector;
        let mut mc = MessageCall::new(
            Journal::new(db),
            OpcodeTable::new(),
            Precompiles::new(rules()),
            Env::default(),
            rules(),
            MessageCallConfig::default(),
            &mut inspector,
        );
        let outcome = mc.transact_call(CallInputs {
            kind: CallKind::Call,
            target,
            code_address: target,
            caller,
            value: U256::ZERO,
            data: Bytes::new(),
            gas: 1_000_000,
            is_static: false,
        });
        assert!(matches!(outcome.halt, HaltReason::Stop));
        assert!(outcome.gas_left > 0);
    }

    #[test]
    fn call_with_insufficient_balance_fails_without_entering() {
        let (db, caller, target) = setup(&[0x00], U256::ZERO);
        let mut inspector = NoopInspector;
        let mut mc = MessageCall::new(
            Journal::new(db),
            OpcodeTable::new(),
            Precompiles::new(rules()),
            Env::default(),
            rules(),
            MessageCallConfig::default(),
            &mut inspector,
        );
        let outcome = mc.transact_call(CallInputs {
            kind: CallKind::Call,
            target,
            code_address: target,
            caller,
            value: U256::from(1),
            data: Bytes::new(),
            gas: 1_000_000,
            is_static: false,
        });
        assert!(matches!(outcome.halt, HaltReason::Revert(_)));
        assert_eq!(outcome.gas_left, 1_000_000);
    }

    #[test]
    fn create_deploys_code_at_derived_address() {
        // Initcode: PUSH1 1 PUSH1 0 MSTORE PUSH1 1 PUSH1 31 RETURN -> deploys single byte 0x01.
        let init = hex::decode("600160005260016000f3").unwrap();
        let init = {
            // fix return offset to 31 for single-byte deploy
            let mut v = init;
            let len = v.len();
            v[len - 3] = 0x1f;
            v
        };
        let mut db = InMemoryDb::new();
        let caller = Address::from_slice(&[0x33; 20]);
        db.set_account(
            caller,
            DbAccount {
                balance: U256::ZERO,
                nonce: 0,
                code_hash: primitives::KECCAK_EMPTY,
            },
        );
        let mut inspector = NoopInspector;
        let mut mc = MessageCall::new(
            Journal::new(db),
            OpcodeTable::new(),
            Precompiles::new(rules()),
            Env::default(),
            rules(),
            MessageCallConfig::default(),
            &mut inspector,
        );
        let outcome = mc.transact_create(CreateInputs {
            kind: CreateKind::Create,
            caller,
            value: U256::ZERO,
            init_code: Bytes::copy_from_slice(&init),
            salt: None,
            gas: 1_000_000,
        });
        assert!(matches!(outcome.halt, HaltReason::Stop));
        assert!(outcome.created_address.is_some());
    }

    #[test]
    fn run_code_executes_without_message_framing() {
        // PUSH1 5 PUSH1 0 MSTORE PUSH1 0x20 PUSH1 0 RETURN
        let code = hex::decode("6005600052602060006000f3").unwrap();
        let db = InMemoryDb::new();
        let mut inspector = NoopInspector;
        let mut mc = MessageCall::new(
            Journal::new(db),
            OpcodeTable::new(),
            Precompiles::new(rules()),
            Env::default(),
            rules(),
            MessageCallConfig::default(),
            &mut inspector,
        );
        let address = Address::from_slice(&[0x44; 20]);
        let (halt, state) = mc.run_code(
            Bytecode::new_legacy(Bytes::copy_from_slice(&code)),
            1_000_000,
            Address::ZERO,
            address,
            U256::ZERO,
            Bytes::new(),
            false,
            0,
        );
        assert!(matches!(halt, HaltReason::Return(_)));
        assert!(state.gas_used() > 0);
    }
}
