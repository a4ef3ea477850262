//! Minimal [`Host`] used only by this crate's own opcode/interpreter unit
//! tests (distilled spec §8 scenarios). It forwards every state operation
//! straight to a bare [`Journal`] and treats `CALL`/`CREATE` as always
//! failing, since framing a real sub-call needs an opcode table and
//! precompile set that only the `handler` crate's `Host` implementation has
//! access to. Mirrors the role of the teacher's `DummyHost`.

use crate::host::{CallInputs, CallOutcome, CreateInputs, CreateOutcome, Host};
use bytecode::Bytecode;
use context::Env;
use primitives::{Address, B256, U256};
use state::{Database, DatabaseError, Journal, JournalCheckpoint};

pub struct TestHost<DB> {
    pub journal: Journal<DB>,
    pub env: Env,
}

impl<DB: Database> TestHost<DB> {
    pub fn new(journal: Journal<DB>) -> Self {
        Self {
            journal,
            env: Env::default(),
        }
    }
}

impl<DB: Database> Host for TestHost<DB> {
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

    fn sstore(
        &mut self,
        address: Address,
        key: U256,
        new_value: U256,
    ) -> Result<(U256, U256, bool), DatabaseError> {
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
        CallOutcome {
            success: false,
            gas_left: inputs.gas,
            return_data: primitives::Bytes::new(),
            logs: alloc::vec::Vec::new(),
        }
    }

    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome {
        CreateOutcome {
            success: false,
            gas_left: inputs.gas,
            address: None,
            return_data: primitives::Bytes::new(),
            logs: alloc::vec::Vec::new(),
        }
    }
}
