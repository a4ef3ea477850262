//! The narrow, object-safe view of state and sub-call execution that opcode
//! `gasFn`/`logicFn` closures are given (distilled spec §6 "State interface
//! (EEI)" plus the CALL/CREATE framing hook).
//!
//! Keeping this a trait object rather than threading a `Database` generic
//! through every interpreter type lets [`crate::OpcodeTable`] stay a single
//! concrete, shared-immutable type regardless of which `Database`
//! implementation a caller plugs in. The concrete implementation (which
//! also has to know how to frame a recursive `CALL`/`CREATE`) lives in the
//! `handler` crate, one layer up, to avoid a dependency cycle: `handler`
//! depends on `interpreter`, not the reverse.

use alloc::vec::Vec;
use bytecode::Bytecode;
use context::Env;
use primitives::{Address, Bytes, Log, B256, U256};
use state::{DatabaseError, JournalCheckpoint};

/// `CALL`-family invocation kind (distilled spec §4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// Plain `CALL`: runs `code_address`'s code in its own context.
    Call,
    /// `CALLCODE`: runs `code_address`'s code in the caller's context.
    CallCode,
    /// `DELEGATECALL`: runs `code_address`'s code in the caller's context,
    /// preserving the grandparent's caller/value.
    DelegateCall,
    /// `STATICCALL`: plain call with the static flag forced on.
    StaticCall,
}

/// Inputs to a `CALL`-family sub-call.
#[derive(Clone, Debug)]
pub struct CallInputs {
    /// Which of the four call opcodes this is.
    pub kind: CallKind,
    /// Address whose balance/storage the call executes against.
    pub target: Address,
    /// Address whose code is loaded and run (equals `target` for
    /// `Call`/`StaticCall`, equals the *caller's* address for
    /// `CallCode`/`DelegateCall`).
    pub code_address: Address,
    /// `msg.sender` as seen by the callee.
    pub caller: Address,
    /// Value transferred (ignored for `DelegateCall`/`StaticCall`).
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
    /// Gas forwarded, already reduced by the 63/64 rule if applicable.
    pub gas: u64,
    /// True if the callee (and everything it calls) must not mutate state.
    pub is_static: bool,
}

/// Result of a `CALL`-family sub-call.
#[derive(Clone, Debug)]
pub struct CallOutcome {
    /// True if the sub-call succeeded (`Stop`/`Return`, not `Revert` or an
    /// exceptional halt).
    pub success: bool,
    /// Gas returned to the caller (all of it on `Revert`, some on success,
    /// none on an exceptional halt).
    pub gas_left: u64,
    /// Sub-call's return/revert data, visible via `RETURNDATACOPY`.
    pub return_data: Bytes,
    /// Logs emitted by the sub-call (and everything it called), empty
    /// unless `success` — a reverted or exceptionally-halted frame's logs
    /// are discarded along with the rest of its journal delta.
    pub logs: Vec<Log>,
}

/// `CREATE`/`CREATE2` invocation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateKind {
    /// Address derived from `caller` + nonce.
    Create,
    /// Address derived from `keccak256(0xff ‖ caller ‖ salt ‖ keccak256(init))`.
    Create2,
}

/// Inputs to a `CREATE`/`CREATE2`.
#[derive(Clone, Debug)]
pub struct CreateInputs {
    /// Which address-derivation scheme to use.
    pub kind: CreateKind,
    /// Account whose nonce is bumped and who funds `value`.
    pub caller: Address,
    /// Value transferred to the new account.
    pub value: U256,
    /// Initcode to run; its return value becomes the deployed code.
    pub init_code: Bytes,
    /// `CREATE2` salt, `None` for plain `CREATE`.
    pub salt: Option<U256>,
    /// Gas forwarded.
    pub gas: u64,
}

/// Result of a `CREATE`/`CREATE2`.
#[derive(Clone, Debug)]
pub struct CreateOutcome {
    /// True if the deployment succeeded.
    pub success: bool,
    /// Gas returned to the caller.
    pub gas_left: u64,
    /// Address of the deployed contract, `None` on failure.
    pub address: Option<Address>,
    /// Initcode's return/revert data.
    pub return_data: Bytes,
    /// Logs emitted while running the initcode, empty unless `success`.
    pub logs: Vec<Log>,
}

/// State and sub-call operations opcode logic functions are given, with the
/// concrete `Database`/message-framing implementation erased behind a
/// trait object.
pub trait Host {
    /// Block/transaction environment for the running transaction.
    fn env(&self) -> &Env;
    /// Loads (or returns the cached) account, reporting whether this was
    /// its first access this transaction (EIP-2929).
    fn load_account(&mut self, address: Address) -> Result<bool, DatabaseError>;
    /// Current balance.
    fn balance(&mut self, address: Address) -> Result<U256, DatabaseError>;
    /// Current nonce.
    fn nonce(&mut self, address: Address) -> Result<u64, DatabaseError>;
    /// Current code hash.
    fn code_hash(&mut self, address: Address) -> Result<B256, DatabaseError>;
    /// Lazily-loaded bytecode.
    fn code(&mut self, address: Address) -> Result<Bytecode, DatabaseError>;
    /// `(value, was_cold)`.
    fn sload(&mut self, address: Address, key: U256) -> Result<(U256, bool), DatabaseError>;
    /// `(original, current, was_cold)`, where `original` is the slot's value
    /// at the start of the transaction — what `SSTORE` gas/refund pricing
    /// needs ahead of performing the write.
    fn storage_state(&mut self, address: Address, key: U256) -> Result<(U256, U256, bool), DatabaseError>;
    /// `(original, present_before, was_cold)`.
    fn sstore(
        &mut self,
        address: Address,
        key: U256,
        new_value: U256,
    ) -> Result<(U256, U256, bool), DatabaseError>;
    /// Transient storage read (EIP-1153), always warm, never persisted.
    fn tload(&mut self, address: Address, key: U256) -> U256;
    /// Transient storage write (EIP-1153).
    fn tstore(&mut self, address: Address, key: U256, value: U256);
    /// EIP-2929: warms an address, returning whether it was cold.
    fn warm_address(&mut self, address: Address) -> Result<bool, DatabaseError>;
    /// EIP-2929: warms a storage slot, returning whether it was cold.
    fn warm_storage(&mut self, address: Address, key: U256) -> Result<bool, DatabaseError>;
    /// Marks an account touched for EIP-161 cleanup purposes.
    fn touch_account(&mut self, address: Address) -> Result<(), DatabaseError>;
    /// Adjusts the refund counter by `delta` (may be negative).
    fn add_refund(&mut self, delta: i64);
    /// Current refund counter value.
    fn refund(&self) -> i64;
    /// Marks `address` for destruction, crediting `target`'s balance.
    /// Returns the balance that was transferred.
    fn selfdestruct(&mut self, address: Address, target: Address) -> Result<U256, DatabaseError>;
    /// `BLOCKHASH`.
    fn block_hash(&mut self, number: u64) -> Result<B256, DatabaseError>;
    /// Opens a reversible frame.
    fn checkpoint(&mut self) -> JournalCheckpoint;
    /// Closes a frame successfully.
    fn commit(&mut self, checkpoint: JournalCheckpoint);
    /// Closes a frame by undoing every entry recorded since `checkpoint`.
    fn revert(&mut self, checkpoint: JournalCheckpoint);
    /// Performs a nested `CALL`-family sub-call, recursing into the
    /// interpreter as needed (distilled spec §4.5).
    fn call(&mut self, inputs: CallInputs) -> CallOutcome;
    /// Performs a nested `CREATE`/`CREATE2`.
    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome;
}

#[allow(dead_code)]
fn assert_object_safe(_: &dyn Host) {}

#[allow(dead_code)]
fn assert_send_types() {
    fn is_send<T: Send>() {}
    is_send::<Vec<u8>>();
}
