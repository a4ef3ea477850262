//! Per-call execution context, live for the duration of one interpreter
//! frame (distilled spec §3 `RunState`).

use crate::{Memory, Stack};
use alloc::vec::Vec;
use bytecode::Bytecode;
use context::ChainRules;
use primitives::{Address, Bytes, Log, U256};

/// Terminal reason a call frame stopped executing (distilled spec §4.4).
///
/// Every exceptional variant consumes all remaining gas; only [`Revert`]
/// returns remaining gas to the caller while still discarding the frame's
/// state writes.
///
/// [`Revert`]: HaltReason::Revert
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// `STOP`: success, no return data.
    Stop,
    /// `RETURN`: success, with return data.
    Return(Bytes),
    /// `REVERT`: failure, but gas and return data are preserved by the caller.
    Revert(Bytes),
    /// Gas charge exceeded remaining gas.
    OutOfGas,
    /// Fetched opcode has no descriptor (deleted or never defined).
    InvalidOpcode,
    /// `JUMP`/`JUMPI` target is not a valid `JUMPDEST`.
    InvalidJump,
    /// Stack had fewer operands than the opcode requires.
    StackUnderflow,
    /// Pushing would exceed the 1024-word stack limit.
    StackOverflow,
    /// State-mutating opcode executed in a static call.
    StaticStateChange,
    /// `CREATE`/`CREATE2` target address already has code or a higher nonce.
    CreateCollision,
    /// Refund counter would go negative.
    RefundExhausted,
    /// `CALL` attempted to transfer more value than the caller's balance.
    InsufficientBalance,
    /// Deployed code failed validation (e.g. EIP-3541 `0xEF` prefix).
    InvalidBytecodeResult,
    /// Initcode exceeds the EIP-3860 size limit.
    InitcodeSizeViolation,
    /// Deployed code exceeded gas during the code-deposit charge.
    CodeStoreOutOfGas,
    /// Internal invariant violation — a bug, not a consensus error.
    InternalError,
}

impl HaltReason {
    /// The stable error string from distilled spec §6, used for logging and
    /// for the outermost caller's `exceptionError`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HaltReason::Stop => "stop",
            HaltReason::Return(_) => "return",
            HaltReason::Revert(_) => "revert",
            HaltReason::OutOfGas => "out of gas",
            HaltReason::InvalidOpcode => "invalid opcode",
            HaltReason::InvalidJump => "invalid JUMP",
            HaltReason::StackUnderflow => "stack underflow",
            HaltReason::StackOverflow => "stack overflow",
            HaltReason::StaticStateChange => "static state change",
            HaltReason::CreateCollision => "create collision",
            HaltReason::RefundExhausted => "refund exhausted",
            HaltReason::InsufficientBalance => "insufficient balance",
            HaltReason::InvalidBytecodeResult => "invalid bytecode deployed",
            HaltReason::InitcodeSizeViolation => "initcode exceeds max initcode size",
            HaltReason::CodeStoreOutOfGas => "code store out of gas",
            HaltReason::InternalError => "internal error",
        }
    }

    /// True for `OutOfGas`, `InvalidOpcode`, and every other exceptional
    /// halt that consumes all remaining gas (everything but `Revert`).
    #[inline]
    pub fn consumes_all_gas(&self) -> bool {
        !matches!(self, HaltReason::Revert(_))
    }

    /// True if the frame succeeded (`Stop` or `Return`).
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, HaltReason::Stop | HaltReason::Return(_))
    }
}

/// Per-call execution context (distilled spec §3 `RunState`).
///
/// Created at call entry, dropped at call exit; mutations are visible only
/// to this frame until the owning [`crate::OpcodeTable`]-driven interpreter
/// loop commits or reverts the journal checkpoint it was handed.
#[derive(Debug)]
pub struct RunState {
    /// Byte index into `code` of the next instruction to fetch.
    pub pc: usize,
    /// Gas remaining in this frame.
    pub gas_left: u64,
    /// Gas the frame started with, used to compute `executionGasUsed`.
    pub gas_limit: u64,
    /// Operand stack.
    pub stack: Stack,
    /// Linear memory.
    pub memory: Memory,
    /// Return data of the most recent sub-call made by this frame.
    pub return_data: Bytes,
    /// Executing bytecode.
    pub code: Bytecode,
    /// `CALLER`.
    pub caller: Address,
    /// Address this frame executes as (`ADDRESS`).
    pub address: Address,
    /// `CALLVALUE`.
    pub value: U256,
    /// `CALLDATA`.
    pub call_data: Bytes,
    /// True inside a `STATICCALL` (or a nested call from one).
    pub is_static: bool,
    /// Call-stack depth, `0` for the outermost call, capped at 1024.
    pub depth: usize,
    /// Logs emitted by `LOG0..LOG4`, appended within this call only.
    pub logs: Vec<Log>,
    /// SSTORE/SELFDESTRUCT refund delta accumulated by this call.
    pub refund: i64,
    /// Hardfork rules in effect for this call, fixed for its lifetime.
    pub rules: ChainRules,
}

impl RunState {
    /// Builds a fresh frame for `code`, with an empty stack and memory.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: Bytecode,
        gas_limit: u64,
        caller: Address,
        address: Address,
        value: U256,
        call_data: Bytes,
        is_static: bool,
        depth: usize,
    ) -> Self {
        Self::with_rules(
            code,
            gas_limit,
            caller,
            address,
            value,
            call_data,
            is_static,
            depth,
            ChainRules::default(),
        )
    }

    /// Builds a fresh frame for `code` under an explicit hardfork rule set.
    #[allow(clippy::too_many_arguments)]
    pub fn with_rules(
        code: Bytecode,
        gas_limit: u64,
        caller: Address,
        address: Address,
        value: U256,
        call_data: Bytes,
        is_static: bool,
        depth: usize,
        rules: ChainRules,
    ) -> Self {
        Self {
            pc: 0,
            gas_left: gas_limit,
            gas_limit,
            stack: Stack::new(),
            memory: Memory::new(),
            return_data: Bytes::new(),
            code,
            caller,
            address,
            value,
            call_data,
            is_static,
            depth,
            logs: Vec::new(),
            refund: 0,
            rules,
        }
    }

    /// Current opcode byte, or `None` if `pc` has run off the end of code.
    #[inline]
    pub fn current_opcode(&self) -> Option<u8> {
        self.code.bytes().get(self.pc).copied()
    }

    /// Gas consumed so far by this frame.
    #[inline]
    pub fn gas_used(&self) -> u64 {
        self.gas_limit - self.gas_left
    }

    /// Deducts `amount` from `gas_left`. Caller must have already checked
    /// `amount <= gas_left`.
    #[inline]
    pub fn deduct_gas(&mut self, amount: u64) {
        self.gas_left -= amount;
    }

    /// Zeroes remaining gas (exceptional halts consume all remaining gas).
    #[inline]
    pub fn consume_all_gas(&mut self) {
        self.gas_left = 0;
    }
}
