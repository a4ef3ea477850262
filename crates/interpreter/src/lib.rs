//! Gas-metered EVM bytecode interpreter with a pluggable opcode table
//! (distilled spec §§3-5).
//!
//! This crate owns the fetch/decode/execute loop, the operand stack and
//! linear memory, the built-in opcode set and its overlay mechanism, and the
//! [`Host`] trait that decouples opcode logic from the concrete state
//! backend and sub-call framing. It does not know how to recurse into a
//! `CALL`/`CREATE` itself, or how precompiles are dispatched — both are the
//! `handler` crate's job, one layer up.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod gas;

mod host;
mod instructions;
mod interpreter;
mod memory;
mod opcode;
mod run_state;
mod stack;

#[cfg(test)]
mod test_support;

pub use host::{CallInputs, CallKind, CallOutcome, CreateInputs, CreateKind, CreateOutcome, Host};
pub use interpreter::{run, run_inspected, Inspector, NoopInspector, StepEvent};
pub use memory::Memory;
pub use opcode::{GasFn, LogicFn, OpcodeDescriptor, OpcodeTable, OverlayEntry};
pub use run_state::{HaltReason, RunState};
pub use stack::{Stack, StackError};
