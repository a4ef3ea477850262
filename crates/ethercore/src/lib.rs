//! Top-level execution-pipeline facade: wires the interpreter's opcode
//! table, the precompile set, message-call framing and a caller-supplied
//! [`state::Database`] into one [`Evm`], and exposes the `runCode` entry
//! point (distilled spec §6 "External interfaces").
//!
//! Nothing here adds new consensus logic; every module below it
//! (`interpreter`, `handler`, `precompile`, `state`, `context`) already
//! implements the rules this crate just assembles in one place, the way
//! `revm`'s own top-level `revm` crate assembles its `context`/`handler`/
//! `interpreter` crates behind a single `Evm`/`EvmBuilder` pair.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod builder;
mod error;
mod evm;

pub use builder::EvmBuilder;
pub use error::{EvmError, UNSUPPORTED_TAXONOMY_STRINGS};
pub use evm::{Evm, RunCodeParams, RunCodeResult, RunStateSummary};

// Re-exported so a caller (or the `ecli` binary) can build an `Evm` and
// register a tracer without an extra `state`/`interpreter`/`context`
// dependency of its own, mirroring `revm`'s re-export of its lower crates'
// public types (`InMemoryDB`/`EmptyDB`, `SpecId`, `Inspector`, …) from its
// top-level `revm` crate.
pub use context::SpecId;
pub use interpreter::{HaltReason, Inspector, OverlayEntry, RunState, StepEvent};
pub use precompile::DynPrecompileFn;
pub use state::InMemoryDb;
