//! `CALL`/`CREATE` message framing (distilled spec §4.5): the concrete
//! [`Host`] implementation the `interpreter` crate's opcode logic is given,
//! recursing into a fresh interpreter loop for every nested sub-call and
//! owning the single [`Journal`] checkpoint/commit/revert dance around it.
//!
//! This is the layer that turns "an opcode wants to call out" into "run a
//! whole nested transaction frame": precompile short-circuiting, value
//! transfer, the 63/64 forwarding rule (enforced one layer down, in the
//! `CALL`/`CREATE` opcode's own `logicFn`, since only it has the requested
//! gas operand), code-deposit accounting, and EIP-3541/EIP-3860 code
//! validation all live here.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod address;
mod message_call;

pub use address::{create2_address, create_address};
pub use message_call::{MessageCall, TransactOutcome};

use primitives::CALL_STACK_LIMIT;

/// Config flags recognized at EVM construction (distilled spec §6 "EVM
/// construction options") that affect message-framing behavior rather than
/// opcode dispatch itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageCallConfig {
    /// EIP-170 deployed-code size limit is skipped when `true`.
    pub allow_unlimited_contract_size: bool,
}

/// Depth at or beyond which a new call frame is refused outright (distilled
/// spec §4.5 step 1, §5 "Resource caps": `call depth ≤ 1024`).
pub const MAX_CALL_DEPTH: usize = CALL_STACK_LIMIT;
