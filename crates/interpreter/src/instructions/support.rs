//! Shared helpers used by every instruction module: building a descriptor,
//! and mapping [`StackError`]/[`DatabaseError`] onto [`HaltReason`].

use crate::opcode::{GasFn, LogicFn, OpcodeDescriptor};
use crate::{HaltReason, RunState};
use crate::stack::StackError;
use alloc::borrow::Cow;
use alloc::sync::Arc;
use state::DatabaseError;

/// Builds one descriptor; `gas_fn`/`logic_fn` are plain `fn` pointers,
/// implicitly coerced to the `Arc<dyn Fn…>` aliases.
#[allow(clippy::too_many_arguments)]
pub(super) fn desc(
    code: u8,
    name: &'static str,
    base_fee: u64,
    min_stack: usize,
    max_stack: usize,
    gas_fn: GasFn,
    logic_fn: LogicFn,
) -> OpcodeDescriptor {
    OpcodeDescriptor {
        code,
        name: Cow::Borrowed(name),
        base_fee,
        min_stack,
        max_stack,
        is_async: false,
        gas_fn,
        logic_fn,
    }
}

/// Installs `descriptor` in `table`, for submodules to call per opcode.
pub(super) fn install(table: &mut [Option<OpcodeDescriptor>; 256], descriptor: OpcodeDescriptor) {
    let code = descriptor.code as usize;
    table[code] = Some(descriptor);
}

/// `gasFn` that always returns the static `base_fee` unchanged.
pub(super) fn fixed_gas() -> GasFn {
    Arc::new(|_rs: &mut RunState, _host, base: u64| Ok(base))
}

/// Maps a stack operation failure onto its `HaltReason`.
pub(super) fn stack_halt(e: StackError) -> HaltReason {
    match e {
        StackError::Overflow => HaltReason::StackOverflow,
        StackError::Underflow => HaltReason::StackUnderflow,
    }
}

/// A failure reading/writing the database is not a consensus-level halt
/// reason of its own; it means the `Database` implementation itself failed
/// (I/O error, corruption), which this core treats as internal.
pub(super) fn db_err(_: DatabaseError) -> HaltReason {
    HaltReason::InternalError
}

/// Converts a stack word used as a memory offset/length to `usize`,
/// treating anything that can't fit (and so could never be affordably
/// charged for) as an immediate out-of-gas rather than panicking or
/// silently truncating.
pub(super) fn as_usize(value: primitives::U256) -> Result<usize, HaltReason> {
    value
        .try_into()
        .map_err(|_| HaltReason::OutOfGas)
}
