//! [`EvmError`]: the facade-level error type, grounded on `revm`'s top-level
//! `EVMError<DBError>` (`crates/primitives/src/result.rs`).
//!
//! A running `CALL`/`CREATE` frame never surfaces a [`DatabaseError`]
//! through this type — `handler::MessageCall` already collapses a failed
//! database lookup into an ordinary failed [`interpreter::CallOutcome`]/
//! [`interpreter::CreateOutcome`] (ante distilled spec §7's call-local
//! axis), so it shows up as `RunCodeResult::exception_error`, not an `Err`.
//! [`EvmError`] exists for failures *outside* a frame: anything an
//! `EvmBuilder` or a caller driving `Evm` from the outside (e.g. `ecli`
//! loading accounts before a run) needs to report before execution ever
//! starts — the "transaction-fatal" axis of distilled spec §7.

use interpreter::HaltReason;
use state::DatabaseError;

/// Facade-level error (distilled spec §6/§7, SPEC_FULL.md §4.8): either the
/// backing database failed outside of any call frame, or a frame halted for
/// a reason the caller asked to see as a `Result::Err` rather than reading
/// off `RunCodeResult::exception_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvmError {
    /// The backing [`state::Database`] failed outside of any call frame.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    /// A call frame halted; carries the stable taxonomy string via
    /// [`HaltReason::as_str`].
    #[error("{}", .0.as_str())]
    Halt(HaltReason),
}

/// The distilled spec's §6 "error taxonomy exposed" covers the interpreter's
/// stable halt-reason strings (`out of gas`, `stack underflow`, `revert`, …
/// — see [`interpreter::HaltReason::as_str`]) plus a handful the original
/// EEL's wider opcode set produced that this implementation's narrower
/// [`interpreter::HaltReason`] has no variant for:
///
/// - `invalid BEGINSUB` / `invalid RETURNSUB` / `invalid JUMPSUB`: the
///   EIP-2315 subroutine opcodes were never adopted into mainnet and this
///   interpreter's opcode table doesn't implement them.
/// - `invalid EOF format`: this interpreter only runs legacy (non-EOF)
///   bytecode (distilled spec's [INTERPRETER] Non-goals).
/// - AUTH / BLS-12-381 input errors: `AUTH`/`AUTHCALL` (EIP-3074) and the
///   BLS-12-381 precompiles (EIP-2537) are not implemented by this
///   precompile set or opcode table.
///
/// These strings are therefore unreachable in practice and intentionally
/// absent from [`interpreter::HaltReason`] rather than stubbed in as dead
/// variants; `value overflow`/`value out of range` likewise have no
/// dedicated variant since `U256` arithmetic in this implementation always
/// wraps per the EVM's modular semantics rather than raising a distinct
/// error.
pub const UNSUPPORTED_TAXONOMY_STRINGS: &[&str] = &[
    "invalid BEGINSUB",
    "invalid RETURNSUB",
    "invalid JUMPSUB",
    "invalid EOF format",
    "value out of range",
    "value overflow",
];
