//! Account model, checkpointable journal and the database interface (EEI)
//! the core consults for account/storage access.
//!
//! [`Journal`] is the only owner of in-flight state changes during a
//! transaction: it wraps a [`Database`] with a loaded-account cache, records
//! every mutation as a [`JournalEntry`] so a call frame can be rolled back by
//! replaying entries in reverse, and tracks the EIP-2929 warm/cold access
//! sets plus the SSTORE/SELFDESTRUCT refund counter.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod account;
mod database;
mod in_memory;
mod journal;

pub use account::{Account, AccountInfo, AccountStatus, StorageSlot};
pub use database::{Database, DatabaseError, DbAccount};
pub use in_memory::InMemoryDb;
pub use journal::{Journal, JournalCheckpoint, JournalEntry};
