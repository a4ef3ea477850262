//! Receipt encoding, the tx-hash lookup index and bloom-filtered log range
//! queries (distilled spec §4.7).
//!
//! Scope stops at receipts: block/header parsing, RLP of anything but
//! receipts, and transaction signature recovery belong to a client binary
//! built on top of this crate, not here.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bloom;
mod kv;
mod receipt;
mod store;

pub use bloom::Bloom;
pub use kv::{InMemoryKvStore, KvStore};
pub use receipt::{ReceiptError, TxReceipt};
pub use store::{BlockReceipts, GetLogsLimits, LogEntry, ReceiptLookup, ReceiptStore, TopicFilter, TxLocation};
