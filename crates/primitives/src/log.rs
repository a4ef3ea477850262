//! The event log emitted by `LOG0..LOG4`.

use crate::{Address, Bytes, B256};
use alloc::vec::Vec;

/// A single log entry: an emitting address, up to four indexed topics and an
/// opaque data blob.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Log {
    /// Address of the contract that emitted the log.
    pub address: Address,
    /// Indexed topics, `0..=4` entries.
    pub topics: Vec<B256>,
    /// Unindexed data.
    pub data: Bytes,
}

impl Log {
    /// Creates a new log, returning `None` if more than four topics are given.
    pub fn new(address: Address, topics: Vec<B256>, data: Bytes) -> Option<Self> {
        if topics.len() > 4 {
            return None;
        }
        Some(Self {
            address,
            topics,
            data,
        })
    }

    /// Topics slice accessor, used by the bloom filter and log-range filters.
    pub fn topics(&self) -> &[B256] {
        &self.topics
    }
}
