//! Per-receipt bloom filter (distilled spec §4.7 "Bloom").
//!
//! 2048 bits, big-endian (bit 0 lives in the top of byte 255), three bits
//! set per accrued item from the low 11 bits of its keccak256's first three
//! byte pairs. Grounded on the bit-derivation arithmetic of
//! `czzqaq-mylayer2`'s `bloom_filter`.

use primitives::{keccak256, Log};

/// A 2048-bit bloom filter over a receipt's addresses and log topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bloom([u8; 256]);

impl Default for Bloom {
    fn default() -> Self {
        Self::new()
    }
}

impl Bloom {
    /// An empty filter.
    pub const fn new() -> Self {
        Self([0u8; 256])
    }

    /// Builds the filter matching every address and topic in `logs`.
    pub fn from_logs(logs: &[Log]) -> Self {
        let mut bloom = Self::new();
        for log in logs {
            bloom.accrue(log.address.as_slice());
            for topic in log.topics() {
                bloom.accrue(topic.as_slice());
            }
        }
        bloom
    }

    /// Sets the three bits derived from `item`'s keccak256.
    pub fn accrue(&mut self, item: &[u8]) {
        for bit in Self::bit_indexes(item) {
            self.set_bit(bit);
        }
    }

    /// True if every bit `item` would set is already set (necessary, not
    /// sufficient, condition for membership — false positives are possible
    /// by design).
    pub fn contains(&self, item: &[u8]) -> bool {
        Self::bit_indexes(item).into_iter().all(|bit| self.bit_is_set(bit))
    }

    /// Raw 256-byte vector, as stored alongside a receipt.
    pub fn as_bytes(&self) -> &[u8; 256] {
        &self.0
    }

    /// OR's `other`'s bits into this filter (used to merge per-receipt
    /// blooms into a block-level bloom).
    pub fn merge(&mut self, other: &Bloom) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    fn bit_indexes(item: &[u8]) -> [usize; 3] {
        let hash = keccak256(item);
        [0, 2, 4].map(|i| (((hash[i] as usize) << 8) | hash[i + 1] as usize) % 2048)
    }

    fn set_bit(&mut self, bit: usize) {
        let (byte, mask) = Self::byte_and_mask(bit);
        self.0[byte] |= mask;
    }

    fn bit_is_set(&self, bit: usize) -> bool {
        let (byte, mask) = Self::byte_and_mask(bit);
        self.0[byte] & mask != 0
    }

    /// Big-endian: bit 0 is the top bit of the last byte.
    fn byte_and_mask(bit: usize) -> (usize, u8) {
        (255 - bit / 8, 1 << (bit % 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::{Address, Bytes, B256};

    #[test]
    fn accrued_item_is_contained() {
        let mut bloom = Bloom::new();
        let addr = Address::from_slice(&[0xAA; 20]);
        bloom.accrue(addr.as_slice());
        assert!(bloom.contains(addr.as_slice()));
        assert!(!bloom.contains(Address::from_slice(&[0xBB; 20]).as_slice()));
    }

    #[test]
    fn from_logs_contains_address_and_topics() {
        let topic = B256::from_slice(&[0x01; 32]);
        let log = Log::new(Address::from_slice(&[0xCC; 20]), alloc::vec![topic], Bytes::new()).unwrap();
        let bloom = Bloom::from_logs(core::slice::from_ref(&log));
        assert!(bloom.contains(log.address.as_slice()));
        assert!(bloom.contains(topic.as_slice()));
    }
}
