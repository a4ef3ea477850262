//! [`ReceiptStore`]: persistence, the tx-hash index and `getLogs` range
//! queries (distilled spec §4.7).

use crate::{Bloom, KvStore, ReceiptError, TxReceipt};
use alloc::vec::Vec;
use alloy_rlp::{Decodable, Encodable, Header};
use primitives::{Address, B256};

fn receipts_key(block_hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(9 + 32);
    key.extend_from_slice(b"Receipts:");
    key.extend_from_slice(block_hash.as_slice());
    key
}

fn tx_hash_key(tx_hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(7 + 32);
    key.extend_from_slice(b"TxHash:");
    key.extend_from_slice(tx_hash.as_slice());
    key
}

/// Not one of the two keys the distilled spec names directly, but required
/// to implement the `txLookupLimit` GC it does name: deleting the index
/// entries for an old block needs to know which tx hashes that block had.
fn block_tx_hashes_key(block_number: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(14 + 8);
    key.extend_from_slice(b"BlockTxHashes:");
    key.extend_from_slice(&block_number.to_be_bytes());
    key
}

fn encode_receipts(receipts: &[TxReceipt]) -> Vec<u8> {
    let mut buf = Vec::new();
    receipts.to_vec().encode(&mut buf);
    buf
}

fn decode_receipts(mut buf: &[u8]) -> Result<Vec<TxReceipt>, ReceiptError> {
    Ok(Vec::<TxReceipt>::decode(&mut buf)?)
}

fn encode_b256_list(items: &[B256]) -> Vec<u8> {
    let mut buf = Vec::new();
    items.to_vec().encode(&mut buf);
    buf
}

fn decode_b256_list(mut buf: &[u8]) -> Result<Vec<B256>, ReceiptError> {
    Ok(Vec::<B256>::decode(&mut buf)?)
}

/// Resolved location of a transaction within a block, the value stored at
/// `TxHash:{txHash}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxLocation {
    pub block_hash: B256,
    pub tx_index: u64,
}

fn encode_tx_location(loc: &TxLocation) -> Vec<u8> {
    let mut out = Vec::new();
    let payload_length = loc.block_hash.length() + loc.tx_index.length();
    Header { list: true, payload_length }.encode(&mut out);
    loc.block_hash.encode(&mut out);
    loc.tx_index.encode(&mut out);
    out
}

fn decode_tx_location(buf: &[u8]) -> Result<TxLocation, ReceiptError> {
    let mut slice = buf;
    let header = Header::decode(&mut slice)?;
    if !header.list {
        return Err(ReceiptError::Rlp(alloy_rlp::Error::UnexpectedString));
    }
    let mut payload = &slice[..header.payload_length];
    let block_hash = B256::decode(&mut payload)?;
    let tx_index = u64::decode(&mut payload)?;
    Ok(TxLocation { block_hash, tx_index })
}

/// One block's worth of receipts, as handed to [`ReceiptStore::save_receipts`].
pub struct BlockReceipts {
    pub block_hash: B256,
    pub block_number: u64,
    pub tx_hashes: Vec<B256>,
    pub receipts: Vec<TxReceipt>,
}

/// Result of [`ReceiptStore::get_receipt_by_tx_hash`].
#[derive(Clone, Debug)]
pub struct ReceiptLookup {
    pub receipt: TxReceipt,
    pub block_hash: B256,
    pub tx_index: usize,
    pub log_index: usize,
    pub bloom: Bloom,
}

/// One `topics[i]` entry of a `getLogs` filter (distilled spec §4.7
/// "Query: `getLogs`").
#[derive(Clone, Debug)]
pub enum TopicFilter {
    /// `null`: matches any value at this position, including absent.
    Any,
    /// A single required value; the log must have a topic at this position.
    One(B256),
    /// Matches if the log's topic at this position is any of these.
    AnyOf(Vec<B256>),
}

impl TopicFilter {
    fn matches(&self, topic: Option<&B256>) -> bool {
        match self {
            TopicFilter::Any => true,
            TopicFilter::One(expected) => topic == Some(expected),
            TopicFilter::AnyOf(candidates) => topic.is_some_and(|t| candidates.contains(t)),
        }
    }
}

/// One log returned by [`ReceiptStore::get_logs`], flattened out of its
/// block's receipts with the positional indexes the query promises.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub log: primitives::Log,
    pub block_number: u64,
    pub tx_index: usize,
    pub log_index: usize,
}

/// `getLogs` response budget (distilled spec §4.7, last paragraph).
#[derive(Clone, Copy, Debug)]
pub struct GetLogsLimits {
    /// `GET_LOGS_LIMIT`, default 10 000.
    pub max_results: usize,
    /// `GET_LOGS_LIMIT_MB` worth of bytes, default 150 MiB.
    pub max_bytes: usize,
    /// `GET_LOGS_BLOCK_RANGE_LIMIT`, default 2500.
    pub max_block_range: u64,
}

impl Default for GetLogsLimits {
    fn default() -> Self {
        Self {
            max_results: 10_000,
            max_bytes: 150 * 1024 * 1024,
            max_block_range: 2500,
        }
    }
}

fn estimate_log_size(log: &primitives::Log) -> usize {
    20 + 32 * log.topics().len() + log.data.len()
}

fn log_matches(log: &primitives::Log, addresses: &[Address], topics: &[TopicFilter]) -> bool {
    if !addresses.is_empty() && !addresses.contains(&log.address) {
        return false;
    }
    // Every topic position must match; this is the corrected semantics
    // (distilled spec's Open Question: the filter must check every
    // position before accepting the log, not return early after index 0).
    for (position, filter) in topics.iter().enumerate() {
        if !filter.matches(log.topics().get(position)) {
            return false;
        }
    }
    true
}

/// Encodes, persists and queries transaction receipts over a pluggable
/// [`KvStore`] (distilled spec §4.7).
pub struct ReceiptStore<S> {
    store: S,
    tx_lookup_limit: u64,
}

impl<S: KvStore> ReceiptStore<S> {
    /// `tx_lookup_limit` of `0` keeps every tx-hash index entry forever.
    pub fn new(store: S, tx_lookup_limit: u64) -> Self {
        Self { store, tx_lookup_limit }
    }

    /// Encodes and persists `block`'s receipts, then updates (and
    /// potentially garbage-collects) the tx-hash index.
    pub fn save_receipts(&mut self, chain_head: u64, block: &BlockReceipts) -> Result<(), ReceiptError> {
        tracing::debug!(
            block_hash = %block.block_hash,
            receipt_count = block.receipts.len(),
            "saving receipts",
        );
        self.store
            .put(&receipts_key(block.block_hash), &encode_receipts(&block.receipts))
            .map_err(|_| ReceiptError::Storage)?;
        self.store
            .put(&block_tx_hashes_key(block.block_number), &encode_b256_list(&block.tx_hashes))
            .map_err(|_| ReceiptError::Storage)?;
        self.update_index(chain_head, block);
        Ok(())
    }

    /// `updateIndex(Save, TxHash, block)` (distilled spec §4.7 "Save path").
    /// A failed index write within the lookup window is logged at
    /// `tracing::error!`, not `warn!`: it doesn't abort the save (the
    /// receipts themselves are already durable by this point), but it
    /// makes `getReceiptByTxHash` for that one tx unreachable, which is the
    /// "save corrupts lookups" failure mode §5 says must be reported, not
    /// swallowed. Deletions of an aged-out block's indexes are
    /// unconditionally fire-and-forget (`tracing::warn!`) per §5.
    fn update_index(&mut self, chain_head: u64, block: &BlockReceipts) {
        let within_window =
            self.tx_lookup_limit == 0 || chain_head.saturating_sub(self.tx_lookup_limit) < block.block_number;
        if within_window {
            for (tx_index, tx_hash) in block.tx_hashes.iter().enumerate() {
                let location = TxLocation {
                    block_hash: block.block_hash,
                    tx_index: tx_index as u64,
                };
                if self
                    .store
                    .put(&tx_hash_key(*tx_hash), &encode_tx_location(&location))
                    .is_err()
                {
                    tracing::error!(tx_hash = %tx_hash, "failed to write tx-hash index entry");
                }
            }
        }
        if self.tx_lookup_limit > 0 {
            let gc_number = chain_head.saturating_sub(self.tx_lookup_limit);
            if let Ok(Some(raw)) = self.store.get(&block_tx_hashes_key(gc_number)) {
                if let Ok(old_hashes) = decode_b256_list(&raw) {
                    for tx_hash in old_hashes {
                        if self.store.delete(&tx_hash_key(tx_hash)).is_err() {
                            tracing::warn!(tx_hash = %tx_hash, "failed to delete aged-out tx-hash index entry");
                        }
                    }
                }
                if self.store.delete(&block_tx_hashes_key(gc_number)).is_err() {
                    tracing::warn!(block_number = gc_number, "failed to delete aged-out block-tx-hashes entry");
                }
            }
        }
    }

    /// `getReceiptByTxHash` (distilled spec §4.7).
    pub fn get_receipt_by_tx_hash(&self, tx_hash: B256) -> Result<Option<ReceiptLookup>, ReceiptError> {
        let Some(raw_location) = self.store.get(&tx_hash_key(tx_hash)).map_err(|_| ReceiptError::Storage)? else {
            return Ok(None);
        };
        let location = decode_tx_location(&raw_location)?;
        let Some(raw_receipts) =
            self.store.get(&receipts_key(location.block_hash)).map_err(|_| ReceiptError::Storage)?
        else {
            return Ok(None);
        };
        let receipts = decode_receipts(&raw_receipts)?;
        let tx_index = location.tx_index as usize;
        let receipt = receipts.get(tx_index).cloned().ok_or(ReceiptError::MissingReceipt)?;
        let log_index = receipts[..tx_index].iter().map(|r| r.logs().len()).sum();
        let bloom = receipt.bloom();
        Ok(Some(ReceiptLookup {
            receipt,
            block_hash: location.block_hash,
            tx_index,
            log_index,
            bloom,
        }))
    }

    /// `getLogs(from, to, addresses?, topics?)` (distilled spec §4.7).
    /// `blocks` supplies the `(number, hash)` pairs in `from..=to` order;
    /// resolving numbers to hashes is a block-store concern out of this
    /// crate's scope.
    pub fn get_logs(
        &self,
        blocks: &[(u64, B256)],
        addresses: &[Address],
        topics: &[TopicFilter],
        limits: &GetLogsLimits,
    ) -> Result<Vec<LogEntry>, ReceiptError> {
        if let (Some((first, _)), Some((last, _))) = (blocks.first(), blocks.last()) {
            if last.saturating_sub(*first) > limits.max_block_range {
                return Err(ReceiptError::RangeTooWide);
            }
        }

        let mut out = Vec::new();
        let mut accumulated_bytes = 0usize;
        'blocks: for (block_number, block_hash) in blocks {
            let Some(raw) = self.store.get(&receipts_key(*block_hash)).map_err(|_| ReceiptError::Storage)? else {
                continue;
            };
            let receipts = decode_receipts(&raw)?;
            let mut log_index = 0usize;
            for (tx_index, receipt) in receipts.iter().enumerate() {
                for log in receipt.logs() {
                    if log_matches(log, addresses, topics) {
                        accumulated_bytes += estimate_log_size(log);
                        out.push(LogEntry {
                            log: log.clone(),
                            block_number: *block_number,
                            tx_index,
                            log_index,
                        });
                        if out.len() >= limits.max_results || accumulated_bytes >= limits.max_bytes {
                            break 'blocks;
                        }
                    }
                    log_index += 1;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryKvStore;
    use alloc::vec;
    use primitives::{Bytes, Log, U256};

    fn log(addr: Address, topics: Vec<B256>) -> Log {
        Log::new(addr, topics, Bytes::new()).unwrap()
    }

    fn sample_store() -> (ReceiptStore<InMemoryKvStore>, B256, B256, B256) {
        let addr_a = Address::from_slice(&[0xAA; 20]);
        let addr_b = Address::from_slice(&[0xBB; 20]);
        let topic1 = B256::from_slice(&[0x01; 32]);
        let topic2 = B256::from_slice(&[0x02; 32]);

        let receipt0 = TxReceipt::PostByzantium {
            status: true,
            cumulative_gas_used: U256::from(21_000),
            logs: vec![log(addr_a, vec![topic1, topic2])],
        };
        let receipt1 = TxReceipt::PostByzantium {
            status: true,
            cumulative_gas_used: U256::from(42_000),
            logs: vec![log(addr_b, vec![topic1])],
        };

        let block_hash = B256::from_slice(&[0x11; 32]);
        let tx0 = B256::from_slice(&[0xA0; 32]);
        let tx1 = B256::from_slice(&[0xA1; 32]);

        let mut store = ReceiptStore::new(InMemoryKvStore::new(), 0);
        store
            .save_receipts(
                11,
                &BlockReceipts {
                    block_hash,
                    block_number: 11,
                    tx_hashes: vec![tx0, tx1],
                    receipts: vec![receipt0, receipt1],
                },
            )
            .unwrap();
        (store, block_hash, tx0, tx1)
    }

    #[test]
    fn tx_hash_index_round_trips() {
        let (store, block_hash, tx0, tx1) = sample_store();
        let lookup0 = store.get_receipt_by_tx_hash(tx0).unwrap().unwrap();
        assert_eq!(lookup0.block_hash, block_hash);
        assert_eq!(lookup0.tx_index, 0);
        assert_eq!(lookup0.log_index, 0);

        let lookup1 = store.get_receipt_by_tx_hash(tx1).unwrap().unwrap();
        assert_eq!(lookup1.tx_index, 1);
        assert_eq!(lookup1.log_index, 1);
    }

    #[test]
    fn get_logs_matches_address_and_all_topic_positions() {
        let (store, block_hash, ..) = sample_store();
        let addr_a = Address::from_slice(&[0xAA; 20]);
        let topic2 = B256::from_slice(&[0x02; 32]);

        let results = store
            .get_logs(
                &[(10, B256::ZERO), (11, block_hash), (12, B256::ZERO)],
                &[addr_a],
                &[TopicFilter::Any, TopicFilter::One(topic2)],
                &GetLogsLimits::default(),
            )
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].log_index, 0);
        assert_eq!(results[0].tx_index, 0);
    }

    #[test]
    fn get_logs_stops_at_result_budget() {
        let addr = Address::from_slice(&[0xCC; 20]);
        let receipts: Vec<TxReceipt> = (0..100)
            .map(|_| TxReceipt::PostByzantium {
                status: true,
                cumulative_gas_used: U256::ZERO,
                logs: vec![log(addr, vec![])],
            })
            .collect();
        let block_hash = B256::from_slice(&[0x22; 32]);
        let tx_hashes: Vec<B256> = (0..100u8).map(|i| B256::from_slice(&[i; 32])).collect();

        let mut store = ReceiptStore::new(InMemoryKvStore::new(), 0);
        store
            .save_receipts(
                20,
                &BlockReceipts {
                    block_hash,
                    block_number: 20,
                    tx_hashes,
                    receipts,
                },
            )
            .unwrap();

        let limits = GetLogsLimits {
            max_results: 3,
            ..GetLogsLimits::default()
        };
        let results = store.get_logs(&[(20, block_hash)], &[], &[], &limits).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn tx_lookup_limit_garbage_collects_old_index_entries() {
        let mut store = ReceiptStore::new(InMemoryKvStore::new(), 5);
        let tx_at_10 = B256::from_slice(&[0x10; 32]);
        store
            .save_receipts(
                10,
                &BlockReceipts {
                    block_hash: B256::from_slice(&[0x01; 32]),
                    block_number: 10,
                    tx_hashes: vec![tx_at_10],
                    receipts: vec![TxReceipt::PostByzantium {
                        status: true,
                        cumulative_gas_used: U256::ZERO,
                        logs: vec![],
                    }],
                },
            )
            .unwrap();
        assert!(store.get_receipt_by_tx_hash(tx_at_10).unwrap().is_some());

        // Advancing the chain head to 15 pushes block 10 out of a 5-block window.
        store
            .save_receipts(
                15,
                &BlockReceipts {
                    block_hash: B256::from_slice(&[0x02; 32]),
                    block_number: 15,
                    tx_hashes: vec![],
                    receipts: vec![],
                },
            )
            .unwrap();
        assert!(store.get_receipt_by_tx_hash(tx_at_10).unwrap().is_none());
    }
}
