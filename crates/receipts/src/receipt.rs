//! [`TxReceipt`] and its RLP codec (distilled spec §4.7 "Encoding").
//!
//! `primitives::Log` has no RLP impl of its own (that crate doesn't depend
//! on `alloy-rlp`), so this module encodes/decodes logs field-by-field
//! through a local [`LogRef`]/[`OwnedLog`] pair rather than relying on a
//! foreign trait impl the orphan rule wouldn't allow anyway.

use crate::Bloom;
use alloc::vec::Vec;
use alloy_rlp::{BufMut, Decodable, Encodable, Error as RlpError, Header};
use primitives::{Address, Bytes, Log, B256, U256};

/// A transaction receipt, in either of the two wire shapes Ethereum has
/// used (distilled spec §4.7 "Encoding" / REDESIGN FLAGS "Receipt variant").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxReceipt {
    /// Pre-Byzantium: the post-state root after applying the transaction.
    PreByzantium {
        state_root: B256,
        cumulative_gas_used: U256,
        logs: Vec<Log>,
    },
    /// Post-Byzantium (EIP-658): a 0/1 execution status in place of the
    /// state root.
    PostByzantium {
        status: bool,
        cumulative_gas_used: U256,
        logs: Vec<Log>,
    },
}

impl TxReceipt {
    /// Logs emitted by the transaction, common to both shapes.
    pub fn logs(&self) -> &[Log] {
        match self {
            Self::PreByzantium { logs, .. } | Self::PostByzantium { logs, .. } => logs,
        }
    }

    /// Gas used by this transaction plus every transaction before it in the
    /// same block.
    pub fn cumulative_gas_used(&self) -> U256 {
        match self {
            Self::PreByzantium { cumulative_gas_used, .. } | Self::PostByzantium { cumulative_gas_used, .. } => {
                *cumulative_gas_used
            }
        }
    }

    /// Bloom filter over this receipt's logs, computed on demand rather
    /// than stored (distilled spec §4.7 attaches it "on retrieval").
    pub fn bloom(&self) -> Bloom {
        Bloom::from_logs(self.logs())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("RLP error: {0}")]
    Rlp(#[from] RlpError),
    #[error("underlying receipt storage failed")]
    Storage,
    #[error("tx index out of range for its block's receipt list")]
    MissingReceipt,
    #[error("getLogs block range exceeds the configured limit")]
    RangeTooWide,
}

struct LogRef<'a>(&'a Log);

fn log_payload_length(log: &Log) -> usize {
    log.address.length() + log.topics.length() + log.data.length()
}

impl Encodable for LogRef<'_> {
    fn length(&self) -> usize {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf.len()
    }

    fn encode(&self, out: &mut dyn BufMut) {
        let payload_length = log_payload_length(self.0);
        Header { list: true, payload_length }.encode(out);
        self.0.address.encode(out);
        self.0.topics.encode(out);
        self.0.data.encode(out);
    }
}

struct OwnedLog(Log);

impl Decodable for OwnedLog {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let mut payload = &buf[..header.payload_length];
        *buf = &buf[header.payload_length..];
        let address = Address::decode(&mut payload)?;
        let topics = Vec::<B256>::decode(&mut payload)?;
        let data = Bytes::decode(&mut payload)?;
        let log = Log::new(address, topics, data).ok_or(RlpError::Custom("log has more than four topics"))?;
        Ok(OwnedLog(log))
    }
}

fn logs_length(logs: &[Log]) -> usize {
    logs.iter().map(LogRef).collect::<Vec<_>>().length()
}

fn encode_logs(logs: &[Log], out: &mut dyn BufMut) {
    let refs: Vec<LogRef<'_>> = logs.iter().map(LogRef).collect();
    refs.encode(out)
}

fn decode_logs(buf: &mut &[u8]) -> alloy_rlp::Result<Vec<Log>> {
    Ok(Vec::<OwnedLog>::decode(buf)?.into_iter().map(|o| o.0).collect())
}

fn receipt_payload_length(receipt: &TxReceipt) -> usize {
    let first = match receipt {
        TxReceipt::PreByzantium { state_root, .. } => state_root.length(),
        TxReceipt::PostByzantium { status, .. } => (*status as u8).length(),
    };
    first + receipt.cumulative_gas_used().length() + logs_length(receipt.logs())
}

impl Encodable for TxReceipt {
    fn length(&self) -> usize {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf.len()
    }

    fn encode(&self, out: &mut dyn BufMut) {
        let payload_length = receipt_payload_length(self);
        Header { list: true, payload_length }.encode(out);
        match self {
            TxReceipt::PreByzantium { state_root, .. } => state_root.encode(out),
            TxReceipt::PostByzantium { status, .. } => (*status as u8).encode(out),
        }
        self.cumulative_gas_used().encode(out);
        encode_logs(self.logs(), out);
    }
}

impl Decodable for TxReceipt {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let mut payload = &buf[..header.payload_length];
        *buf = &buf[header.payload_length..];

        // Peeking the first field's raw byte length is exactly the
        // discriminant the distilled spec names: 32 bytes selects the
        // pre-Byzantium `stateRoot` shape, anything shorter the status int.
        let mut probe = payload;
        let first_field: Bytes = Decodable::decode(&mut probe)?;

        if first_field.len() == 32 {
            let state_root = B256::decode(&mut payload)?;
            let cumulative_gas_used = U256::decode(&mut payload)?;
            let logs = decode_logs(&mut payload)?;
            Ok(TxReceipt::PreByzantium { state_root, cumulative_gas_used, logs })
        } else {
            let status = u8::decode(&mut payload)?;
            let cumulative_gas_used = U256::decode(&mut payload)?;
            let logs = decode_logs(&mut payload)?;
            Ok(TxReceipt::PostByzantium { status: status != 0, cumulative_gas_used, logs })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log(addr_byte: u8) -> Log {
        Log::new(
            Address::from_slice(&[addr_byte; 20]),
            alloc::vec![B256::from_slice(&[0x11; 32])],
            Bytes::copy_from_slice(b"data"),
        )
        .unwrap()
    }

    #[test]
    fn post_byzantium_round_trips() {
        let receipt = TxReceipt::PostByzantium {
            status: true,
            cumulative_gas_used: U256::from(21_000),
            logs: alloc::vec![sample_log(0xAA)],
        };
        let mut buf = Vec::new();
        receipt.encode(&mut buf);
        let decoded = TxReceipt::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded, receipt);
    }

    #[test]
    fn pre_byzantium_round_trips() {
        let receipt = TxReceipt::PreByzantium {
            state_root: B256::from_slice(&[0x22; 32]),
            cumulative_gas_used: U256::from(50_000),
            logs: alloc::vec![sample_log(0xBB), sample_log(0xCC)],
        };
        let mut buf = Vec::new();
        receipt.encode(&mut buf);
        let decoded = TxReceipt::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded, receipt);
    }

    #[test]
    fn empty_logs_round_trip() {
        let receipt = TxReceipt::PostByzantium {
            status: false,
            cumulative_gas_used: U256::ZERO,
            logs: Vec::new(),
        };
        let mut buf = Vec::new();
        receipt.encode(&mut buf);
        let decoded = TxReceipt::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded, receipt);
    }
}
