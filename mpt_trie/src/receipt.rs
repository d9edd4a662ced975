use rlp::Rlp;

use crate::{TrieError, TrieResult};

/// The fields of a transaction receipt the verifier reports after a successful proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// EIP-2718 type byte, `None` for legacy receipts.
    pub tx_type: Option<u8>,
    pub status: u8,
    pub cumulative_gas_used: u64,
    pub log_count: usize,
}

impl ReceiptSummary {
    /// Decodes a receipt as stored in a receipts trie.
    ///
    /// Typed receipts start with a single type byte below `0x80` followed by the RLP list.
    pub fn decode(encoded: &[u8]) -> TrieResult<Self> {
        let (tx_type, body) = match encoded.split_first() {
            Some((&first, rest)) if first <= 0x7f => (Some(first), rest),
            Some(_) => (None, encoded),
            None => return Err(TrieError::InvalidData),
        };

        let rlp = Rlp::new(body);
        if !rlp.is_list() || rlp.item_count()? != 4 {
            return Err(TrieError::InvalidData);
        }

        Ok(Self {
            tx_type,
            status: rlp.val_at(0)?,
            cumulative_gas_used: rlp.val_at(1)?,
            log_count: rlp.at(3)?.item_count()?,
        })
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;
    use rlp::RlpStream;

    fn receipt(status: u8, gas: u64, logs: usize) -> Vec<u8> {
        let mut stream = RlpStream::new_list(4);
        stream.append(&status);
        stream.append(&gas);
        stream.append(&[0u8; 256].to_vec());
        stream.begin_list(logs);
        for _ in 0..logs {
            stream.begin_list(0);
        }
        stream.out().to_vec()
    }

    #[test]
    fn decodes_legacy_receipt() {
        let summary = ReceiptSummary::decode(&receipt(1, 21_000, 0)).unwrap();
        assert_eq!(
            summary,
            ReceiptSummary {
                tx_type: None,
                status: 1,
                cumulative_gas_used: 21_000,
                log_count: 0,
            }
        );
        assert!(summary.succeeded());
    }

    #[test]
    fn decodes_typed_receipt() {
        let mut encoded = alloc::vec![0x02];
        encoded.extend(receipt(0, 1_234_567, 3));
        let summary = ReceiptSummary::decode(&encoded).unwrap();
        assert_eq!(summary.tx_type, Some(2));
        assert_eq!(summary.cumulative_gas_used, 1_234_567);
        assert_eq!(summary.log_count, 3);
        assert!(!summary.succeeded());
    }

    #[test]
    fn rejects_malformed_receipts() {
        assert_eq!(ReceiptSummary::decode(&[]), Err(TrieError::InvalidData));

        let mut short = RlpStream::new_list(2);
        short.append(&1u8);
        short.append(&2u64);
        assert_eq!(
            ReceiptSummary::decode(&short.out()),
            Err(TrieError::InvalidData)
        );
    }
}
