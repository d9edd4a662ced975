use alloc::vec::Vec;

use crate::{hash::H256, nibbles::Nibbles};

pub type TrieResult<T> = Result<T, TrieError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrieError {
    #[error("Invalid node data")]
    InvalidData,
    #[error("Invalid proof")]
    InvalidProof,
    #[error("Invalid compact path flag: {0:#04x}")]
    InvalidCompactFlag(u8),
    #[error("Compact path is empty")]
    EmptyCompactPath,
    #[error("Expected a 32 byte hash, found {0} bytes")]
    InvalidHashLength(usize),
    #[error("Invalid hex: {0}")]
    InvalidHex(hex::FromHexError),
    #[error("Empty values cannot be inserted into the trie")]
    EmptyValue,
    #[error(
        "Missing trie node {node_hash} (root: {root_hash:?}, traversed: {traversed:?}, \
         key: {err_key:?})"
    )]
    MissingTrieNode {
        node_hash: H256,
        traversed: Option<Nibbles>,
        root_hash: Option<H256>,
        err_key: Option<Vec<u8>>,
    },
    #[error("RLP decoding failed: {0}")]
    Rlp(rlp::DecoderError),
}

impl From<rlp::DecoderError> for TrieError {
    fn from(value: rlp::DecoderError) -> Self {
        Self::Rlp(value)
    }
}

impl From<hex::FromHexError> for TrieError {
    fn from(value: hex::FromHexError) -> Self {
        Self::InvalidHex(value)
    }
}
