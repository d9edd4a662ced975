//! Merkle-Patricia trie primitives for verifying Ethereum inclusion proofs.
//!
//! The crate is `no_std` (with `alloc`) so the same verification code runs inside a Solana
//! program and on the host. Hashing is abstracted behind [`NodeHasher`]; enable the `sha3`
//! feature for the host [`Keccak256`] implementation.
//!
//! ```
//! # #[cfg(feature = "sha3")] {
//! use mpt_trie::{verify_proof, Keccak256, TrieBuilder};
//!
//! let mut trie = TrieBuilder::new(Keccak256);
//! trie.insert(b"dog", b"puppy").unwrap();
//! trie.insert(b"horse", b"stallion").unwrap();
//!
//! let proof = trie.proof(b"dog");
//! let value = verify_proof(&Keccak256, trie.root_hash(), b"dog", &proof).unwrap();
//! assert_eq!(value.as_deref(), Some(&b"puppy"[..]));
//! # }
//! ```
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod builder;
mod error;
mod hash;
mod nibbles;
mod node;
mod proof;
mod receipt;

pub use builder::TrieBuilder;
pub use error::{TrieError, TrieResult};
#[cfg(feature = "sha3")]
pub use hash::Keccak256;
pub use hash::{NodeHasher, EMPTY_ROOT, H256, HASH_LENGTH};
pub use nibbles::{Nibbles, TERMINATOR};
pub use node::{empty_children, BranchNode, ExtensionNode, LeafNode, Node};
pub use proof::{verify_proof, ProofDb, ProofTrie};
pub use receipt::ReceiptSummary;
