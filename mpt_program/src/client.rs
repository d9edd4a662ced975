//! Client-side helpers for building verifier instructions.
//!
//! Proofs are uploaded in chunks that fit in a transaction. [`chunk_proof`] splits a proof
//! so that every chunk's serialized node list stays under a byte budget, continuing a split
//! node in the next chunk with `is_merge` set.
use borsh::io::Result;
use solana_address::Address;
use solana_instruction::{AccountMeta, Instruction};

use crate::{
    instructions::MptInstruction,
    state::{EMPTY_BODY_LEN, PROOF_SEED},
    ID_ADDRESS,
};

pub const SYSTEM_PROGRAM_ADDRESS: Address =
    Address::new_from_array(crate::instructions::SYSTEM_PROGRAM_ID);

/// Node bytes per append that keep the transaction under the packet size with one signer.
pub const DEFAULT_CHUNK_BYTES: usize = 960;
/// Smallest budget that still carries one byte of a node.
pub const MIN_CHUNK_BYTES: usize = 9;

#[must_use]
pub fn find_proof_address(root: &[u8; 32]) -> (Address, u8) {
    Address::find_program_address(&[PROOF_SEED, root], &ID_ADDRESS)
}

/// Body size of a proof account holding `nodes`.
pub fn proof_size<N: AsRef<[u8]>>(nodes: &[N]) -> usize {
    EMPTY_BODY_LEN
        + nodes
            .iter()
            .map(|node| 4 + node.as_ref().len())
            .sum::<usize>()
}

fn instruction(ix: &MptInstruction, accounts: Vec<AccountMeta>) -> Result<Instruction> {
    Ok(Instruction {
        program_id: ID_ADDRESS,
        accounts,
        data: ix.pack()?,
    })
}

pub fn init_proof(payer: &Address, root: [u8; 32], proof_size: u32) -> Result<Instruction> {
    let (proof, bump) = find_proof_address(&root);
    instruction(
        &MptInstruction::InitProof {
            root,
            proof_size,
            bump,
        },
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(proof, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ADDRESS, false),
        ],
    )
}

pub fn append_proof(
    authority: &Address,
    root: &[u8; 32],
    chunk: &ProofChunk,
) -> Result<Instruction> {
    let (proof, _) = find_proof_address(root);
    instruction(
        &MptInstruction::AppendProof {
            nodes: chunk.nodes.clone(),
            is_merge: chunk.is_merge,
        },
        vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(proof, false),
        ],
    )
}

pub fn view_proof(root: &[u8; 32]) -> Result<Instruction> {
    let (proof, _) = find_proof_address(root);
    instruction(
        &MptInstruction::ViewProof,
        vec![AccountMeta::new_readonly(proof, false)],
    )
}

pub fn validate_mpt(root: &[u8; 32], key: &[u8]) -> Result<Instruction> {
    let (proof, _) = find_proof_address(root);
    instruction(
        &MptInstruction::ValidateMpt { key: key.to_vec() },
        vec![AccountMeta::new(proof, false)],
    )
}

/// The nodes carried by one `AppendProof`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofChunk {
    pub nodes: Vec<Vec<u8>>,
    /// The first node continues the last node stored by the previous chunk.
    pub is_merge: bool,
}

impl ProofChunk {
    /// Serialized size of the node list (`u32` count, then `u32` length and bytes per node).
    #[must_use]
    pub fn payload_len(&self) -> usize {
        proof_size(&self.nodes)
    }

    /// Bytes the chunk adds to the `written` counter of the proof account.
    #[must_use]
    pub fn body_len(&self) -> usize {
        let merged_prefix = if self.is_merge && !self.nodes.is_empty() { 4 } else { 0 };
        self.payload_len() - EMPTY_BODY_LEN - merged_prefix
    }

    /// Applies the chunk to `nodes` with the same semantics as the on-chain append.
    pub fn apply_to(&self, nodes: &mut Vec<Vec<u8>>) {
        let mut chunk_nodes = self.nodes.iter();
        if self.is_merge {
            if let (Some(first), Some(last)) = (chunk_nodes.next(), nodes.last_mut()) {
                last.extend_from_slice(first);
            }
        }
        nodes.extend(chunk_nodes.cloned());
    }
}

/// Splits `nodes` into chunks whose [`ProofChunk::payload_len`] is at most `max_bytes`.
///
/// Budgets below [`MIN_CHUNK_BYTES`] are raised to it.
#[must_use]
pub fn chunk_proof<N: AsRef<[u8]>>(nodes: &[N], max_bytes: usize) -> Vec<ProofChunk> {
    let max_bytes = max_bytes.max(MIN_CHUNK_BYTES);
    let mut chunks = Vec::new();
    let mut current = ProofChunk::default();
    let mut used = EMPTY_BODY_LEN;

    for node in nodes {
        let mut rest = node.as_ref();
        if used + 4 >= max_bytes {
            chunks.push(std::mem::take(&mut current));
            used = EMPTY_BODY_LEN;
        }
        loop {
            let take = rest.len().min(max_bytes - used - 4);
            current.nodes.push(rest[..take].to_vec());
            used += 4 + take;
            rest = &rest[take..];
            if rest.is_empty() {
                break;
            }
            chunks.push(std::mem::take(&mut current));
            current.is_merge = true;
            used = EMPTY_BODY_LEN;
        }
    }
    if !current.nodes.is_empty() {
        chunks.push(current);
    }
    chunks
}
