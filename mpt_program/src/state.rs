//! Layout of the proof account.
//!
//! ```text
//! | ProofHeader (96 bytes) | node count: u32 | (len: u32 | node bytes)* |
//! ```
//!
//! The body after the header is exactly `proof_size` bytes, with all integers little endian.
//! Nodes are uploaded over several transactions; a merge append extends the last stored node
//! so a node may be split across transactions.
use core::mem::size_of;

use bytemuck::{Pod, Zeroable};
use pinocchio::pubkey::Pubkey;

use crate::error::MptError;

pub const PROOF_SEED: &[u8] = b"MptProof";
pub const PROOF_DISCRIMINANT: [u8; 8] = *b"mptproof";
pub const HEADER_LEN: usize = size_of::<ProofHeader>();
/// Largest account the program can create through a CPI.
pub const MAX_ACCOUNT_SIZE: usize = 10_240;
pub const MAX_PROOF_SIZE: usize = MAX_ACCOUNT_SIZE - HEADER_LEN;
/// Size of an empty body: just the node count.
pub const EMPTY_BODY_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProofStatus {
    Pending = 0,
    Verified = 1,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ProofHeader {
    pub discriminant: [u8; 8],
    pub root: [u8; 32],
    pub authority: Pubkey,
    pub proof_size: u32,
    pub written: u32,
    pub node_count: u32,
    /// Offset in the body of the last node's length prefix.
    pub last_node_offset: u32,
    pub bump: u8,
    pub status: u8,
    pub _padding: [u8; 6],
}

impl ProofHeader {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let (written, proof_size) = (self.written, self.proof_size);
        written == proof_size
    }

    #[must_use]
    pub fn status(&self) -> ProofStatus {
        if self.status == ProofStatus::Verified as u8 {
            ProofStatus::Verified
        } else {
            ProofStatus::Pending
        }
    }

    #[must_use]
    pub fn account_len(&self) -> usize {
        HEADER_LEN + self.proof_size as usize
    }
}

/// Writes a fresh header and empty body into `data`.
///
/// `data` must be exactly `HEADER_LEN + proof_size` zeroed bytes.
pub fn initialize(
    data: &mut [u8],
    root: [u8; 32],
    authority: Pubkey,
    proof_size: u32,
    bump: u8,
) -> Result<(), MptError> {
    if (proof_size as usize) < EMPTY_BODY_LEN {
        return Err(MptError::InvalidInstruction);
    }
    if proof_size as usize > MAX_PROOF_SIZE {
        return Err(MptError::ProofTooLarge);
    }
    if data.len() != HEADER_LEN + proof_size as usize || data[..8] == PROOF_DISCRIMINANT {
        return Err(MptError::InvalidProofAccount);
    }

    let (header, body) = data.split_at_mut(HEADER_LEN);
    let header: &mut ProofHeader =
        bytemuck::try_from_bytes_mut(header).map_err(|_| MptError::InvalidProofAccount)?;
    *header = ProofHeader {
        discriminant: PROOF_DISCRIMINANT,
        root,
        authority,
        proof_size,
        written: EMPTY_BODY_LEN as u32,
        node_count: 0,
        last_node_offset: 0,
        bump,
        status: ProofStatus::Pending as u8,
        _padding: [0; 6],
    };
    write_u32(body, 0, 0);
    Ok(())
}

pub fn split_account(data: &[u8]) -> Result<(&ProofHeader, &[u8]), MptError> {
    if data.len() < HEADER_LEN {
        return Err(MptError::InvalidProofAccount);
    }
    let (header, body) = data.split_at(HEADER_LEN);
    let header: &ProofHeader =
        bytemuck::try_from_bytes(header).map_err(|_| MptError::InvalidProofAccount)?;
    check_header(header, body.len())?;
    Ok((header, body))
}

pub fn split_account_mut(data: &mut [u8]) -> Result<(&mut ProofHeader, &mut [u8]), MptError> {
    if data.len() < HEADER_LEN {
        return Err(MptError::InvalidProofAccount);
    }
    let (header, body) = data.split_at_mut(HEADER_LEN);
    let header: &mut ProofHeader =
        bytemuck::try_from_bytes_mut(header).map_err(|_| MptError::InvalidProofAccount)?;
    check_header(header, body.len())?;
    Ok((header, body))
}

fn check_header(header: &ProofHeader, body_len: usize) -> Result<(), MptError> {
    let proof_size = header.proof_size as usize;
    let written = header.written as usize;
    if header.discriminant != PROOF_DISCRIMINANT
        || body_len != proof_size
        || !(EMPTY_BODY_LEN..=proof_size).contains(&written)
    {
        return Err(MptError::InvalidProofAccount);
    }
    Ok(())
}

/// Appends `nodes` to the proof body.
///
/// With `is_merge` the first node's bytes are added to the last stored node instead of
/// starting a new one.
pub fn append_nodes<N: AsRef<[u8]>>(
    data: &mut [u8],
    nodes: &[N],
    is_merge: bool,
) -> Result<(), MptError> {
    let (header, body) = split_account_mut(data)?;
    if header.status() == ProofStatus::Verified {
        return Err(MptError::AlreadyVerified);
    }

    for (index, node) in nodes.iter().enumerate() {
        let node = node.as_ref();
        let written = header.written as usize;
        let node_len = u32::try_from(node.len()).map_err(|_| MptError::ProofOverflow)?;

        if index == 0 && is_merge {
            let node_count = header.node_count;
            if node_count == 0 {
                return Err(MptError::MergeWithoutNode);
            }
            let end = written + node.len();
            if end > body.len() {
                return Err(MptError::ProofOverflow);
            }
            body[written..end].copy_from_slice(node);

            let offset = header.last_node_offset as usize;
            let merged_len = read_u32(body, offset).ok_or(MptError::CorruptProof)? + node_len;
            write_u32(body, offset, merged_len);
            header.written = end as u32;
        } else {
            let start = written + 4;
            let end = start + node.len();
            if end > body.len() {
                return Err(MptError::ProofOverflow);
            }
            write_u32(body, written, node_len);
            body[start..end].copy_from_slice(node);

            header.last_node_offset = written as u32;
            header.node_count += 1;
            header.written = end as u32;
            let node_count = header.node_count;
            write_u32(body, 0, node_count);
        }
    }
    Ok(())
}

/// Reads back the stored nodes of a completely uploaded proof.
pub fn read_nodes(data: &[u8]) -> Result<(&ProofHeader, Vec<&[u8]>), MptError> {
    let (header, body) = split_account(data)?;
    if !header.is_complete() {
        return Err(MptError::IncompleteProof);
    }

    let count = read_u32(body, 0).ok_or(MptError::CorruptProof)?;
    let node_count = header.node_count;
    if count != node_count {
        return Err(MptError::CorruptProof);
    }

    let mut nodes = Vec::with_capacity(count as usize);
    let mut offset = EMPTY_BODY_LEN;
    for _ in 0..count {
        let len = read_u32(body, offset).ok_or(MptError::CorruptProof)? as usize;
        let start = offset + 4;
        let node = body
            .get(start..start + len)
            .ok_or(MptError::CorruptProof)?;
        nodes.push(node);
        offset = start + len;
    }
    if offset != body.len() {
        return Err(MptError::CorruptProof);
    }
    Ok((header, nodes))
}

fn read_u32(body: &[u8], offset: usize) -> Option<u32> {
    let bytes = body.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn write_u32(body: &mut [u8], offset: usize, value: u32) {
    body[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROOT: [u8; 32] = [7; 32];
    const AUTHORITY: Pubkey = [3; 32];

    fn proof_size(nodes: &[&[u8]]) -> u32 {
        (EMPTY_BODY_LEN + nodes.iter().map(|node| 4 + node.len()).sum::<usize>()) as u32
    }

    fn account(proof_size: u32) -> Vec<u8> {
        let mut data = vec![0; HEADER_LEN + proof_size as usize];
        initialize(&mut data, ROOT, AUTHORITY, proof_size, 254).unwrap();
        data
    }

    #[test]
    fn header_is_96_bytes() {
        assert_eq!(HEADER_LEN, 96);
    }

    #[test]
    fn initialize_writes_pending_header() {
        let data = account(40);
        let (header, body) = split_account(&data).unwrap();
        assert_eq!({ header.root }, ROOT);
        assert_eq!({ header.authority }, AUTHORITY);
        assert_eq!({ header.proof_size }, 40);
        assert_eq!({ header.written }, 4);
        assert_eq!({ header.bump }, 254);
        assert_eq!(header.status(), ProofStatus::Pending);
        assert_eq!(body.len(), 40);
        assert!(!header.is_complete());
    }

    #[test]
    fn initialize_rejects_bad_sizes() {
        let mut data = vec![0; HEADER_LEN + 2];
        assert_eq!(
            initialize(&mut data, ROOT, AUTHORITY, 2, 1),
            Err(MptError::InvalidInstruction)
        );
        let mut data = vec![0; MAX_ACCOUNT_SIZE + 1];
        assert_eq!(
            initialize(&mut data, ROOT, AUTHORITY, MAX_PROOF_SIZE as u32 + 1, 1),
            Err(MptError::ProofTooLarge)
        );
        let mut data = vec![0; HEADER_LEN + 10];
        assert_eq!(
            initialize(&mut data, ROOT, AUTHORITY, 12, 1),
            Err(MptError::InvalidProofAccount)
        );
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let mut data = account(8);
        assert_eq!(
            initialize(&mut data, ROOT, AUTHORITY, 8, 1),
            Err(MptError::InvalidProofAccount)
        );
    }

    #[test]
    fn merged_appends_reassemble_nodes() {
        let nodes: [&[u8]; 3] = [b"first node", b"second, longer node", b"third"];
        let mut data = account(proof_size(&nodes));

        append_nodes(&mut data, &[&b"first node"[..], b"second,"], false).unwrap();
        append_nodes(&mut data, &[&b" longer"[..]], true).unwrap();
        append_nodes(&mut data, &[&b" node"[..], b"third"], true).unwrap();

        let (header, stored) = read_nodes(&data).unwrap();
        assert_eq!(stored, nodes.to_vec());
        assert_eq!({ header.node_count }, 3);
        assert!(header.is_complete());
    }

    #[test]
    fn overflow_is_rejected() {
        let mut data = account(proof_size(&[b"abc"]));
        assert_eq!(
            append_nodes(&mut data, &[b"abcd"], false),
            Err(MptError::ProofOverflow)
        );
        append_nodes(&mut data, &[b"abc"], false).unwrap();
        assert_eq!(
            append_nodes(&mut data, &[b"d"], true),
            Err(MptError::ProofOverflow)
        );
    }

    #[test]
    fn merge_needs_a_node() {
        let mut data = account(16);
        assert_eq!(
            append_nodes(&mut data, &[b"abc"], true),
            Err(MptError::MergeWithoutNode)
        );
    }

    #[test]
    fn incomplete_proof_cannot_be_read() {
        let mut data = account(proof_size(&[b"abc", b"def"]));
        append_nodes(&mut data, &[b"abc"], false).unwrap();
        assert_eq!(read_nodes(&data).unwrap_err(), MptError::IncompleteProof);
    }

    #[test]
    fn corrupt_body_is_detected() {
        let mut data = account(proof_size(&[b"abc"]));
        append_nodes(&mut data, &[b"abc"], false).unwrap();
        data[HEADER_LEN + 4] = 9;
        assert_eq!(read_nodes(&data).unwrap_err(), MptError::CorruptProof);
    }

    #[test]
    fn verified_proofs_are_frozen() {
        let mut data = account(proof_size(&[b"abc"]));
        append_nodes(&mut data, &[b"abc"], false).unwrap();
        split_account_mut(&mut data).unwrap().0.status = ProofStatus::Verified as u8;
        assert_eq!(
            append_nodes(&mut data, &[b"x"], true),
            Err(MptError::AlreadyVerified)
        );
    }

    #[test]
    fn foreign_accounts_are_rejected() {
        assert_eq!(
            split_account(&[0; 10]).unwrap_err(),
            MptError::InvalidProofAccount
        );
        let mut data = account(8);
        data[0] = b'x';
        assert_eq!(
            split_account(&data).unwrap_err(),
            MptError::InvalidProofAccount
        );
    }
}
