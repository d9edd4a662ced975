use borsh::{BorshDeserialize, BorshSerialize};
use pinocchio::{account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey};

use crate::error::MptError;

mod append_proof;
mod init_proof;
mod validate_mpt;
mod view_proof;

pub use append_proof::process_append_proof;
pub use init_proof::{
    canonical_proof_address, check_proof_seeds, process_init_proof, SYSTEM_PROGRAM_ID,
};
pub use validate_mpt::{process_validate_mpt, MAX_RETURN_VALUE_LEN};
pub use view_proof::process_view_proof;

/// Instructions of the verifier.
///
/// Borsh encodes the variant index as a single leading byte, which is the instruction
/// discriminant.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum MptInstruction {
    /// Creates the proof account for `root`, sized for `proof_size` body bytes.
    InitProof {
        root: [u8; 32],
        proof_size: u32,
        bump: u8,
    },
    /// Uploads a chunk of proof nodes.
    AppendProof { nodes: Vec<Vec<u8>>, is_merge: bool },
    /// Returns the proof header as return data.
    ViewProof,
    /// Verifies the uploaded proof for `key` against the stored root.
    ValidateMpt { key: Vec<u8> },
}

impl MptInstruction {
    pub const INIT_PROOF: u8 = 0;
    pub const APPEND_PROOF: u8 = 1;
    pub const VIEW_PROOF: u8 = 2;
    pub const VALIDATE_MPT: u8 = 3;

    #[must_use]
    pub const fn discriminant(&self) -> u8 {
        match self {
            MptInstruction::InitProof { .. } => Self::INIT_PROOF,
            MptInstruction::AppendProof { .. } => Self::APPEND_PROOF,
            MptInstruction::ViewProof => Self::VIEW_PROOF,
            MptInstruction::ValidateMpt { .. } => Self::VALIDATE_MPT,
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self, MptError> {
        borsh::from_slice(data).map_err(|_| MptError::InvalidInstruction)
    }

    pub fn pack(&self) -> borsh::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    pub fn process(
        self,
        program_id: &Pubkey,
        accounts: &[AccountInfo],
    ) -> Result<(), ProgramError> {
        match self {
            MptInstruction::InitProof {
                root,
                proof_size,
                bump,
            } => process_init_proof(program_id, accounts, root, proof_size, bump),
            MptInstruction::AppendProof { nodes, is_merge } => {
                process_append_proof(program_id, accounts, &nodes, is_merge)
            }
            MptInstruction::ViewProof => process_view_proof(program_id, accounts),
            MptInstruction::ValidateMpt { key } => process_validate_mpt(program_id, accounts, &key),
        }
    }
}

/// Checks the account is a writable proof account owned by this program.
fn writable_proof_account(program_id: &Pubkey, proof: &AccountInfo) -> Result<(), ProgramError> {
    if !proof.is_owned_by(program_id) {
        return Err(MptError::InvalidProofAccount.into());
    }
    if !proof.is_writable() {
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leading_byte_is_the_discriminant() {
        let instructions = [
            MptInstruction::InitProof {
                root: [1; 32],
                proof_size: 100,
                bump: 255,
            },
            MptInstruction::AppendProof {
                nodes: vec![vec![1, 2], vec![3]],
                is_merge: true,
            },
            MptInstruction::ViewProof,
            MptInstruction::ValidateMpt { key: vec![0x80] },
        ];
        for (index, ix) in instructions.into_iter().enumerate() {
            let data = ix.pack().unwrap();
            assert_eq!(data[0], index as u8);
            assert_eq!(data[0], ix.discriminant());
            assert_eq!(MptInstruction::unpack(&data).unwrap(), ix);
        }
    }

    #[test]
    fn append_layout_matches_proof_body_sizes() {
        let data = MptInstruction::AppendProof {
            nodes: vec![vec![9; 5]],
            is_merge: false,
        }
        .pack()
        .unwrap();
        // disc | vec len | node len | node | merge flag
        assert_eq!(data.len(), 1 + 4 + 4 + 5 + 1);
        assert_eq!(&data[1..9], &[1, 0, 0, 0, 5, 0, 0, 0]);
    }

    #[test]
    fn rejects_unknown_or_trailing_data() {
        assert_eq!(MptInstruction::unpack(&[7]), Err(MptError::InvalidInstruction));
        assert_eq!(MptInstruction::unpack(&[]), Err(MptError::InvalidInstruction));
        assert_eq!(
            MptInstruction::unpack(&[MptInstruction::VIEW_PROOF, 0]),
            Err(MptError::InvalidInstruction)
        );
    }
}
