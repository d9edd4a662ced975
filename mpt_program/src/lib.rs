//! On-chain verifier for Ethereum Merkle-Patricia trie inclusion proofs.
//!
//! A proof is too large for one transaction, so it is uploaded into a program derived
//! account (seeds `["MptProof", root]`) with [`MptInstruction::InitProof`] and a series of
//! [`MptInstruction::AppendProof`] chunks, then checked with
//! [`MptInstruction::ValidateMpt`].
use pinocchio::{
    account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey, ProgramResult,
};
use solana_address::Address;

pub mod error;
pub mod instructions;
pub mod keccak;
pub mod state;

#[cfg(not(target_os = "solana"))]
pub mod client;
#[cfg(all(feature = "idl", not(target_os = "solana")))]
pub mod idl;

pub use error::MptError;
pub use instructions::MptInstruction;

/// Name the program is registered under in the workspace.
pub const PROGRAM_NAME: &str = "anchor_mpt_demo";

pub const ID_ADDRESS: Address =
    Address::from_str_const("9n2uAscxSNrotCE2PC1DpKgtUFu7iSWEiJpbN9ynqzHp");
pub const ID: Pubkey = ID_ADDRESS.to_bytes();

#[cfg(not(feature = "no_entrypoint"))]
pinocchio::entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let result = MptInstruction::unpack(instruction_data)
        .map_err(ProgramError::from)
        .and_then(|instruction| instruction.process(program_id, accounts));

    if let Err(ProgramError::Custom(code)) = &result {
        if let Some(error) = MptError::from_code(*code) {
            error.log();
        }
    }
    result
}
