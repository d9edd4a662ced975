use pinocchio::{
    account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey, ProgramResult,
};
use pinocchio_log::log;

use super::writable_proof_account;
use crate::{
    error::MptError,
    state::{append_nodes, split_account},
};

pub fn process_append_proof(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    nodes: &[Vec<u8>],
    is_merge: bool,
) -> ProgramResult {
    let [authority, proof, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    if !authority.is_signer() {
        return Err(ProgramError::MissingRequiredSignature);
    }
    writable_proof_account(program_id, proof)?;

    let mut data = proof.try_borrow_mut_data()?;
    let (header, _) = split_account(&data)?;
    if header.authority != *authority.key() {
        return Err(MptError::AuthorityMismatch.into());
    }

    append_nodes(&mut data, nodes, is_merge)?;

    let (header, _) = split_account(&data)?;
    let (written, proof_size, node_count) = (header.written, header.proof_size, header.node_count);
    log!("Proof upload: {}/{} bytes, {} nodes", written, proof_size, node_count);
    Ok(())
}
