use pinocchio::{
    account_info::AccountInfo, cpi::set_return_data, program_error::ProgramError, pubkey::Pubkey,
    ProgramResult,
};
use pinocchio_log::log;

use crate::{error::MptError, state::split_account};

pub fn process_view_proof(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let [proof, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    if !proof.is_owned_by(program_id) {
        return Err(MptError::InvalidProofAccount.into());
    }

    let data = proof.try_borrow_data()?;
    let (header, _) = split_account(&data)?;
    let (proof_size, written, node_count, status) = (
        header.proof_size,
        header.written,
        header.node_count,
        header.status,
    );
    log!("Proof size: {}", proof_size);
    log!("Written: {}", written);
    log!("Nodes: {}", node_count);
    log!("Status: {}", status);

    set_return_data(bytemuck::bytes_of(header));
    Ok(())
}
