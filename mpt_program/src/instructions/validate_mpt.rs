use mpt_trie::{verify_proof, ReceiptSummary, H256};
use pinocchio::{
    account_info::AccountInfo, cpi::set_return_data, program_error::ProgramError, pubkey::Pubkey,
    ProgramResult,
};
use pinocchio_log::log;

use super::writable_proof_account;
use crate::{
    error::MptError,
    keccak::SolanaKeccak,
    state::{read_nodes, split_account_mut, ProofStatus},
};

/// Proven values up to this size are returned to the caller.
pub const MAX_RETURN_VALUE_LEN: usize = 1024;

pub fn process_validate_mpt(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    key: &[u8],
) -> ProgramResult {
    let [proof, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    writable_proof_account(program_id, proof)?;

    let mut data = proof.try_borrow_mut_data()?;
    let value = {
        let (header, nodes) = read_nodes(&data)?;
        log!("Validating {} proof nodes", nodes.len() as u64);
        verify_proof(&SolanaKeccak, H256(header.root), key, nodes)
            .map_err(|_| MptError::InvalidProof)?
            .ok_or(MptError::KeyNotFound)?
    };

    log_value(&value);
    split_account_mut(&mut data)?.0.status = ProofStatus::Verified as u8;
    if value.len() <= MAX_RETURN_VALUE_LEN {
        set_return_data(&value);
    }
    Ok(())
}

fn log_value(value: &[u8]) {
    match ReceiptSummary::decode(value) {
        Ok(receipt) => {
            if let Some(tx_type) = receipt.tx_type {
                log!("Receipt type: {}", tx_type);
            }
            log!("Receipt status: {}", receipt.status);
            log!("Cumulative gas used: {}", receipt.cumulative_gas_used);
            log!("Logs: {}", receipt.log_count as u64);
        }
        Err(_) => log!("Proven value of {} bytes", value.len() as u64),
    }
}
