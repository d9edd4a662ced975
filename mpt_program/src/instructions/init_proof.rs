use pinocchio::{
    account_info::AccountInfo,
    cpi::slice_invoke_signed,
    instruction::{AccountMeta, Instruction, Seed, Signer},
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvars::{rent::Rent, Sysvar},
    ProgramResult,
};
use pinocchio_log::log;

use crate::{
    error::MptError,
    state::{initialize, HEADER_LEN, MAX_ACCOUNT_SIZE, PROOF_SEED},
};

pub const SYSTEM_PROGRAM_ID: Pubkey = [0; 32];
const CREATE_ACCOUNT_IX: u32 = 0;

pub fn process_init_proof(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    root: [u8; 32],
    proof_size: u32,
    bump: u8,
) -> ProgramResult {
    let [payer, proof, system_program, ..] = accounts else {
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    if !payer.is_signer() {
        return Err(ProgramError::MissingRequiredSignature);
    }
    if !proof.is_writable() {
        return Err(ProgramError::InvalidAccountData);
    }
    if system_program.key() != &SYSTEM_PROGRAM_ID {
        return Err(ProgramError::IncorrectProgramId);
    }

    let space = HEADER_LEN + proof_size as usize;
    if space > MAX_ACCOUNT_SIZE {
        return Err(MptError::ProofTooLarge.into());
    }
    check_proof_seeds(proof.key(), &root, bump, program_id)?;
    if proof.data_len() != 0 {
        return Err(ProgramError::AccountAlreadyInitialized);
    }

    let lamports = Rent::get()?.minimum_balance(space);
    create_account(payer, proof, program_id, lamports, space, &root, bump)?;
    initialize(
        &mut proof.try_borrow_mut_data()?,
        root,
        *payer.key(),
        proof_size,
        bump,
    )?;

    log!("Proof account created with {} body bytes", proof_size);
    Ok(())
}

/// Address and bump of the canonical proof account for `root`.
pub fn canonical_proof_address(root: &[u8; 32], program_id: &Pubkey) -> (Pubkey, u8) {
    let seeds: [&[u8]; 2] = [PROOF_SEED, root];

    #[cfg(target_os = "solana")]
    {
        pinocchio::pubkey::find_program_address(&seeds, program_id)
    }
    #[cfg(not(target_os = "solana"))]
    {
        let (address, bump) = solana_address::Address::find_program_address(
            &seeds,
            &solana_address::Address::new_from_array(*program_id),
        );
        (address.to_bytes(), bump)
    }
}

/// Accepts only the canonical proof account for `root`, created with its canonical bump.
pub fn check_proof_seeds(
    proof: &Pubkey,
    root: &[u8; 32],
    bump: u8,
    program_id: &Pubkey,
) -> Result<(), MptError> {
    let (expected, canonical_bump) = canonical_proof_address(root, program_id);
    if bump != canonical_bump || proof != &expected {
        return Err(MptError::InvalidSeeds);
    }
    Ok(())
}

#[inline(never)]
fn create_account(
    payer: &AccountInfo,
    proof: &AccountInfo,
    owner: &Pubkey,
    lamports: u64,
    space: usize,
    root: &[u8; 32],
    bump: u8,
) -> ProgramResult {
    // System instruction layout: tag | lamports | space | owner
    let mut data = [0u8; 52];
    data[..4].copy_from_slice(&CREATE_ACCOUNT_IX.to_le_bytes());
    data[4..12].copy_from_slice(&lamports.to_le_bytes());
    data[12..20].copy_from_slice(&(space as u64).to_le_bytes());
    data[20..].copy_from_slice(owner);

    let metas = [
        AccountMeta {
            pubkey: payer.key(),
            is_writable: true,
            is_signer: true,
        },
        AccountMeta {
            pubkey: proof.key(),
            is_writable: true,
            is_signer: true,
        },
    ];
    let instruction = Instruction {
        program_id: &SYSTEM_PROGRAM_ID,
        data: &data,
        accounts: &metas,
    };

    let bump = [bump];
    let seeds = [
        Seed::from(PROOF_SEED),
        Seed::from(root.as_slice()),
        Seed::from(bump.as_slice()),
    ];
    let signers: [Signer; 1] = [seeds.as_slice().into()];
    slice_invoke_signed(&instruction, &[payer, proof], &signers)
}
