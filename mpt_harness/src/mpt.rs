//! Uploads a proof to the verifier and validates it.
//!
//! The upload resumes where a previous run stopped: chunks whose bytes are already counted in
//! the proof account's `written` header field are skipped. Resuming needs the same chunk
//! budget as the interrupted run.
use mpt_program::{
    client::{self, ProofChunk, DEFAULT_CHUNK_BYTES},
    state::{split_account, ProofHeader, ProofStatus, EMPTY_BODY_LEN},
};
use solana_address::Address;
use solana_signature::Signature;
use tracing::{debug, info};

use crate::{
    error::{HarnessError, Result},
    provider::Provider,
    workspace::ProgramHandle,
};

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub proof_account: Address,
    pub bump: u8,
    pub proof_size: usize,
    pub chunks_sent: usize,
    pub chunks_skipped: usize,
    pub signatures: Vec<Signature>,
    pub status: ProofStatus,
}

#[derive(Debug, Clone)]
pub struct ProofUploader {
    provider: Provider,
    program: ProgramHandle,
    chunk_bytes: usize,
}

impl ProofUploader {
    /// Fails if `program` is not the verifier this client builds instructions for.
    pub fn new(provider: Provider, program: ProgramHandle) -> Result<Self> {
        if program.address != mpt_program::ID_ADDRESS {
            return Err(HarnessError::Program(format!(
                "`{}` resolves to {}, instructions target {}",
                program.name,
                program.address,
                mpt_program::ID_ADDRESS
            )));
        }
        Ok(Self {
            provider,
            program,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        })
    }

    #[must_use]
    pub fn chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    #[must_use]
    pub fn program(&self) -> &ProgramHandle {
        &self.program
    }

    /// Header of the proof account for `root`, if it exists.
    pub async fn fetch_header(&self, root: &[u8; 32]) -> Result<Option<ProofHeader>> {
        let (address, _) = client::find_proof_address(root);
        let Some(data) = self.provider.account_data(&address).await? else {
            return Ok(None);
        };
        let (header, _) = split_account(&data)
            .map_err(|e| HarnessError::Program(format!("proof account {address}: {e}")))?;
        Ok(Some(*header))
    }

    /// Creates the proof account if needed, appends the missing chunks and validates `key`.
    pub async fn submit(
        &self,
        root: [u8; 32],
        key: &[u8],
        nodes: &[Vec<u8>],
    ) -> Result<UploadReport> {
        let payer = self.provider.payer();
        let (proof_account, bump) = client::find_proof_address(&root);
        let proof_size = client::proof_size(nodes);
        let chunks = client::chunk_proof(nodes, self.chunk_bytes);
        let mut signatures = Vec::new();

        let written = match self.fetch_header(&root).await? {
            None => {
                let proof_size_arg = u32::try_from(proof_size).map_err(|_| {
                    HarnessError::Program(format!("proof of {proof_size} bytes is too large"))
                })?;
                info!(%proof_account, proof_size, "creating proof account");
                let init = client::init_proof(&payer, root, proof_size_arg).map_err(encoding)?;
                signatures.push(self.provider.send_and_confirm(&[init], &[]).await?);
                EMPTY_BODY_LEN
            }
            Some(header) => check_existing(&header, &payer, proof_size)?,
        };

        let (to_send, chunks_skipped) = pending_chunks(&chunks, written)?;
        for (index, chunk) in to_send.iter().enumerate() {
            debug!(
                chunk = index + chunks_skipped,
                nodes = chunk.nodes.len(),
                is_merge = chunk.is_merge,
                "appending chunk"
            );
            let append = client::append_proof(&payer, &root, chunk).map_err(encoding)?;
            signatures.push(self.provider.send_and_confirm(&[append], &[]).await?);
        }
        info!(sent = to_send.len(), skipped = chunks_skipped, "proof uploaded");

        let validate = client::validate_mpt(&root, key).map_err(encoding)?;
        signatures.push(self.provider.send_and_confirm(&[validate], &[]).await?);

        let header = self.fetch_header(&root).await?.ok_or_else(|| {
            HarnessError::Program(format!("proof account {proof_account} was not found"))
        })?;
        let status = header.status();
        info!(%proof_account, ?status, "proof validated");

        Ok(UploadReport {
            proof_account,
            bump,
            proof_size,
            chunks_sent: to_send.len(),
            chunks_skipped,
            signatures,
            status,
        })
    }
}

fn encoding(error: impl std::fmt::Display) -> HarnessError {
    HarnessError::Program(format!("failed to encode instruction: {error}"))
}

fn check_existing(header: &ProofHeader, payer: &Address, proof_size: usize) -> Result<usize> {
    let (stored_size, written) = (header.proof_size as usize, header.written as usize);
    if stored_size != proof_size {
        return Err(HarnessError::Program(format!(
            "existing proof account holds {stored_size} bytes, the proof needs {proof_size}"
        )));
    }
    if header.authority != payer.to_bytes() {
        return Err(HarnessError::Program(format!(
            "existing proof account belongs to {}",
            Address::new_from_array(header.authority)
        )));
    }
    Ok(written)
}

/// Chunks that still have to be appended given `written` body bytes, and how many are done.
fn pending_chunks(chunks: &[ProofChunk], written: usize) -> Result<(&[ProofChunk], usize)> {
    let mut offset = EMPTY_BODY_LEN;
    for (index, chunk) in chunks.iter().enumerate() {
        if offset == written {
            return Ok((&chunks[index..], index));
        }
        offset += chunk.body_len();
    }
    if offset == written {
        return Ok((&[], chunks.len()));
    }
    Err(HarnessError::Program(format!(
        "{written} uploaded bytes do not end on a chunk boundary, \
         retry with the original chunk size"
    )))
}
