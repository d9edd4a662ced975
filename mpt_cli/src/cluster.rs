//! Commands that talk to a cluster through the harness provider.
use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser};
use colored::*;
use eyre::{bail, WrapErr};
use mpt_harness::{
    config::{COMMITMENT_ENV, PROVIDER_URL_ENV, WALLET_ENV},
    smoke_suite,
    workspace::DEFAULT_IDL_DIR,
    ProgramHandle, ProofUploader, Provider, ProviderConfig, TestContext, Workspace,
};
use mpt_program::{client::DEFAULT_CHUNK_BYTES, state::ProofStatus, PROGRAM_NAME};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{offline::print_receipt, proof_file::ProofFile};

#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Cluster RPC endpoint
    #[arg(long, env = PROVIDER_URL_ENV)]
    pub url: Option<String>,
    /// Keypair file paying for and signing transactions
    #[arg(long, env = WALLET_ENV)]
    pub wallet: Option<String>,
    /// processed, confirmed or finalized
    #[arg(long, env = COMMITMENT_ENV)]
    pub commitment: Option<String>,
}

impl ProviderArgs {
    fn bind(&self) -> eyre::Result<Provider> {
        let config = ProviderConfig::from_lookup(|key| match key {
            PROVIDER_URL_ENV => self.url.clone(),
            WALLET_ENV => self.wallet.clone(),
            COMMITMENT_ENV => self.commitment.clone(),
            other => std::env::var(other).ok(),
        })?;
        Ok(Provider::bind(config)?)
    }
}

fn resolve_program() -> eyre::Result<ProgramHandle> {
    Workspace::with_defaults()
        .resolve(PROGRAM_NAME)
        .wrap_err_with(|| {
            format!(
                "Failed to resolve `{PROGRAM_NAME}`, `mpt idl` writes its artifact to \
                 {DEFAULT_IDL_DIR}"
            )
        })
}

#[derive(Parser, Debug)]
pub struct SubmitArgs {
    #[arg(long, value_name = "FILE")]
    pub proof: PathBuf,
    /// Byte budget of each append. Resuming an upload needs the original value.
    #[arg(long, default_value_t = DEFAULT_CHUNK_BYTES)]
    pub chunk_bytes: usize,
    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Per test timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
    #[command(flatten)]
    pub provider: ProviderArgs,
}

pub async fn submit(args: SubmitArgs) -> eyre::Result<()> {
    let proof = ProofFile::read(&args.proof)?;
    let value = proof
        .verify()
        .wrap_err("Proof does not verify locally, refusing to upload it")?;
    if value.is_none() {
        bail!("Proof shows the key is absent, the program would reject it");
    }

    let provider = args.provider.bind()?;
    let program = resolve_program()?;
    println!(
        "Submitting to {} at {} as {}",
        program.name.bold(),
        provider.url(),
        provider.payer()
    );

    let report = ProofUploader::new(provider, program)?
        .chunk_bytes(args.chunk_bytes)
        .submit(proof.root.to_bytes(), &proof.key, &proof.proof)
        .await?;

    println!("proof account: {}", report.proof_account);
    println!(
        "appends:       {} sent, {} already uploaded",
        report.chunks_sent, report.chunks_skipped
    );
    if let Some(signature) = report.signatures.last() {
        println!("validated in:  {signature}");
    }
    if report.status != ProofStatus::Verified {
        bail!("Proof account {} is not marked verified", report.proof_account);
    }
    println!("{}", "Proof verified on chain".green().bold());
    if let Some(receipt) = value.and_then(|v| mpt_trie::ReceiptSummary::decode(&v).ok()) {
        print_receipt(&receipt);
    }
    Ok(())
}

pub async fn test(args: TestArgs) -> eyre::Result<()> {
    let provider = args.provider.bind()?;
    let program = resolve_program()?;
    let suite = smoke_suite::<TestContext>().timeout(Duration::from_secs(args.timeout));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling remaining tests");
            on_interrupt.cancel();
        }
    });

    let report = suite
        .run_with_cancel(TestContext { provider, program }, cancel)
        .await;
    interrupt.abort();

    println!("{}", report.render());
    if !report.is_success() {
        bail!("Suite `{}` failed: {}", report.suite, report.summary());
    }
    Ok(())
}
