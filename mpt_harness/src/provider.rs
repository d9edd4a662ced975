//! A bound connection to a cluster: RPC client plus the signing wallet.
use std::{path::Path, sync::Arc};

use solana_address::Address;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::Transaction;
use tracing::{debug, info};
use url::Url;

use crate::{
    config::ProviderConfig,
    error::{HarnessError, Result},
};

struct ProviderInner {
    config: ProviderConfig,
    payer: Keypair,
    client: RpcClient,
}

/// Shared handle to a cluster. Clones refer to the same client and wallet.
#[derive(Clone)]
pub struct Provider {
    inner: Arc<ProviderInner>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("url", &self.inner.config.url.as_str())
            .field("payer", &self.payer())
            .field("commitment", &self.inner.config.commitment)
            .finish()
    }
}

impl Provider {
    pub fn from_env() -> Result<Self> {
        Self::bind(ProviderConfig::from_env()?)
    }

    /// Loads the wallet and creates the RPC client. Nothing is sent to the cluster.
    pub fn bind(config: ProviderConfig) -> Result<Self> {
        let payer = read_keypair(&config.wallet)?;
        let client = RpcClient::new_with_commitment(
            config.url.to_string(),
            CommitmentConfig {
                commitment: config.commitment,
            },
        );
        debug!(url = %config.url, payer = %payer.pubkey(), "bound provider");
        Ok(Self {
            inner: Arc::new(ProviderInner {
                config,
                payer,
                client,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn payer(&self) -> Address {
        self.inner.payer.pubkey()
    }

    #[must_use]
    pub fn payer_keypair(&self) -> &Keypair {
        &self.inner.payer
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.config.url
    }

    #[must_use]
    pub fn commitment(&self) -> CommitmentLevel {
        self.inner.config.commitment
    }

    #[must_use]
    pub fn client(&self) -> &RpcClient {
        &self.inner.client
    }

    /// Sends `instructions` in one transaction paid and signed by the wallet, and waits for
    /// the configured commitment.
    pub async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
    ) -> Result<Signature> {
        let blockhash = self.client().get_latest_blockhash().await?;
        let mut signers = vec![self.payer_keypair()];
        signers.extend_from_slice(extra_signers);
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer()),
            signers.as_slice(),
            blockhash,
        );
        let signature = self
            .client()
            .send_and_confirm_transaction(&transaction)
            .await?;
        info!(%signature, instructions = instructions.len(), "confirmed transaction");
        Ok(signature)
    }

    /// Data of the account at `address`, or `None` if it does not exist.
    pub async fn account_data(&self, address: &Address) -> Result<Option<Vec<u8>>> {
        let response = self
            .client()
            .get_account_with_commitment(
                address,
                CommitmentConfig {
                    commitment: self.commitment(),
                },
            )
            .await?;
        Ok(response.value.map(|account| account.data))
    }
}

/// Reads a keypair file in the Solana CLI format: a JSON array of 64 bytes.
pub fn read_keypair(path: &Path) -> Result<Keypair> {
    let display = path.display();
    let json = std::fs::read_to_string(path).map_err(|e| {
        HarnessError::Configuration(format!("cannot read wallet {display}: {e}"))
    })?;
    let bytes: Vec<u8> = serde_json::from_str(&json).map_err(|e| {
        HarnessError::Configuration(format!("wallet {display} is not a keypair file: {e}"))
    })?;
    Keypair::try_from(bytes.as_slice()).map_err(|e| {
        HarnessError::Configuration(format!("wallet {display} holds an invalid keypair: {e}"))
    })
}
