//! Provider configuration read from the environment.
use std::path::PathBuf;

use solana_commitment_config::CommitmentLevel;
use url::Url;

use crate::error::{HarnessError, Result};

pub const PROVIDER_URL_ENV: &str = "ANCHOR_PROVIDER_URL";
pub const WALLET_ENV: &str = "ANCHOR_WALLET";
pub const COMMITMENT_ENV: &str = "ANCHOR_COMMITMENT";

/// Where to send transactions, who signs them, and at which commitment they are awaited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: Url,
    pub wallet: PathBuf,
    pub commitment: CommitmentLevel,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| HarnessError::Configuration(format!("{key} is not set")))
        };

        let url = parse_url(&required(PROVIDER_URL_ENV)?)?;
        let wallet = expand_home(&required(WALLET_ENV)?, lookup("HOME"));
        let commitment = match lookup(COMMITMENT_ENV) {
            Some(value) if !value.trim().is_empty() => parse_commitment(value.trim())?,
            _ => CommitmentLevel::Confirmed,
        };

        Ok(Self {
            url,
            wallet,
            commitment,
        })
    }
}

pub fn parse_url(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| {
        HarnessError::Configuration(format!("{PROVIDER_URL_ENV} `{value}` is not a URL: {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(HarnessError::Configuration(format!(
            "{PROVIDER_URL_ENV} must use http or https, found `{scheme}`"
        ))),
    }
}

pub fn parse_commitment(value: &str) -> Result<CommitmentLevel> {
    match value.to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentLevel::Processed),
        "confirmed" => Ok(CommitmentLevel::Confirmed),
        "finalized" => Ok(CommitmentLevel::Finalized),
        _ => Err(HarnessError::Configuration(format!(
            "{COMMITMENT_ENV} `{value}` is not one of processed, confirmed, finalized"
        ))),
    }
}

fn expand_home(path: &str, home: Option<String>) -> PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
