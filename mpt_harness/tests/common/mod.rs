#![allow(dead_code)]
use std::path::Path;

use mpt_harness::ProviderConfig;
use solana_commitment_config::CommitmentLevel;
use solana_keypair::Keypair;

pub const LOCAL_URL: &str = "http://127.0.0.1:8899";

pub fn write_keypair(dir: &Path, seed: u8) -> Keypair {
    let keypair = Keypair::new_from_array([seed; 32]);
    let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
    std::fs::write(dir.join("id.json"), json).unwrap();
    keypair
}

pub fn local_config(dir: &Path) -> ProviderConfig {
    ProviderConfig {
        url: LOCAL_URL.parse().unwrap(),
        wallet: dir.join("id.json"),
        commitment: CommitmentLevel::Confirmed,
    }
}
