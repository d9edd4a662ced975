//! Commands that work on proof files without a cluster.
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{bail, eyre, WrapErr};
use mpt_program::{
    client::{chunk_proof, find_proof_address, proof_size, DEFAULT_CHUNK_BYTES},
    state::{HEADER_LEN, MAX_PROOF_SIZE},
};
use mpt_trie::{ReceiptSummary, TrieBuilder};

use crate::proof_file::{parse_hex, read_entries, to_hex, ProofFile};

/// Longest value printed in full.
const MAX_DISPLAYED_VALUE: usize = 256;

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Proof file (`{"root", "key", "proof"}`)
    #[arg(long, value_name = "FILE")]
    pub proof: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ProveArgs {
    /// JSON list of `{"key", "value"}` hex pairs
    #[arg(long, value_name = "FILE")]
    pub entries: PathBuf,
    /// Key to prove, in hex
    #[arg(long, value_name = "HEX")]
    pub key: String,
    /// Where to write the proof file. Printed to stdout when omitted.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct AddressArgs {
    #[arg(long, value_name = "FILE")]
    pub proof: PathBuf,
    /// Byte budget of each append
    #[arg(long, default_value_t = DEFAULT_CHUNK_BYTES)]
    pub chunk_bytes: usize,
}

pub fn verify(args: VerifyArgs) -> eyre::Result<()> {
    let proof = ProofFile::read(&args.proof)?;
    let value = proof
        .verify()
        .wrap_err_with(|| format!("Proof does not verify against root {}", proof.root))?
        .ok_or_else(|| eyre!("Key {} is absent from trie {}", to_hex(&proof.key), proof.root))?;

    println!("{}", "Proof valid".green().bold());
    println!("  root:  {}", proof.root);
    println!("  key:   {}", to_hex(&proof.key));
    println!("  value: {}", display_value(&value));
    if let Ok(receipt) = ReceiptSummary::decode(&value) {
        print_receipt(&receipt);
    }
    Ok(())
}

pub fn prove(args: ProveArgs) -> eyre::Result<()> {
    let key = parse_hex(&args.key).wrap_err("Invalid --key")?;
    let entries = read_entries(&args.entries)?;

    let mut trie = TrieBuilder::keccak();
    for entry in &entries {
        trie.insert(&entry.key, &entry.value)
            .wrap_err_with(|| format!("Failed to insert key {}", to_hex(&entry.key)))?;
    }
    let proof = ProofFile {
        root: trie.root_hash(),
        proof: trie.proof(&key),
        key,
    };
    if proof.verify()?.is_none() {
        bail!(
            "Key {} is not one of the {} entries",
            to_hex(&proof.key),
            entries.len()
        );
    }

    match args.out {
        Some(path) => {
            proof.write(&path)?;
            println!(
                "{}",
                format!("Wrote proof of {} nodes to {}", proof.proof.len(), path.display()).green()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&proof)?),
    }
    Ok(())
}

pub fn address(args: AddressArgs) -> eyre::Result<()> {
    let proof = ProofFile::read(&args.proof)?;
    let (address, bump) = find_proof_address(proof.root.as_bytes());
    let size = proof_size(&proof.proof);
    let chunks = chunk_proof(&proof.proof, args.chunk_bytes);

    println!("proof account: {}", address.to_string().bold());
    println!("bump:          {bump}");
    println!("proof size:    {size} bytes");
    println!("account size:  {} bytes", HEADER_LEN + size);
    if size > MAX_PROOF_SIZE {
        println!(
            "{}",
            format!("proof exceeds the {MAX_PROOF_SIZE} byte limit of one account").red()
        );
    }
    println!("appends:       {}", chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let merge = if chunk.is_merge { " (merge)" } else { "" };
        println!(
            "  #{index}: {} nodes, {} bytes{merge}",
            chunk.nodes.len(),
            chunk.payload_len()
        );
    }
    Ok(())
}

fn display_value(value: &[u8]) -> String {
    if value.len() <= MAX_DISPLAYED_VALUE {
        to_hex(value)
    } else {
        format!(
            "{}... ({} bytes)",
            to_hex(&value[..MAX_DISPLAYED_VALUE]),
            value.len()
        )
    }
}

pub fn print_receipt(receipt: &ReceiptSummary) {
    let kind = receipt
        .tx_type
        .map_or_else(|| "legacy".to_string(), |ty| format!("type {ty}"));
    let status = if receipt.succeeded() {
        "success".green()
    } else {
        "failed".red()
    };
    println!(
        "  receipt: {kind}, status {status}, cumulative gas {}, {} logs",
        receipt.cumulative_gas_used, receipt.log_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof_file::{write_json, Entry};
    use pretty_assertions::assert_eq;

    fn entries() -> Vec<Entry> {
        (0..16u8)
            .map(|i| Entry {
                key: vec![0x80 + i],
                value: vec![i; 33],
            })
            .collect()
    }

    #[test]
    fn prove_writes_a_verifiable_file() {
        let dir = tempfile::tempdir().unwrap();
        let entries_path = dir.path().join("entries.json");
        write_json(&entries_path, &entries()).unwrap();
        let out = dir.path().join("proof.json");

        prove(ProveArgs {
            entries: entries_path,
            key: "0x85".into(),
            out: Some(out.clone()),
        })
        .unwrap();

        let proof = ProofFile::read(&out).unwrap();
        assert_eq!(proof.verify().unwrap(), Some(vec![5; 33]));
        verify(VerifyArgs { proof: out.clone() }).unwrap();
        address(AddressArgs {
            proof: out,
            chunk_bytes: 64,
        })
        .unwrap();
    }

    #[test]
    fn prove_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let entries_path = dir.path().join("entries.json");
        write_json(&entries_path, &entries()).unwrap();

        let err = prove(ProveArgs {
            entries: entries_path,
            key: "0x01".into(),
            out: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("is not one of the 16 entries"), "{err:#}");
    }

    #[test]
    fn verify_reports_tampered_proofs() {
        let dir = tempfile::tempdir().unwrap();
        let mut trie = TrieBuilder::keccak();
        for entry in entries() {
            trie.insert(&entry.key, &entry.value).unwrap();
        }
        let mut proof = ProofFile {
            root: trie.root_hash(),
            key: vec![0x83],
            proof: trie.proof(&[0x83]),
        };
        proof.proof[0][3] ^= 1;
        let path = dir.path().join("proof.json");
        proof.write(&path).unwrap();

        let err = verify(VerifyArgs { proof: path }).unwrap_err();
        assert!(err.to_string().contains("does not verify"), "{err:#}");
    }

    #[test]
    fn long_values_are_truncated() {
        assert_eq!(display_value(&[0xab, 0xcd]), "0xabcd");
        let long = display_value(&[1; 300]);
        assert!(long.ends_with("... (300 bytes)"));
    }
}
