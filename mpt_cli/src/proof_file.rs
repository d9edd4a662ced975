//! JSON files exchanged by the CLI commands.
//!
//! Byte strings are hex with a `0x` prefix; the prefix is optional when reading.
use std::path::Path;

use eyre::WrapErr;
use mpt_trie::{verify_proof, Keccak256, TrieResult, H256};
use serde::{Deserialize, Serialize};

/// A proof of the value stored under `key` in the trie with `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofFile {
    #[serde(with = "hex_h256")]
    pub root: H256,
    #[serde(with = "hex_bytes")]
    pub key: Vec<u8>,
    #[serde(with = "hex_list")]
    pub proof: Vec<Vec<u8>>,
}

impl ProofFile {
    pub fn read(path: &Path) -> eyre::Result<Self> {
        read_json(path)
    }

    pub fn write(&self, path: &Path) -> eyre::Result<()> {
        write_json(path, self)
    }

    pub fn verify(&self) -> TrieResult<Option<Vec<u8>>> {
        verify_proof(&Keccak256, self.root, &self.key, &self.proof)
    }
}

/// One key/value pair to insert into a trie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(with = "hex_bytes")]
    pub key: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

pub fn read_entries(path: &Path) -> eyre::Result<Vec<Entry>> {
    read_json(path)
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> eyre::Result<T> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read `{}`", path.display()))?;
    serde_json::from_str(&json).wrap_err_with(|| format!("Failed to parse `{}`", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> eyre::Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create `{}`", parent.display()))?;
    }
    std::fs::write(path, json).wrap_err_with(|| format!("Failed to write `{}`", path.display()))
}

pub fn parse_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(digits)
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_hex(&value).map_err(D::Error::custom)
    }
}

mod hex_list {
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(list: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(list.len()))?;
        for bytes in list {
            seq.serialize_element(&super::to_hex(bytes))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|value| super::parse_hex(value).map_err(D::Error::custom))
            .collect()
    }
}

mod hex_h256 {
    use mpt_trie::H256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &H256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(hash)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<H256, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}
