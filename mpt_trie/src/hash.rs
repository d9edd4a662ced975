use core::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use crate::{TrieError, TrieResult};

/// Nodes whose RLP encoding is at least this long are referenced by hash instead of inlined.
pub const HASH_LENGTH: usize = 32;

/// Root of a trie with no entries, `keccak256(rlp(""))`.
pub const EMPTY_ROOT: H256 = H256([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

/// A 32 byte keccak hash.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct H256(pub [u8; HASH_LENGTH]);

impl H256 {
    #[must_use]
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> TrieResult<Self> {
        <[u8; HASH_LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| TrieError::InvalidHashLength(bytes.len()))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; HASH_LENGTH] {
        self.0
    }
}

impl From<[u8; HASH_LENGTH]> for H256 {
    fn from(value: [u8; HASH_LENGTH]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for H256 {
    type Err = TrieError;

    /// Parses a hex string, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut bytes = [0u8; HASH_LENGTH];
        if digits.len() != HASH_LENGTH * 2 {
            return Err(TrieError::InvalidHashLength(digits.len() / 2));
        }
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Display for H256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for H256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Hash function used to reference trie nodes.
pub trait NodeHasher {
    fn hash(&self, data: &[u8]) -> H256;
}

impl<T> NodeHasher for &T
where
    T: NodeHasher + ?Sized,
{
    fn hash(&self, data: &[u8]) -> H256 {
        (**self).hash(data)
    }
}

/// Software keccak-256 backed by the `sha3` crate.
#[cfg(feature = "sha3")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak256;

#[cfg(feature = "sha3")]
impl NodeHasher for Keccak256 {
    fn hash(&self, data: &[u8]) -> H256 {
        use sha3::Digest;

        let digest = sha3::Keccak256::digest(data);
        let mut out = [0u8; HASH_LENGTH];
        out.copy_from_slice(&digest);
        H256(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn parses_prefixed_and_bare_hex() {
        let bare = "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421";
        let prefixed = "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421";
        assert_eq!(H256::from_str(bare).unwrap(), EMPTY_ROOT);
        assert_eq!(H256::from_str(prefixed).unwrap(), EMPTY_ROOT);
        assert_eq!(EMPTY_ROOT.to_string(), prefixed);
    }

    #[test]
    fn rejects_short_hashes() {
        assert_eq!(
            H256::from_str("0xabcd"),
            Err(TrieError::InvalidHashLength(2))
        );
        assert_eq!(
            H256::from_slice(&[1, 2, 3]),
            Err(TrieError::InvalidHashLength(3))
        );
    }

    #[cfg(feature = "sha3")]
    #[test]
    fn keccak_of_empty_rlp_string_is_empty_root() {
        assert_eq!(Keccak256.hash(&[0x80]), EMPTY_ROOT);
    }
}
