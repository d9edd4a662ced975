use mpt_trie::{NodeHasher, H256};

/// Keccak-256 backed by the `sol_keccak256` syscall on chain and by `sha3` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolanaKeccak;

impl NodeHasher for SolanaKeccak {
    #[cfg(target_os = "solana")]
    fn hash(&self, data: &[u8]) -> H256 {
        let mut hash = [0u8; 32];
        let vals = [data];
        // SAFETY: `vals` is a live slice of byte slices, the layout the syscall expects, and
        // `hash` has room for the 32 byte digest.
        unsafe {
            pinocchio::syscalls::sol_keccak256(vals.as_ptr().cast(), 1, hash.as_mut_ptr());
        }
        H256(hash)
    }

    #[cfg(not(target_os = "solana"))]
    fn hash(&self, data: &[u8]) -> H256 {
        mpt_trie::Keccak256.hash(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpt_trie::EMPTY_ROOT;

    #[test]
    fn hashes_like_keccak() {
        assert_eq!(SolanaKeccak.hash(&[0x80]), EMPTY_ROOT);
    }
}
