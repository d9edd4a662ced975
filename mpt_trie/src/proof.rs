use alloc::{collections::BTreeMap, vec::Vec};

use crate::{
    hash::{NodeHasher, H256, HASH_LENGTH},
    nibbles::Nibbles,
    node::Node,
    TrieError, TrieResult,
};

/// The nodes of a proof, keyed by their hash.
#[derive(Debug, Default, Clone)]
pub struct ProofDb {
    nodes: BTreeMap<H256, Vec<u8>>,
}

impl ProofDb {
    /// Indexes the proof nodes that can be referenced by hash.
    ///
    /// Nodes shorter than [`HASH_LENGTH`] are inlined in their parent, so only the root and
    /// nodes at least that long are kept.
    pub fn from_proof<H, I, P>(hasher: &H, root_hash: H256, proof: I) -> Self
    where
        H: NodeHasher + ?Sized,
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut nodes = BTreeMap::new();
        for node_encoded in proof {
            let node_encoded = node_encoded.as_ref();
            let hash = hasher.hash(node_encoded);
            if hash == root_hash || node_encoded.len() >= HASH_LENGTH {
                nodes.insert(hash, node_encoded.to_vec());
            }
        }
        Self { nodes }
    }

    #[must_use]
    pub fn get(&self, hash: &H256) -> Option<&[u8]> {
        self.nodes.get(hash).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A read-only view of a trie backed only by the nodes of a proof.
#[derive(Debug, Clone)]
pub struct ProofTrie {
    root_hash: H256,
    db: ProofDb,
}

impl ProofTrie {
    #[must_use]
    pub fn new(root_hash: H256, db: ProofDb) -> Self {
        Self { root_hash, db }
    }

    #[must_use]
    pub fn root_hash(&self) -> H256 {
        self.root_hash
    }

    /// Looks up `key`. Fails with [`TrieError::MissingTrieNode`] when the walk reaches a node
    /// the proof does not contain.
    pub fn get(&self, key: &[u8]) -> TrieResult<Option<Vec<u8>>> {
        let path = Nibbles::from_raw(key, true);
        self.get_at(&path).map_err(|err| match err {
            TrieError::MissingTrieNode {
                node_hash,
                traversed,
                root_hash,
                err_key: _,
            } => TrieError::MissingTrieNode {
                node_hash,
                traversed,
                root_hash,
                err_key: Some(key.to_vec()),
            },
            other => other,
        })
    }

    // Iterative so the walk does not grow the (small) on-chain stack.
    fn get_at(&self, path: &Nibbles) -> TrieResult<Option<Vec<u8>>> {
        let mut node = Node::from_hash(self.root_hash);
        let mut path_index = 0;

        loop {
            let partial = path.offset(path_index);
            match node {
                Node::Empty => return Ok(None),
                Node::Leaf(leaf) => {
                    return if leaf.key == partial {
                        Ok(Some(leaf.value))
                    } else {
                        Ok(None)
                    };
                }
                Node::Branch(mut branch) => {
                    if partial.is_terminal() {
                        return Ok(branch.value);
                    }
                    node = core::mem::take(&mut branch.children[partial.at(0)]);
                    path_index += 1;
                }
                Node::Extension(extension) => {
                    let match_len = partial.common_prefix(&extension.prefix);
                    if match_len != extension.prefix.len() {
                        return Ok(None);
                    }
                    path_index += match_len;
                    node = extension.child;
                }
                Node::Hash(node_hash) => {
                    node = self.recover_from_db(node_hash)?.ok_or_else(|| {
                        TrieError::MissingTrieNode {
                            node_hash,
                            traversed: Some(path.slice(0, path_index)),
                            root_hash: Some(self.root_hash),
                            err_key: None,
                        }
                    })?;
                }
            }
        }
    }

    fn recover_from_db(&self, hash: H256) -> TrieResult<Option<Node>> {
        let Some(encoded) = self.db.get(&hash) else {
            return Ok(None);
        };
        match Node::decode(encoded)? {
            // A stored node is never a bare reference to another node.
            Node::Hash(_) => Err(TrieError::InvalidData),
            node => Ok(Some(node)),
        }
    }
}

/// Verifies that `proof` proves the value stored under `key` in the trie with `root_hash`.
///
/// Returns `Ok(Some(value))` for a proven inclusion and `Ok(None)` for a proven absence. A
/// proof that is missing nodes or contains undecodable nodes is [`TrieError::InvalidProof`].
pub fn verify_proof<H, I, P>(
    hasher: &H,
    root_hash: H256,
    key: &[u8],
    proof: I,
) -> TrieResult<Option<Vec<u8>>>
where
    H: NodeHasher + ?Sized,
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let db = ProofDb::from_proof(hasher, root_hash, proof);
    ProofTrie::new(root_hash, db)
        .get(key)
        .map_err(|_| TrieError::InvalidProof)
}

#[cfg(all(test, feature = "sha3"))]
mod tests {
    use super::*;
    use crate::{Keccak256, TrieBuilder, EMPTY_ROOT};
    use alloc::{format, vec, vec::Vec};
    use pretty_assertions::assert_eq;

    fn receipt_key(index: u64) -> Vec<u8> {
        rlp::encode(&index).to_vec()
    }

    fn populated_trie(count: u64) -> TrieBuilder<Keccak256> {
        let mut trie = TrieBuilder::new(Keccak256);
        for index in 0..count {
            let value = format!("receipt-{index:04}-padding-to-make-nodes-hashed");
            trie.insert(&receipt_key(index), value.as_bytes()).unwrap();
        }
        trie
    }

    #[test]
    fn proves_every_inserted_key() {
        let trie = populated_trie(64);
        let root = trie.root_hash();
        for index in 0..64 {
            let key = receipt_key(index);
            let proof = trie.proof(&key);
            let value = verify_proof(&Keccak256, root, &key, &proof).unwrap();
            let expected = format!("receipt-{index:04}-padding-to-make-nodes-hashed");
            assert_eq!(value.as_deref(), Some(expected.as_bytes()));
        }
    }

    #[test]
    fn proves_absence() {
        let trie = populated_trie(16);
        let key = receipt_key(1_000);
        let proof = trie.proof(&key);
        assert_eq!(
            verify_proof(&Keccak256, trie.root_hash(), &key, &proof),
            Ok(None)
        );
    }

    #[test]
    fn empty_trie_proves_nothing() {
        assert_eq!(
            verify_proof(&Keccak256, EMPTY_ROOT, b"anything", [vec![0x80u8]]),
            Ok(None)
        );
    }

    #[test]
    fn truncated_proof_is_invalid() {
        let trie = populated_trie(64);
        let key = receipt_key(42);
        let mut proof = trie.proof(&key);
        assert!(proof.len() > 1, "expected a multi level proof");
        proof.pop();
        assert_eq!(
            verify_proof(&Keccak256, trie.root_hash(), &key, &proof),
            Err(TrieError::InvalidProof)
        );
    }

    #[test]
    fn tampered_proof_is_invalid() {
        let trie = populated_trie(64);
        let key = receipt_key(7);
        let mut proof = trie.proof(&key);
        let last = proof.last_mut().unwrap();
        let end = last.len() - 1;
        last[end] ^= 0xff;
        assert_eq!(
            verify_proof(&Keccak256, trie.root_hash(), &key, &proof),
            Err(TrieError::InvalidProof)
        );
    }

    #[test]
    fn wrong_root_is_invalid() {
        let trie = populated_trie(8);
        let key = receipt_key(3);
        let proof = trie.proof(&key);
        assert_eq!(
            verify_proof(&Keccak256, H256([9; 32]), &key, &proof),
            Err(TrieError::InvalidProof)
        );
    }

    #[test]
    fn missing_node_reports_key_and_path() {
        let trie = populated_trie(64);
        let key = receipt_key(42);
        let mut proof = trie.proof(&key);
        proof.pop();
        let db = ProofDb::from_proof(&Keccak256, trie.root_hash(), &proof);
        let err = ProofTrie::new(trie.root_hash(), db).get(&key).unwrap_err();
        match err {
            TrieError::MissingTrieNode {
                root_hash, err_key, ..
            } => {
                assert_eq!(root_hash, Some(trie.root_hash()));
                assert_eq!(err_key, Some(key));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
