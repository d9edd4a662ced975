use alloc::vec::Vec;

use rlp::RlpStream;

use crate::{
    hash::{NodeHasher, H256, HASH_LENGTH},
    nibbles::Nibbles,
    node::{empty_children, BranchNode, ExtensionNode, LeafNode, Node},
    TrieError, TrieResult,
};

const EMPTY_NODE: [u8; 1] = [0x80];

/// An in-memory trie used to compute roots and produce proofs.
///
/// Only insertion is supported; the verifier side never needs mutation.
#[derive(Debug, Clone)]
pub struct TrieBuilder<H> {
    hasher: H,
    root: Node,
    len: usize,
}

impl<H> TrieBuilder<H>
where
    H: NodeHasher,
{
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            root: Node::Empty,
            len: 0,
        }
    }

    /// Number of inserts performed, including overwrites.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `value` under `key`, replacing any previous value.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> TrieResult<()> {
        if value.is_empty() {
            return Err(TrieError::EmptyValue);
        }
        let root = core::mem::take(&mut self.root);
        self.root = insert_at(root, Nibbles::from_raw(key, true), value.to_vec())?;
        self.len += 1;
        Ok(())
    }

    pub fn root_hash(&self) -> H256 {
        self.hasher.hash(&self.encode(&self.root))
    }

    /// Collects the encoded nodes on the path to `key`, root first.
    ///
    /// The result proves inclusion when `key` is present and absence otherwise.
    pub fn proof(&self, key: &[u8]) -> Vec<Vec<u8>> {
        let path = Nibbles::from_raw(key, true);
        let mut proof = Vec::new();
        let mut node = &self.root;
        let mut path_index = 0;

        loop {
            let encoded = self.encode(node);
            if proof.is_empty() || encoded.len() >= HASH_LENGTH {
                proof.push(encoded);
            }

            let partial = path.offset(path_index);
            match node {
                Node::Branch(branch) if !partial.is_terminal() => {
                    node = &branch.children[partial.at(0)];
                    path_index += 1;
                }
                Node::Extension(extension)
                    if partial.common_prefix(&extension.prefix) == extension.prefix.len() =>
                {
                    path_index += extension.prefix.len();
                    node = &extension.child;
                }
                _ => break,
            }
        }

        proof
    }

    fn encode(&self, node: &Node) -> Vec<u8> {
        match node {
            Node::Empty => EMPTY_NODE.to_vec(),
            Node::Leaf(leaf) => {
                let mut stream = RlpStream::new_list(2);
                stream.append(&leaf.key.encode_compact());
                stream.append(&leaf.value);
                stream.out().to_vec()
            }
            Node::Extension(extension) => {
                let mut stream = RlpStream::new_list(2);
                stream.append(&extension.prefix.encode_compact());
                stream.append_raw(&self.reference(&extension.child), 1);
                stream.out().to_vec()
            }
            Node::Branch(branch) => {
                let mut stream = RlpStream::new_list(17);
                for child in &branch.children {
                    stream.append_raw(&self.reference(child), 1);
                }
                match &branch.value {
                    Some(value) => stream.append(value),
                    None => stream.append_empty_data(),
                };
                stream.out().to_vec()
            }
            Node::Hash(hash) => rlp::encode(&hash.as_bytes().to_vec()).to_vec(),
        }
    }

    /// How a parent refers to `node`: inline when short, by hash otherwise.
    fn reference(&self, node: &Node) -> Vec<u8> {
        let encoded = self.encode(node);
        if encoded.len() < HASH_LENGTH {
            encoded
        } else {
            rlp::encode(&self.hasher.hash(&encoded).as_bytes().to_vec()).to_vec()
        }
    }
}

#[cfg(feature = "sha3")]
impl TrieBuilder<crate::Keccak256> {
    #[must_use]
    pub fn keccak() -> Self {
        Self::new(crate::Keccak256)
    }
}

fn insert_at(node: Node, partial: Nibbles, value: Vec<u8>) -> TrieResult<Node> {
    match node {
        Node::Empty => Ok(Node::from_leaf(partial, value)),
        Node::Leaf(leaf) => {
            let LeafNode {
                key,
                value: existing,
            } = *leaf;
            let matched = key.common_prefix(&partial);
            if matched == key.len() && matched == partial.len() {
                return Ok(Node::from_leaf(key, value));
            }

            // Both paths end in the terminator, so neither is exhausted before `matched`.
            let mut children = empty_children();
            let mut branch_value = None;
            place(&mut children, &mut branch_value, &key, matched, existing);
            place(&mut children, &mut branch_value, &partial, matched, value);
            Ok(with_prefix(
                &partial,
                matched,
                Node::from_branch(children, branch_value),
            ))
        }
        Node::Extension(extension) => {
            let ExtensionNode { prefix, child } = *extension;
            let matched = prefix.common_prefix(&partial);
            if matched == prefix.len() {
                let child = insert_at(child, partial.offset(matched), value)?;
                return Ok(Node::from_extension(prefix, child));
            }

            let mut children = empty_children();
            let mut branch_value = None;
            let remainder = prefix.offset(matched + 1);
            children[prefix.at(matched)] = if remainder.is_empty() {
                child
            } else {
                Node::from_extension(remainder, child)
            };
            place(&mut children, &mut branch_value, &partial, matched, value);
            Ok(with_prefix(
                &partial,
                matched,
                Node::from_branch(children, branch_value),
            ))
        }
        Node::Branch(mut branch) => {
            if partial.is_terminal() {
                branch.value = Some(value);
            } else {
                let BranchNode { children, .. } = branch.as_mut();
                let index = partial.at(0);
                let child = core::mem::take(&mut children[index]);
                children[index] = insert_at(child, partial.offset(1), value)?;
            }
            Ok(Node::Branch(branch))
        }
        // Built tries are fully materialized.
        Node::Hash(_) => Err(TrieError::InvalidData),
    }
}

fn place(
    children: &mut [Node; 16],
    branch_value: &mut Option<Vec<u8>>,
    path: &Nibbles,
    matched: usize,
    value: Vec<u8>,
) {
    let rest = path.offset(matched);
    if rest.is_terminal() {
        *branch_value = Some(value);
    } else {
        children[rest.at(0)] = Node::from_leaf(rest.offset(1), value);
    }
}

fn with_prefix(path: &Nibbles, matched: usize, node: Node) -> Node {
    if matched == 0 {
        node
    } else {
        Node::from_extension(path.slice(0, matched), node)
    }
}
