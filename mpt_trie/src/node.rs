use alloc::{boxed::Box, vec::Vec};

use rlp::{Prototype, Rlp};

use crate::{
    hash::{H256, HASH_LENGTH},
    nibbles::Nibbles,
    TrieError, TrieResult,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Node {
    #[default]
    Empty,
    Leaf(Box<LeafNode>),
    Extension(Box<ExtensionNode>),
    Branch(Box<BranchNode>),
    /// Reference to a node that has to be looked up by hash.
    Hash(H256),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub key: Nibbles,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNode {
    pub children: [Node; 16],
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionNode {
    pub prefix: Nibbles,
    pub child: Node,
}

#[must_use]
pub fn empty_children() -> [Node; 16] {
    core::array::from_fn(|_| Node::Empty)
}

impl Node {
    #[must_use]
    pub fn from_leaf(key: Nibbles, value: Vec<u8>) -> Self {
        Node::Leaf(Box::new(LeafNode { key, value }))
    }

    #[must_use]
    pub fn from_branch(children: [Node; 16], value: Option<Vec<u8>>) -> Self {
        Node::Branch(Box::new(BranchNode { children, value }))
    }

    #[must_use]
    pub fn from_extension(prefix: Nibbles, child: Node) -> Self {
        Node::Extension(Box::new(ExtensionNode { prefix, child }))
    }

    #[must_use]
    pub fn from_hash(hash: H256) -> Self {
        Node::Hash(hash)
    }

    /// Decodes an RLP encoded node. Inline children are decoded recursively, hashed children
    /// become [`Node::Hash`] references.
    pub fn decode(data: &[u8]) -> TrieResult<Self> {
        let rlp = Rlp::new(data);

        match rlp.prototype()? {
            Prototype::Data(0) => Ok(Node::Empty),
            Prototype::List(2) => {
                let key = Nibbles::from_compact(rlp.at(0)?.data()?)?;
                if key.is_leaf() {
                    Ok(Node::from_leaf(key, rlp.at(1)?.data()?.to_vec()))
                } else {
                    let child = Self::decode(rlp.at(1)?.as_raw())?;
                    Ok(Node::from_extension(key, child))
                }
            }
            Prototype::List(17) => {
                let mut children = empty_children();
                for (index, child) in children.iter_mut().enumerate() {
                    *child = Self::decode(rlp.at(index)?.as_raw())?;
                }

                // The 17th item is the value stored at the branch itself.
                let value_rlp = rlp.at(16)?;
                let value = if value_rlp.is_empty() {
                    None
                } else {
                    Some(value_rlp.data()?.to_vec())
                };

                Ok(Node::from_branch(children, value))
            }
            Prototype::Data(HASH_LENGTH) => Ok(Node::from_hash(H256::from_slice(rlp.data()?)?)),
            _ => Err(TrieError::InvalidData),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use pretty_assertions::assert_eq;
    use rlp::RlpStream;

    #[test]
    fn decodes_leaf_and_extension_by_key_flag() {
        let mut leaf = RlpStream::new_list(2);
        leaf.append(&vec![0x20u8, 0x0f]);
        leaf.append(&b"value".to_vec());
        let leaf = leaf.out().to_vec();

        assert_eq!(
            Node::decode(&leaf).unwrap(),
            Node::from_leaf(Nibbles::from_hex(&[0, 0xf, 16]), b"value".to_vec())
        );

        let mut extension = RlpStream::new_list(2);
        extension.append(&vec![0x11u8]);
        extension.append_raw(&leaf, 1);
        assert_eq!(
            Node::decode(&extension.out()).unwrap(),
            Node::from_extension(
                Nibbles::from_hex(&[1]),
                Node::from_leaf(Nibbles::from_hex(&[0, 0xf, 16]), b"value".to_vec())
            )
        );
    }

    #[test]
    fn decodes_branch_with_hashed_child() {
        let child_hash = [7u8; HASH_LENGTH];
        let mut branch = RlpStream::new_list(17);
        branch.append(&child_hash.to_vec());
        for _ in 1..16 {
            branch.append_empty_data();
        }
        branch.append(&b"here".to_vec());

        let Node::Branch(decoded) = Node::decode(&branch.out()).unwrap() else {
            panic!("expected a branch");
        };
        assert_eq!(decoded.children[0], Node::Hash(H256(child_hash)));
        assert!(decoded.children[1..].iter().all(|c| *c == Node::Empty));
        assert_eq!(decoded.value.as_deref(), Some(&b"here"[..]));
    }

    #[test]
    fn rejects_other_shapes() {
        let mut list = RlpStream::new_list(3);
        list.append_empty_data();
        list.append_empty_data();
        list.append_empty_data();
        assert_eq!(Node::decode(&list.out()), Err(TrieError::InvalidData));
        assert_eq!(Node::decode(&[0x83, 1, 2, 3]), Err(TrieError::InvalidData));
    }
}
