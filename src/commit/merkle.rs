//! Merkle Tree Commitments
//!
//! Binary Merkle tree using SHA-256 for committing to ordered card
//! collections. Leaves are domain separated from internal nodes.

use sha2::{Sha256, Digest};

use crate::core::hash::StateHash;

/// Domain separator for Merkle tree leaf nodes.
const MERKLE_LEAF_DOMAIN: &[u8] = b"VEILED_DUEL_MERKLE_LEAF_V1";

/// Domain separator for Merkle tree internal nodes.
const MERKLE_NODE_DOMAIN: &[u8] = b"VEILED_DUEL_MERKLE_NODE_V1";

/// Empty hash for padding (hash of empty domain).
fn empty_hash() -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(b"VEILED_DUEL_MERKLE_EMPTY_V1");
    hasher.finalize().into()
}

/// Binary Merkle tree, built eagerly from leaf data.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// Number of real (unpadded) leaves.
    leaf_count: usize,
    /// All tree levels (leaves at index 0, root at last index).
    levels: Vec<Vec<StateHash>>,
}

impl MerkleTree {
    /// Create a Merkle tree from leaf data.
    ///
    /// Each item is hashed with domain separation to form leaves; the leaf
    /// level is padded to a power of two with the empty hash.
    pub fn from_leaves<T: AsRef<[u8]>>(data: &[T]) -> Self {
        let mut current_level: Vec<StateHash> = data.iter()
            .map(|item| hash_leaf(item.as_ref()))
            .collect();

        if current_level.is_empty() {
            return Self { leaf_count: 0, levels: Vec::new() };
        }

        let target_size = current_level.len().next_power_of_two();
        current_level.resize(target_size, empty_hash());

        let mut levels = vec![current_level.clone()];
        while current_level.len() > 1 {
            current_level = current_level.chunks(2)
                .map(|pair| hash_nodes(&pair[0], &pair[1]))
                .collect();
            levels.push(current_level.clone());
        }

        Self { leaf_count: data.len(), levels }
    }

    /// Root hash. The empty tree has the empty hash as root.
    pub fn root(&self) -> StateHash {
        self.levels.last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_else(empty_hash)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }
}

/// Hash leaf data with domain separation.
fn hash_leaf(data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(MERKLE_LEAF_DOMAIN);
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash two child nodes with domain separation.
fn hash_nodes(left: &StateHash, right: &StateHash) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(MERKLE_NODE_DOMAIN);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = MerkleTree::from_leaves::<&[u8]>(&[]);
        assert_eq!(tree.root(), empty_hash());
        assert_eq!(tree.leaf_count(), 0);
    }

    #[test]
    fn test_single_leaf_is_hashed() {
        let tree = MerkleTree::from_leaves(&[b"hello"]);
        assert_eq!(tree.root(), hash_leaf(b"hello"));
    }

    #[test]
    fn test_merkle_root_determinism() {
        let leaves = vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()];

        let tree1 = MerkleTree::from_leaves(&leaves);
        let tree2 = MerkleTree::from_leaves(&leaves);

        assert_eq!(tree1.root(), tree2.root());
    }

    #[test]
    fn test_different_leaves_different_root() {
        let tree1 = MerkleTree::from_leaves(&[b"a", b"b"]);
        let tree2 = MerkleTree::from_leaves(&[b"a", b"c"]);

        assert_ne!(tree1.root(), tree2.root());
    }

    #[test]
    fn test_leaf_order_matters() {
        let tree1 = MerkleTree::from_leaves(&[b"a", b"b"]);
        let tree2 = MerkleTree::from_leaves(&[b"b", b"a"]);

        assert_ne!(tree1.root(), tree2.root());
    }

    #[test]
    fn test_odd_number_of_leaves() {
        let tree = MerkleTree::from_leaves(&[b"a", b"b", b"c"]);
        let expected = hash_nodes(
            &hash_nodes(&hash_leaf(b"a"), &hash_leaf(b"b")),
            &hash_nodes(&hash_leaf(b"c"), &empty_hash()),
        );

        assert_eq!(tree.root(), expected);
        assert_eq!(tree.leaf_count(), 3);
    }
}
