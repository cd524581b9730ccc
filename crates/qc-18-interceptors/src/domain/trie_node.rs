//! Intercepted trie nodes.

use super::errors::DataError;
use super::intercepted::InterceptedObject;
use shared_types::{Hash, ShardId, TrieNode, METACHAIN_SHARD_ID, TRIE_BRANCH_WIDTH};

pub struct InterceptedTrieNode {
    node: TrieNode,
    raw: Vec<u8>,
    hash: Hash,
}

impl InterceptedTrieNode {
    pub fn new(node: TrieNode, raw: Vec<u8>, hash: Hash) -> Self {
        Self { node, raw, hash }
    }

    pub fn node(&self) -> &TrieNode {
        &self.node
    }
}

impl InterceptedObject for InterceptedTrieNode {
    fn check_validity(&self) -> Result<(), DataError> {
        match &self.node {
            TrieNode::Leaf { key, .. } | TrieNode::Extension { key, .. } if key.is_empty() => {
                Err(DataError::MissingField("key"))
            }
            TrieNode::Branch { children } => {
                if children.len() != TRIE_BRANCH_WIDTH {
                    return Err(DataError::InvalidField {
                        field: "children",
                        reason: format!("expected {TRIE_BRANCH_WIDTH}, got {}", children.len()),
                    });
                }
                // A branch with a single child collapses into an extension.
                if children.iter().flatten().count() < 2 {
                    return Err(DataError::InvalidField {
                        field: "children",
                        reason: "branch needs at least two children".to_string(),
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Trie nodes are only ever received on request.
    fn is_for_current_shard(&self) -> bool {
        true
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn origin_shard(&self) -> ShardId {
        METACHAIN_SHARD_ID
    }

    fn type_name(&self) -> &'static str {
        "trie node"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node: TrieNode) -> InterceptedTrieNode {
        InterceptedTrieNode::new(node, vec![1], [1u8; 32])
    }

    #[test]
    fn test_leaf_requires_key() {
        let leaf = node(TrieNode::Leaf {
            key: vec![],
            value: vec![1],
        });
        assert_eq!(leaf.check_validity(), Err(DataError::MissingField("key")));
    }

    #[test]
    fn test_branch_width_and_children() {
        let mut children = vec![None; TRIE_BRANCH_WIDTH];
        children[0] = Some([1u8; 32]);
        let single = node(TrieNode::Branch {
            children: children.clone(),
        });
        assert!(single.check_validity().is_err());

        children[3] = Some([2u8; 32]);
        assert!(node(TrieNode::Branch { children }).check_validity().is_ok());

        let narrow = node(TrieNode::Branch {
            children: vec![Some([1u8; 32]); 3],
        });
        assert!(narrow.check_validity().is_err());
    }

    #[test]
    fn test_extension_ok() {
        let ext = node(TrieNode::Extension {
            key: vec![1, 2],
            child: [3u8; 32],
        });
        assert!(ext.check_validity().is_ok());
    }
}
