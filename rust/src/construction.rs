//! Construction and initialization logic for BPlusTree and nodes.
//!
//! Fan-outs are fixed when the tree is built and validated here; nodes carry
//! the fan-out of the tree that created them.

use crate::compact_arena::CompactArena;
use crate::error::{BPlusTreeError, BTreeResult, InitResult};
use crate::types::{BPlusTree, BranchNode, LeafNode, MIN_FANOUT, NULL_NODE};

/// Default fan-out for both node kinds
pub const DEFAULT_FANOUT: usize = 16;

impl<T> BPlusTree<T> {
    /// Create an empty B+ tree with the given leaf and branch fan-outs.
    ///
    /// A leaf holds at most `leaf_fanout - 1` values and a branch at most
    /// `branch_fanout - 1` keys. Both must be at least 3.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let tree = BPlusTree::<i32>::new(4, 5).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BPlusTree::<i32>::new(2, 4).is_err());
    /// ```
    pub fn new(leaf_fanout: usize, branch_fanout: usize) -> InitResult<Self> {
        validation::validate_fanout("Leaf", leaf_fanout)?;
        validation::validate_fanout("Branch", branch_fanout)?;

        Ok(Self {
            leaf_fanout,
            branch_fanout,
            root: None,
            len: 0,
            leaf_arena: CompactArena::new(),
            branch_arena: CompactArena::new(),
        })
    }

    /// Create a B+ tree using the same fan-out for leaves and branches.
    pub fn with_fanout(fanout: usize) -> InitResult<Self> {
        Self::new(fanout, fanout)
    }

    /// Create a B+ tree with default fan-out.
    ///
    /// This is equivalent to calling `with_fanout(DEFAULT_FANOUT)`.
    pub fn with_default_fanout() -> InitResult<Self> {
        Self::with_fanout(DEFAULT_FANOUT)
    }
}

impl<T> LeafNode<T> {
    /// Creates a new, unlinked leaf node for the given fan-out.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::LeafNode;
    ///
    /// let leaf: LeafNode<i32> = LeafNode::new(4);
    /// assert_eq!(leaf.capacity(), 3);
    /// ```
    pub fn new(fanout: usize) -> Self {
        Self {
            fanout,
            values: Vec::with_capacity(fanout.saturating_sub(1)),
            parent: NULL_NODE,
            next: NULL_NODE,
        }
    }
}

impl<T> BranchNode<T> {
    /// Creates a new branch node with no keys or children.
    pub fn new(fanout: usize) -> Self {
        Self {
            fanout,
            keys: Vec::with_capacity(fanout.saturating_sub(1)),
            children: Vec::with_capacity(fanout),
            parent: NULL_NODE,
        }
    }
}

// Default implementations
impl<T> Default for BPlusTree<T> {
    /// Create a B+ tree with default fan-out.
    fn default() -> Self {
        Self::with_default_fanout().expect("DEFAULT_FANOUT is a valid fan-out")
    }
}

impl<T> Default for LeafNode<T> {
    fn default() -> Self {
        Self::new(DEFAULT_FANOUT)
    }
}

impl<T> Default for BranchNode<T> {
    fn default() -> Self {
        Self::new(DEFAULT_FANOUT)
    }
}

/// Validation utilities for construction
pub mod validation {
    use super::*;

    /// Validate that a fan-out is suitable for the given node kind.
    pub fn validate_fanout(node_kind: &str, fanout: usize) -> BTreeResult<()> {
        if fanout < MIN_FANOUT {
            Err(BPlusTreeError::invalid_fanout(node_kind, fanout, MIN_FANOUT))
        } else {
            Ok(())
        }
    }

    /// Get the recommended fan-out for a given expected number of elements.
    ///
    /// Always at least `MIN_FANOUT`.
    pub fn recommended_fanout(expected_elements: usize) -> usize {
        if expected_elements < 100 {
            4
        } else if expected_elements < 10_000 {
            16
        } else if expected_elements < 1_000_000 {
            32
        } else {
            64
        }
    }
}
