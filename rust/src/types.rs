//! Core types and data structures for BPlusTree.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree implementation.

use crate::compact_arena::CompactArena;
use std::marker::PhantomData;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest fan-out that still supports both split and merge.
pub(crate) const MIN_FANOUT: usize = 3;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Marks an absent parent or an absent next leaf.
pub const NULL_NODE: NodeId = u32::MAX;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Ordered set backed by a B+ tree with separate leaf and branch node kinds.
///
/// Values live only in leaves; branches hold routing keys that are copies of
/// the smallest value of the subtree to their right. Leaves hold up to `M-1`
/// values and branches up to `N-1` keys, where `M` and `N` are the leaf and
/// branch fan-outs chosen at construction.
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut tree = BPlusTree::new(4, 4).unwrap();
/// for value in [1, 2, 3, 4] {
///     assert!(tree.insert(value));
/// }
///
/// assert!(tree.search(&3));
/// assert!(!tree.search(&5));
/// assert_eq!(tree.levels(), vec![vec![vec![3]], vec![vec![1, 2], vec![3, 4]]]);
///
/// assert!(tree.delete(&1));
/// assert!(!tree.search(&1));
/// ```
///
/// # Performance Characteristics
///
/// - **Insertion**: O(log n)
/// - **Lookup**: O(log n)
/// - **Deletion**: O(log n)
/// - **Range queries**: O(log n + k) where k is the number of values in range
#[derive(Debug)]
pub struct BPlusTree<T> {
    /// Leaf fan-out `M`: a leaf holds at most `M-1` values.
    pub(crate) leaf_fanout: usize,
    /// Branch fan-out `N`: a branch holds at most `N-1` keys and `N` children.
    pub(crate) branch_fanout: usize,
    /// The root node, absent while the tree is empty.
    pub(crate) root: Option<NodeRef<T>>,
    /// Number of values stored in the leaves.
    pub(crate) len: usize,
    pub(crate) leaf_arena: CompactArena<LeafNode<T>>,
    pub(crate) branch_arena: CompactArena<BranchNode<T>>,
}

/// Leaf node holding data values.
///
/// Outside the tree a leaf only changes through its checked operations;
/// the unchecked rebalancing helpers are not part of the public API.
///
/// ```compile_fail
/// use bplus_index::LeafNode;
///
/// let mut leaf = LeafNode::new(4);
/// leaf.accept_from_right(5);
/// ```
#[derive(Debug, Clone)]
pub struct LeafNode<T> {
    /// Leaf fan-out this node was created with.
    pub(crate) fanout: usize,
    /// Sorted values.
    pub(crate) values: Vec<T>,
    /// Owning branch, `NULL_NODE` at the root.
    pub(crate) parent: NodeId,
    /// Right sibling in the leaf chain.
    pub(crate) next: NodeId,
}

/// Internal (branch) node containing routing keys and child references.
#[derive(Debug, Clone)]
pub struct BranchNode<T> {
    /// Branch fan-out this node was created with.
    pub(crate) fanout: usize,
    /// Sorted routing keys.
    pub(crate) keys: Vec<T>,
    /// Child nodes, always one more than keys.
    pub(crate) children: Vec<NodeRef<T>>,
    /// Owning branch, `NULL_NODE` at the root.
    pub(crate) parent: NodeId,
}

// ============================================================================
// ENUMS AND RESULT TYPES
// ============================================================================

/// Node reference that can be either a leaf or branch node
#[derive(Debug, PartialEq, Eq)]
pub enum NodeRef<T> {
    Leaf(NodeId, PhantomData<T>),
    Branch(NodeId, PhantomData<T>),
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<T> {}

impl<T> NodeRef<T> {
    pub(crate) fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub(crate) fn branch(id: NodeId) -> Self {
        NodeRef::Branch(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Branch(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}

/// Which sibling a redistribution or merge used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sibling {
    Left,
    Right,
}

/// Outcome of rebalancing an underfull node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rebalance {
    /// One element moved across the boundary with a sibling.
    Redistributed(Sibling),
    /// The node and a sibling were folded together.
    Merged(Sibling),
}
