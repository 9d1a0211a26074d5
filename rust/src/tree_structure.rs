//! Tree structure management operations for BPlusTree.
//!
//! This module contains the tree-level operations that inspect or reset the
//! overall structure: size queries, height, node counting, arena statistics
//! and clearing.

use crate::compact_arena::CompactArenaStats;
use crate::types::{BPlusTree, NodeRef};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<T> BPlusTree<T> {
    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns true if the root is a leaf node (an empty tree has no root).
    pub fn is_leaf_root(&self) -> bool {
        matches!(self.root, Some(NodeRef::Leaf(_, _)))
    }

    /// Leaf fan-out `M` this tree was built with.
    pub fn leaf_fanout(&self) -> usize {
        self.leaf_fanout
    }

    /// Branch fan-out `N` this tree was built with.
    pub fn branch_fanout(&self) -> usize {
        self.branch_fanout
    }

    /// Number of levels from the root down to the leaves; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node) = current {
            height += 1;
            current = match node {
                NodeRef::Leaf(_, _) => None,
                NodeRef::Branch(id, _) => self
                    .get_branch(id)
                    .and_then(|branch| branch.children.first().copied()),
            };
        }
        height
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.count_nodes_in_tree().0
    }

    /// Clear all values from the tree, releasing every node.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.branch_arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Count the number of leaf and branch nodes actually in the tree structure.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        self.root
            .map_or((0, 0), |root| self.count_nodes_recursive(&root))
    }

    /// Recursively count nodes in the tree.
    fn count_nodes_recursive(&self, node: &NodeRef<T>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0),
            NodeRef::Branch(id, _) => {
                if let Some(branch) = self.get_branch(*id) {
                    let mut total_leaves = 0;
                    let mut total_branches = 1; // Count this branch

                    for child in &branch.children {
                        let (child_leaves, child_branches) = self.count_nodes_recursive(child);
                        total_leaves += child_leaves;
                        total_branches += child_branches;
                    }

                    (total_leaves, total_branches)
                } else {
                    // Invalid branch reference
                    (0, 0)
                }
            }
        }
    }

    // ============================================================================
    // ARENA STATISTICS
    // ============================================================================

    /// Allocation statistics of the leaf arena: live nodes, free slots and
    /// utilization.
    pub fn leaf_arena_stats(&self) -> CompactArenaStats {
        self.leaf_arena.stats()
    }

    /// Allocation statistics of the branch arena.
    pub fn branch_arena_stats(&self) -> CompactArenaStats {
        self.branch_arena.stats()
    }
}
