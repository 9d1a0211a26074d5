//! GET operations for BPlusTree.
//!
//! This module contains the read operations of the tree (membership search
//! and the routing walk it is built on) together with the arena access
//! helpers the modifying operations share.

use crate::error::{BPlusTreeError, BTreeResult, TreeResult};
use crate::macros::arena_accessors;
use crate::types::{BPlusTree, BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};
use log::{error, trace};

arena_accessors! {
    leaf => LeafNode in leaf_arena,
    branch => BranchNode in branch_arena,
}

impl<T: Ord + Clone> BPlusTree<T> {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Returns true if the value is stored in the tree.
    ///
    /// Routes from the root through the branches to the single leaf that could
    /// hold the value and checks that leaf's values.
    ///
    /// # Panics
    ///
    /// Panics if routing reaches a node that is not in the arenas. Use
    /// [`try_search`](Self::try_search) to receive the error instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4, 4).unwrap();
    /// tree.insert(10);
    /// assert!(tree.search(&10));
    /// assert!(!tree.search(&11));
    /// ```
    pub fn search(&self, value: &T) -> bool {
        match self.try_search(value) {
            Ok(found) => found,
            Err(e) => {
                error!("search found the tree inconsistent: {}", e);
                panic!("B+ tree search failed: {}", e);
            }
        }
    }

    /// Alias for [`search`](Self::search).
    pub fn contains(&self, value: &T) -> bool {
        self.search(value)
    }

    /// Search that reports a structurally broken tree instead of answering `false`.
    pub fn try_search(&self, value: &T) -> BTreeResult<bool> {
        match self.find_leaf(value)? {
            Some(leaf_id) => Ok(self.leaf_ref(leaf_id)?.contains(value)),
            None => Ok(false),
        }
    }

    // ============================================================================
    // ROUTING
    // ============================================================================

    /// Find the leaf whose key range covers `value`, or `None` for an empty tree.
    pub(crate) fn find_leaf(&self, value: &T) -> TreeResult<Option<NodeId>> {
        let Some(mut current) = self.root else {
            return Ok(None);
        };

        loop {
            match current {
                NodeRef::Leaf(leaf_id, _) => return Ok(Some(leaf_id)),
                NodeRef::Branch(branch_id, _) => {
                    let branch = self.branch_ref(branch_id)?;
                    let child_index = branch.find_child_index(value);
                    trace!("branch {} routes to child {}", branch_id, child_index);
                    current = *branch.children.get(child_index).ok_or_else(|| {
                        BPlusTreeError::corrupted_tree(
                            "Routing",
                            &format!("branch {} has no child {}", branch_id, child_index),
                        )
                    })?;
                }
            }
        }
    }
}

impl<T> BPlusTree<T> {
    // ============================================================================
    // TREE NAVIGATION HELPERS
    // ============================================================================

    /// Leftmost leaf under `node`.
    pub(crate) fn leftmost_leaf(&self, node: NodeRef<T>) -> TreeResult<NodeId> {
        self.descend(node, |branch| branch.children.first())
    }

    /// Rightmost leaf under `node`.
    pub(crate) fn rightmost_leaf(&self, node: NodeRef<T>) -> TreeResult<NodeId> {
        self.descend(node, |branch| branch.children.last())
    }

    fn descend<F>(&self, mut current: NodeRef<T>, pick: F) -> TreeResult<NodeId>
    where
        F: Fn(&BranchNode<T>) -> Option<&NodeRef<T>>,
    {
        loop {
            match current {
                NodeRef::Leaf(leaf_id, _) => return Ok(leaf_id),
                NodeRef::Branch(branch_id, _) => {
                    current = *pick(self.branch_ref(branch_id)?).ok_or_else(|| {
                        BPlusTreeError::corrupted_tree(
                            "Branch",
                            &format!("branch {} has no children", branch_id),
                        )
                    })?;
                }
            }
        }
    }

    /// Get the ID of the first (leftmost) leaf in the tree
    pub fn get_first_leaf_id(&self) -> Option<NodeId> {
        self.root.and_then(|root| self.leftmost_leaf(root).ok())
    }

    /// Get the next pointer of a leaf node in the arena.
    pub fn get_leaf_next(&self, id: NodeId) -> Option<NodeId> {
        self.get_leaf(id)
            .and_then(|leaf| (leaf.next != NULL_NODE).then_some(leaf.next))
    }

    // ============================================================================
    // PARENT LINKS
    // ============================================================================

    /// Parent back-reference of any node, `NULL_NODE` for the root.
    pub(crate) fn parent_of(&self, node: NodeRef<T>) -> TreeResult<NodeId> {
        match node {
            NodeRef::Leaf(id, _) => Ok(self.leaf_ref(id)?.parent),
            NodeRef::Branch(id, _) => Ok(self.branch_ref(id)?.parent),
        }
    }

    pub(crate) fn set_parent(&mut self, node: NodeRef<T>, parent: NodeId) -> TreeResult<()> {
        match node {
            NodeRef::Leaf(id, _) => self.leaf_mut(id)?.parent = parent,
            NodeRef::Branch(id, _) => self.branch_mut(id)?.parent = parent,
        }
        Ok(())
    }

    /// Point every child of `branch_id` back at it.
    pub(crate) fn adopt_children(&mut self, branch_id: NodeId) -> TreeResult<()> {
        let children = self.branch_ref(branch_id)?.children.clone();
        for child in children {
            self.set_parent(child, branch_id)?;
        }
        Ok(())
    }
}
