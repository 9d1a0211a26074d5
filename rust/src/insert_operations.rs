//! INSERT operations for BPlusTree.
//!
//! This module contains the insertion driver: routing to the target leaf,
//! splitting a full leaf before inserting into it, linking promoted keys into
//! the parent (splitting ancestors and growing a new root as needed), and
//! re-synchronizing ancestor routing keys afterwards.

use crate::error::{BPlusTreeError, BTreeResultExt, ModifyResult, TreeResult};
use crate::types::{BPlusTree, BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};
use log::{debug, error};

impl<T: Ord + Clone> BPlusTree<T> {
    // ============================================================================
    // PUBLIC INSERT OPERATIONS
    // ============================================================================

    /// Insert a value into the tree.
    ///
    /// Returns `true` if the value was added and `false` if it was already
    /// present, in which case the tree is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the tree structure is found to be corrupted while inserting.
    /// Use [`try_insert`](Self::try_insert) to receive the error instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4, 4).unwrap();
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        match self.insert_value(value) {
            Ok(inserted) => inserted,
            Err(e) => {
                error!("insert left the tree inconsistent: {}", e);
                panic!("B+ tree insert failed: {}", e);
            }
        }
    }

    /// Insert with full invariant checking before and after the operation.
    pub fn try_insert(&mut self, value: T) -> ModifyResult<bool> {
        self.check_invariants_detailed().with_operation("insert")?;
        let inserted = self.insert_value(value).with_operation("insert")?;
        self.check_invariants_detailed().with_operation("insert")?;
        Ok(inserted)
    }

    // ============================================================================
    // INSERT DRIVER
    // ============================================================================

    pub(crate) fn insert_value(&mut self, value: T) -> TreeResult<bool> {
        let Some(mut leaf_id) = self.find_leaf(&value)? else {
            let mut leaf = LeafNode::new(self.leaf_fanout);
            leaf.insert(value)?;
            let root_id = self.allocate_leaf(leaf)?;
            self.root = Some(NodeRef::leaf(root_id));
            self.len = 1;
            debug!("created root leaf {}", root_id);
            return Ok(true);
        };

        let leaf = self.leaf_ref(leaf_id)?;
        if leaf.contains(&value) {
            return Ok(false);
        }

        if leaf.is_full() {
            let (sibling_id, separator) = self.split_leaf(leaf_id)?;
            if value >= separator {
                leaf_id = sibling_id;
            }
        }

        self.leaf_mut(leaf_id)?.insert(value)?;
        self.len += 1;
        self.update_keys(leaf_id)?;
        Ok(true)
    }

    // ============================================================================
    // SPLITTING
    // ============================================================================

    /// Split a full leaf and link the new right sibling into the tree.
    ///
    /// Returns the sibling's id and the separator that now precedes it in its
    /// parent.
    pub(crate) fn split_leaf(&mut self, leaf_id: NodeId) -> TreeResult<(NodeId, T)> {
        let (sibling, separator) = self.leaf_mut(leaf_id)?.split()?;
        let sibling_id = self.allocate_leaf(sibling)?;
        self.leaf_mut(leaf_id)?.next = sibling_id;
        debug!("split leaf {} into {} + {}", leaf_id, leaf_id, sibling_id);

        self.insert_into_parent(
            NodeRef::leaf(leaf_id),
            separator.clone(),
            NodeRef::leaf(sibling_id),
        )?;
        Ok((sibling_id, separator))
    }

    /// Link `right`, the new sibling of `left`, into `left`'s parent under `key`.
    ///
    /// A full parent is split while placing the pair and the promotion recurses
    /// upward; when `left` is the root a new root branch is created.
    fn insert_into_parent(
        &mut self,
        left: NodeRef<T>,
        key: T,
        right: NodeRef<T>,
    ) -> TreeResult<()> {
        let parent_id = self.parent_of(left)?;

        if parent_id == NULL_NODE {
            let mut root = BranchNode::new(self.branch_fanout);
            root.keys.push(key);
            root.children.push(left);
            root.children.push(right);
            let root_id = self.allocate_branch(root)?;
            self.set_parent(left, root_id)?;
            self.set_parent(right, root_id)?;
            self.root = Some(NodeRef::branch(root_id));
            debug!("tree grew a new root {}, height {}", root_id, self.height());
            return Ok(());
        }

        self.set_parent(right, parent_id)?;
        if !self.branch_ref(parent_id)?.is_full() {
            self.branch_mut(parent_id)?.insert_child(key, right)?;
            return Ok(());
        }

        let (sibling, promoted) = self.branch_mut(parent_id)?.split_with(key, right)?;
        let sibling_id = self.allocate_branch(sibling)?;
        self.adopt_children(sibling_id)?;
        debug!("split branch {} into {} + {}", parent_id, parent_id, sibling_id);

        self.insert_into_parent(
            NodeRef::branch(parent_id),
            promoted,
            NodeRef::branch(sibling_id),
        )
    }

    // ============================================================================
    // KEY SYNCHRONIZATION
    // ============================================================================

    /// Re-synchronize the routing key that separates this leaf from its left
    /// neighbourhood.
    ///
    /// Walks parent links upward while the current node is the leftmost child;
    /// at the first ancestor where it is not, the key immediately to its left
    /// becomes the leaf's smallest value. An empty leaf or the root is a no-op.
    pub(crate) fn update_keys(&mut self, leaf_id: NodeId) -> TreeResult<()> {
        let leaf = self.leaf_ref(leaf_id)?;
        let Some(min) = leaf.first().cloned() else {
            return Ok(());
        };

        let mut child = NodeRef::leaf(leaf_id);
        let mut parent_id = leaf.parent;
        while parent_id != NULL_NODE {
            let parent = self.branch_ref(parent_id)?;
            let index = parent.child_position(child).ok_or_else(|| {
                BPlusTreeError::corrupted_tree(
                    "Parent link",
                    &format!("branch {} does not own node {}", parent_id, child.id()),
                )
            })?;

            if index > 0 {
                self.branch_mut(parent_id)?.keys[index - 1] = min;
                return Ok(());
            }

            child = NodeRef::branch(parent_id);
            parent_id = parent.parent;
        }
        Ok(())
    }
}
