//! DELETE operations for BPlusTree.
//!
//! This module contains the deletion driver: removing a value from its leaf,
//! rebalancing an underfull leaf by redistribution or merge, cascading the
//! loss of a separator up through the branches, and collapsing the root when
//! it is left with a single child.

use crate::error::{BPlusTreeError, BTreeResultExt, ModifyResult, TreeResult};
use crate::types::{BPlusTree, NodeId, NodeRef, Rebalance, Sibling, NULL_NODE};
use log::{debug, error};

/// Position of a node among its parent's children and its direct neighbours.
struct Siblings {
    index: usize,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<T: Ord + Clone> BPlusTree<T> {
    // ============================================================================
    // PUBLIC DELETE OPERATIONS
    // ============================================================================

    /// Remove a value from the tree.
    ///
    /// Returns `true` if the value was present. Deleting an absent value
    /// returns `false` and leaves the tree structurally unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the tree structure is found to be corrupted while deleting.
    /// Use [`try_delete`](Self::try_delete) to receive the error instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree: BPlusTree<i32> = (1..=4).collect();
    /// assert!(tree.delete(&2));
    /// assert!(!tree.delete(&2));
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4]);
    /// ```
    pub fn delete(&mut self, value: &T) -> bool {
        match self.delete_value(value) {
            Ok(deleted) => deleted,
            Err(e) => {
                error!("delete left the tree inconsistent: {}", e);
                panic!("B+ tree delete failed: {}", e);
            }
        }
    }

    /// Delete with full invariant checking before and after the operation.
    pub fn try_delete(&mut self, value: &T) -> ModifyResult<bool> {
        self.check_invariants_detailed().with_operation("delete")?;
        let deleted = self.delete_value(value).with_operation("delete")?;
        self.check_invariants_detailed().with_operation("delete")?;
        Ok(deleted)
    }

    // ============================================================================
    // DELETE DRIVER
    // ============================================================================

    pub(crate) fn delete_value(&mut self, value: &T) -> TreeResult<bool> {
        let Some(leaf_id) = self.find_leaf(value)? else {
            return Ok(false);
        };

        let leaf = self.leaf_ref(leaf_id)?;
        let Ok(index) = leaf.values.binary_search(value) else {
            return Ok(false);
        };

        if leaf.is_root() {
            let leaf = self.leaf_mut(leaf_id)?;
            leaf.delete(value)?;
            let now_empty = leaf.is_empty();
            self.len -= 1;
            if now_empty {
                self.free_leaf(leaf_id)?;
                self.root = None;
                debug!("freed root leaf {}, tree is empty", leaf_id);
            }
            return Ok(true);
        }

        if leaf.can_donate() {
            self.leaf_mut(leaf_id)?.delete(value)?;
            self.len -= 1;
            self.update_keys(leaf_id)?;
            return Ok(true);
        }

        self.leaf_mut(leaf_id)?.remove_at(index);
        self.len -= 1;
        let (survivor, outcome) = self.rebalance_leaf(leaf_id)?;
        debug!("leaf {} rebalanced: {:?}", leaf_id, outcome);
        self.update_keys(survivor)?;
        Ok(true)
    }

    // ============================================================================
    // LEAF REBALANCING
    // ============================================================================

    /// Restore minimum occupancy of a non-root leaf.
    ///
    /// Tries, in order, borrowing from the left sibling, borrowing from the
    /// right sibling, merging into the left sibling and merging the right
    /// sibling in. Returns the leaf that holds the node's values afterwards.
    fn rebalance_leaf(&mut self, leaf_id: NodeId) -> TreeResult<(NodeId, Rebalance)> {
        let parent_id = self.leaf_ref(leaf_id)?.parent;
        let siblings = self.siblings(parent_id, NodeRef::leaf(leaf_id))?;

        if let Some(left_id) = siblings.left {
            if let Some(moved) = self.leaf_mut(left_id)?.borrow_last() {
                self.leaf_mut(leaf_id)?.accept_from_left(moved.clone());
                self.set_separator(parent_id, siblings.index - 1, moved)?;
                return Ok((leaf_id, Rebalance::Redistributed(Sibling::Left)));
            }
        }

        if let Some(right_id) = siblings.right {
            if let Some(moved) = self.leaf_mut(right_id)?.borrow_first() {
                self.leaf_mut(leaf_id)?.accept_from_right(moved);
                let new_first = self.leaf_ref(right_id)?.first().cloned().ok_or_else(|| {
                    BPlusTreeError::invalid_state("redistribute", "right sibling emptied")
                })?;
                self.set_separator(parent_id, siblings.index, new_first)?;
                return Ok((leaf_id, Rebalance::Redistributed(Sibling::Right)));
            }
        }

        if let Some(left_id) = siblings.left {
            let mut node = self.free_leaf(leaf_id)?;
            self.leaf_mut(left_id)?.merge_from(&mut node);
            self.branch_mut(parent_id)?.remove_child_at(siblings.index)?;
            self.fix_branch_underflow(parent_id)?;
            return Ok((left_id, Rebalance::Merged(Sibling::Left)));
        }

        if let Some(right_id) = siblings.right {
            let mut right = self.free_leaf(right_id)?;
            self.leaf_mut(leaf_id)?.merge_from(&mut right);
            self.branch_mut(parent_id)?.remove_child_at(siblings.index + 1)?;
            self.fix_branch_underflow(parent_id)?;
            return Ok((leaf_id, Rebalance::Merged(Sibling::Right)));
        }

        Err(BPlusTreeError::corrupted_tree(
            "Leaf",
            &format!("non-root leaf {} has no siblings", leaf_id),
        ))
    }

    // ============================================================================
    // BRANCH REBALANCING
    // ============================================================================

    /// Restore the occupancy of a branch that just lost a separator, cascading
    /// upward when it merges, and collapse a root branch left without keys.
    fn fix_branch_underflow(&mut self, branch_id: NodeId) -> TreeResult<()> {
        let branch = self.branch_ref(branch_id)?;

        if branch.is_root() {
            if branch.keys.is_empty() {
                let child = *branch.children.first().ok_or_else(|| {
                    BPlusTreeError::corrupted_tree(
                        "Root",
                        &format!("branch {} has no children", branch_id),
                    )
                })?;
                self.free_branch(branch_id)?;
                self.set_parent(child, NULL_NODE)?;
                self.root = Some(child);
                debug!("collapsed root branch {} into node {}", branch_id, child.id());
            }
            return Ok(());
        }

        if !branch.is_underflow() {
            return Ok(());
        }

        let outcome = self.rebalance_branch(branch_id)?;
        debug!("branch {} rebalanced: {:?}", branch_id, outcome);
        Ok(())
    }

    fn rebalance_branch(&mut self, branch_id: NodeId) -> TreeResult<Rebalance> {
        let parent_id = self.branch_ref(branch_id)?.parent;
        let siblings = self.siblings(parent_id, NodeRef::branch(branch_id))?;

        if let Some(left_id) = siblings.left {
            if let Some((moved_key, moved_child)) = self.branch_mut(left_id)?.borrow_last() {
                let separator = self.separator(parent_id, siblings.index - 1)?;
                let new_separator = self
                    .branch_mut(branch_id)?
                    .accept_from_left(separator, moved_key, moved_child);
                self.set_separator(parent_id, siblings.index - 1, new_separator)?;
                self.set_parent(moved_child, branch_id)?;
                return Ok(Rebalance::Redistributed(Sibling::Left));
            }
        }

        if let Some(right_id) = siblings.right {
            if let Some((moved_key, moved_child)) = self.branch_mut(right_id)?.borrow_first() {
                let separator = self.separator(parent_id, siblings.index)?;
                let new_separator = self
                    .branch_mut(branch_id)?
                    .accept_from_right(separator, moved_key, moved_child);
                self.set_separator(parent_id, siblings.index, new_separator)?;
                self.set_parent(moved_child, branch_id)?;
                return Ok(Rebalance::Redistributed(Sibling::Right));
            }
        }

        if let Some(left_id) = siblings.left {
            let mut node = self.free_branch(branch_id)?;
            let (separator, _) = self.branch_mut(parent_id)?.remove_child_at(siblings.index)?;
            self.branch_mut(left_id)?.merge_from(separator, &mut node);
            self.adopt_children(left_id)?;
            self.fix_branch_underflow(parent_id)?;
            return Ok(Rebalance::Merged(Sibling::Left));
        }

        if let Some(right_id) = siblings.right {
            let mut right = self.free_branch(right_id)?;
            let (separator, _) = self
                .branch_mut(parent_id)?
                .remove_child_at(siblings.index + 1)?;
            self.branch_mut(branch_id)?.merge_from(separator, &mut right);
            self.adopt_children(branch_id)?;
            self.fix_branch_underflow(parent_id)?;
            return Ok(Rebalance::Merged(Sibling::Right));
        }

        Err(BPlusTreeError::corrupted_tree(
            "Branch",
            &format!("non-root branch {} has no siblings", branch_id),
        ))
    }

    // ============================================================================
    // REBALANCING HELPERS
    // ============================================================================

    fn siblings(&self, parent_id: NodeId, node: NodeRef<T>) -> TreeResult<Siblings> {
        let parent = self.branch_ref(parent_id)?;
        let index = parent.child_position(node).ok_or_else(|| {
            BPlusTreeError::corrupted_tree(
                "Parent link",
                &format!("branch {} does not own node {}", parent_id, node.id()),
            )
        })?;
        let left = index
            .checked_sub(1)
            .and_then(|i| parent.children.get(i))
            .map(NodeRef::id);
        let right = parent.children.get(index + 1).map(NodeRef::id);
        Ok(Siblings { index, left, right })
    }

    fn separator(&self, parent_id: NodeId, key_index: usize) -> TreeResult<T> {
        self.branch_ref(parent_id)?
            .keys
            .get(key_index)
            .cloned()
            .ok_or_else(|| missing_separator(parent_id, key_index))
    }

    fn set_separator(&mut self, parent_id: NodeId, key_index: usize, key: T) -> TreeResult<()> {
        let slot = self
            .branch_mut(parent_id)?
            .keys
            .get_mut(key_index)
            .ok_or_else(|| missing_separator(parent_id, key_index))?;
        *slot = key;
        Ok(())
    }
}

fn missing_separator(parent_id: NodeId, key_index: usize) -> BPlusTreeError {
    BPlusTreeError::corrupted_tree(
        "Branch",
        &format!("branch {} has no separator {}", parent_id, key_index),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn tree_of(leaf_fanout: usize, branch_fanout: usize, values: &[i32]) -> BPlusTree<i32> {
        let mut tree = BPlusTree::new(leaf_fanout, branch_fanout).unwrap();
        for value in values {
            tree.insert(*value);
        }
        tree
    }

    #[test]
    fn test_delete_absent_value_leaves_tree_unchanged() {
        let mut tree = tree_of(4, 4, &[1, 2, 3, 4, 5]);
        let before = tree.levels();
        assert!(!tree.delete(&42));
        assert!(!tree.delete(&0));
        assert_eq!(tree.levels(), before);
        assert_eq!(tree.len(), 5);

        let mut empty = BPlusTree::<i32>::new(4, 4).unwrap();
        assert!(!empty.delete(&1));
    }

    #[test]
    fn test_delete_last_value_frees_root() {
        let mut tree = tree_of(4, 4, &[7]);
        assert!(tree.delete(&7));
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
        assert_eq!(tree.leaf_arena.allocated_count(), 0);
        assert!(tree.insert(8));
        assert!(tree.search(&8));
    }

    #[test]
    fn test_delete_scenario_from_split_tree() {
        init_logging();
        let mut tree = tree_of(4, 4, &[1, 2, 3, 4]);
        assert!(tree.delete(&1));
        assert!(!tree.search(&1));
        for value in [2, 3, 4] {
            assert!(tree.search(&value));
        }
        assert_eq!(tree.len(), 3);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_borrow_from_left_sibling() {
        // leaves [1, 2, 3] [4, 5]; deleting from the right leaf pulls 3 over
        let mut tree = tree_of(5, 5, &[1, 2, 4, 5, 3]);
        assert_eq!(
            tree.levels(),
            vec![vec![vec![4]], vec![vec![1, 2, 3], vec![4, 5]]]
        );
        assert!(tree.delete(&5));
        assert_eq!(
            tree.levels(),
            vec![vec![vec![3]], vec![vec![1, 2], vec![3, 4]]]
        );
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_borrow_from_right_sibling() {
        let mut tree = tree_of(5, 5, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            tree.levels(),
            vec![vec![vec![3]], vec![vec![1, 2], vec![3, 4, 5, 6]]]
        );
        assert!(tree.delete(&1));
        assert_eq!(
            tree.levels(),
            vec![vec![vec![4]], vec![vec![2, 3], vec![4, 5, 6]]]
        );
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_merge_collapses_root() {
        init_logging();
        let mut tree = tree_of(4, 4, &[1, 2, 3, 4]);
        assert!(tree.delete(&1));
        assert!(tree.delete(&3));
        assert_eq!(tree.levels(), vec![vec![vec![4]], vec![vec![2], vec![4]]]);

        // Neither leaf can spare a value, so the pair merges and the root goes
        assert!(tree.delete(&4));
        assert!(tree.is_leaf_root());
        assert_eq!(tree.levels(), vec![vec![vec![2]]]);
        assert_eq!(tree.branch_arena.allocated_count(), 0);
        assert_eq!(tree.leaf_arena.allocated_count(), 1);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_merge_right_into_leftmost_leaf() {
        let mut tree = tree_of(5, 5, &[1, 2, 3, 4, 5]);
        assert!(tree.delete(&5));
        assert_eq!(
            tree.levels(),
            vec![vec![vec![3]], vec![vec![1, 2], vec![3, 4]]]
        );
        assert!(tree.delete(&1));
        assert_eq!(tree.levels(), vec![vec![vec![2, 3, 4]]]);
        assert!(tree.check_invariants());
    }

    fn root_child(tree: &BPlusTree<i32>, index: usize) -> NodeId {
        let root_id = tree.root.unwrap().id();
        tree.get_branch(root_id).unwrap().children()[index].id()
    }

    #[test]
    fn test_branch_borrows_from_left_sibling() {
        init_logging();
        let mut tree = tree_of(3, 3, &[1, 2, 3, 4, 5, 6, 7]);
        assert!(tree.delete(&1));
        assert_eq!(
            tree.levels(),
            vec![
                vec![vec![5]],
                vec![vec![3, 4], vec![6]],
                vec![vec![2], vec![3], vec![4], vec![5], vec![6, 7]],
            ]
        );

        // Merging [5] and [6] empties the right branch, which takes leaf [4]
        // from its left neighbour through the root separator
        assert!(tree.delete(&7));
        assert!(tree.delete(&6));
        assert_eq!(
            tree.levels(),
            vec![
                vec![vec![4]],
                vec![vec![3], vec![5]],
                vec![vec![2], vec![3], vec![4], vec![5]],
            ]
        );

        let moved = tree.find_leaf(&4).unwrap().unwrap();
        assert_eq!(tree.get_leaf(moved).unwrap().parent(), root_child(&tree, 1));
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_branch_borrows_from_right_sibling() {
        init_logging();
        let mut tree = tree_of(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            tree.levels(),
            vec![
                vec![vec![3, 5]],
                vec![vec![2], vec![4], vec![6, 7]],
                vec![vec![1], vec![2], vec![3], vec![4], vec![5], vec![6], vec![7, 8]],
            ]
        );

        // Merging [3] and [4] empties the middle branch, which takes leaf [5]
        // from its right neighbour
        assert!(tree.delete(&3));
        assert_eq!(
            tree.levels(),
            vec![
                vec![vec![4, 6]],
                vec![vec![2], vec![5], vec![7]],
                vec![vec![1], vec![2], vec![4], vec![5], vec![6], vec![7, 8]],
            ]
        );

        let moved = tree.find_leaf(&5).unwrap().unwrap();
        assert_eq!(tree.get_leaf(moved).unwrap().parent(), root_child(&tree, 1));
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_cascading_merge_shrinks_height() {
        init_logging();
        let mut tree = tree_of(3, 3, &[1, 2, 3, 4, 5]);
        assert_eq!(tree.height(), 3);
        for value in [5, 4, 3] {
            assert!(tree.delete(&value));
            assert!(tree.check_invariants(), "after deleting {}", value);
        }
        assert_eq!(tree.height(), 2);
        assert!(tree.iter().copied().eq([1, 2]));
    }

    #[test]
    fn test_delete_everything_in_both_directions() {
        for order in [true, false] {
            let values: Vec<i32> = (0..300).collect();
            let mut tree = tree_of(4, 3, &values);
            let mut remaining = values.len();
            let sequence: Vec<i32> = if order {
                values.clone()
            } else {
                values.iter().rev().copied().collect()
            };
            for value in sequence {
                assert!(tree.delete(&value));
                remaining -= 1;
                assert_eq!(tree.len(), remaining);
                assert!(tree.check_invariants());
            }
            assert!(tree.is_empty());
            assert_eq!(tree.leaf_arena.allocated_count(), 0);
            assert_eq!(tree.branch_arena.allocated_count(), 0);
        }
    }

    #[test]
    fn test_try_delete() {
        let mut tree = tree_of(3, 5, &[3, 1, 4, 1, 5, 9, 2, 6]);
        assert_eq!(tree.try_delete(&4), Ok(true));
        assert_eq!(tree.try_delete(&4), Ok(false));
        assert_eq!(tree.try_delete(&8), Ok(false));
        assert!(tree.iter().copied().eq([1, 2, 3, 5, 6, 9]));
    }

    #[test]
    fn test_corrupted_parent_link_is_reported() {
        let mut tree = tree_of(4, 4, &[1, 2, 3, 4, 5, 6, 7]);
        let leaf_id = tree.find_leaf(&7).unwrap().unwrap();
        tree.get_leaf_mut(leaf_id).unwrap().parent = 12345;
        assert!(tree.try_delete(&7).is_err());
    }
}
