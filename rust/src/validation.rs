//! Validation and debugging utilities for BPlusTree.
//!
//! The checker walks the whole tree and verifies ordering, occupancy, routing
//! bounds, synchronized routing keys, parent back-references, equal leaf
//! depth, the leaf chain, the element count and arena consistency.

use crate::error::{BPlusTreeError, BTreeResult, TreeResult};
use crate::node::min_occupancy;
use crate::types::{BPlusTree, NodeId, NodeRef, NULL_NODE};

/// Facts gathered while walking the tree.
#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    leaf_ids: Vec<NodeId>,
    values: usize,
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<T: Ord + Clone> BPlusTree<T> {
    /// Check if the tree maintains B+ tree invariants.
    /// Returns true if all invariants are satisfied.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    pub fn check_invariants_detailed(&self) -> BTreeResult<()> {
        let Some(root) = self.root else {
            if self.len != 0 {
                return Err(BPlusTreeError::data_integrity(
                    "Empty tree",
                    &format!("no root but len is {}", self.len),
                ));
            }
            return self.check_arena_tree_consistency();
        };

        let mut walk = Walk::default();
        self.check_node_invariants(root, NULL_NODE, None, None, 0, &mut walk)?;

        if walk.values != self.len {
            return Err(BPlusTreeError::data_integrity(
                "Element count",
                &format!("tree holds {} values but len is {}", walk.values, self.len),
            ));
        }

        self.check_leaf_chain(&walk.leaf_ids)?;
        self.check_arena_tree_consistency()
    }

    /// Alias for check_invariants_detailed (for test compatibility).
    pub fn validate(&self) -> BTreeResult<()> {
        self.check_invariants_detailed()
    }

    /// Recursively check a node and its subtree, returning the subtree's
    /// smallest value.
    fn check_node_invariants(
        &self,
        node: NodeRef<T>,
        expected_parent: NodeId,
        lower: Option<&T>,
        upper: Option<&T>,
        depth: usize,
        walk: &mut Walk,
    ) -> TreeResult<T> {
        let is_root = expected_parent == NULL_NODE;
        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self.leaf_ref(id)?;
                let context = format!("Leaf {}", id);

                if leaf.parent != expected_parent {
                    return Err(parent_mismatch(&context, leaf.parent, expected_parent));
                }
                check_occupancy(
                    &context,
                    leaf.values.len(),
                    self.leaf_fanout,
                    leaf.fanout,
                    is_root,
                )?;
                check_sorted(&context, &leaf.values)?;
                check_bounds(&context, &leaf.values, lower, upper)?;

                match walk.leaf_depth {
                    Some(expected) if expected != depth => {
                        return Err(BPlusTreeError::corrupted_tree(
                            &context,
                            &format!("at depth {} but other leaves at depth {}", depth, expected),
                        ));
                    }
                    Some(_) => {}
                    None => walk.leaf_depth = Some(depth),
                }
                walk.leaf_ids.push(id);
                walk.values += leaf.values.len();

                leaf.values
                    .first()
                    .cloned()
                    .ok_or_else(|| BPlusTreeError::corrupted_tree(&context, "leaf is empty"))
            }
            NodeRef::Branch(id, _) => {
                let branch = self.branch_ref(id)?;
                let context = format!("Branch {}", id);

                if branch.parent != expected_parent {
                    return Err(parent_mismatch(&context, branch.parent, expected_parent));
                }
                if branch.keys.len() + 1 != branch.children.len() {
                    return Err(BPlusTreeError::corrupted_tree(
                        &context,
                        &format!(
                            "{} keys but {} children",
                            branch.keys.len(),
                            branch.children.len()
                        ),
                    ));
                }
                check_occupancy(
                    &context,
                    branch.keys.len(),
                    self.branch_fanout,
                    branch.fanout,
                    is_root,
                )?;
                check_sorted(&context, &branch.keys)?;
                check_bounds(&context, &branch.keys, lower, upper)?;

                let mut subtree_min = None;
                for (i, child) in branch.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&branch.keys[i - 1]) };
                    let child_upper = branch.keys.get(i).or(upper);
                    let child_min = self.check_node_invariants(
                        *child,
                        id,
                        child_lower,
                        child_upper,
                        depth + 1,
                        walk,
                    )?;

                    if i == 0 {
                        subtree_min = Some(child_min);
                    } else if branch.keys[i - 1] != child_min {
                        return Err(BPlusTreeError::data_integrity(
                            &context,
                            &format!("routing key {} is not the minimum of child {}", i - 1, i),
                        ));
                    }
                }

                subtree_min
                    .ok_or_else(|| BPlusTreeError::corrupted_tree(&context, "branch has no children"))
            }
        }
    }

    /// Check that the leaf chain visits exactly the tree's leaves, left to
    /// right, in ascending value order.
    fn check_leaf_chain(&self, tree_leaf_ids: &[NodeId]) -> TreeResult<()> {
        let mut chain = Vec::with_capacity(tree_leaf_ids.len());
        let mut previous_last: Option<&T> = None;
        let mut current = tree_leaf_ids.first().copied().unwrap_or(NULL_NODE);

        while current != NULL_NODE {
            if chain.len() >= tree_leaf_ids.len() {
                return Err(BPlusTreeError::corrupted_tree(
                    "Leaf chain",
                    "longer than the number of leaves, possible cycle",
                ));
            }
            let leaf = self.leaf_ref(current)?;
            if let (Some(last), Some(first)) = (previous_last, leaf.values.first()) {
                if last >= first {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Leaf chain",
                        &format!("leaf {} does not continue the ascending order", current),
                    ));
                }
            }
            previous_last = leaf.values.last();
            chain.push(current);
            current = leaf.next;
        }

        if chain != tree_leaf_ids {
            return Err(BPlusTreeError::corrupted_tree(
                "Leaf chain",
                &format!("tree has {:?}, linked list has {:?}", tree_leaf_ids, chain),
            ));
        }
        Ok(())
    }
}

impl<T> BPlusTree<T> {
    /// Check that arena allocation matches tree structure
    fn check_arena_tree_consistency(&self) -> TreeResult<()> {
        let (tree_leaf_count, tree_branch_count) = self.count_nodes_in_tree();
        let leaf_stats = self.leaf_arena_stats();
        let branch_stats = self.branch_arena_stats();

        if tree_leaf_count != leaf_stats.allocated_count {
            return Err(BPlusTreeError::arena_error(
                "Leaf consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_leaf_count, leaf_stats.allocated_count
                ),
            ));
        }

        if tree_branch_count != branch_stats.allocated_count {
            return Err(BPlusTreeError::arena_error(
                "Branch consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_branch_count, branch_stats.allocated_count
                ),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// NODE CHECKS
// ============================================================================

fn parent_mismatch(context: &str, found: NodeId, expected: NodeId) -> BPlusTreeError {
    BPlusTreeError::corrupted_tree(
        context,
        &format!("parent link is {} but owner is {}", found, expected),
    )
}

/// Root nodes need at least one element, other nodes the minimum occupancy.
fn check_occupancy(
    context: &str,
    len: usize,
    tree_fanout: usize,
    node_fanout: usize,
    is_root: bool,
) -> TreeResult<()> {
    if node_fanout != tree_fanout {
        return Err(BPlusTreeError::data_integrity(
            context,
            &format!("fan-out {} differs from tree fan-out {}", node_fanout, tree_fanout),
        ));
    }
    let min = if is_root { 1 } else { min_occupancy(tree_fanout) };
    let max = tree_fanout - 1;
    if len < min || len > max {
        return Err(BPlusTreeError::data_integrity(
            context,
            &format!("holds {} elements, allowed {}..={}", len, min, max),
        ));
    }
    Ok(())
}

fn check_sorted<T: Ord>(context: &str, items: &[T]) -> TreeResult<()> {
    match items.windows(2).position(|pair| pair[0] >= pair[1]) {
        Some(i) => Err(BPlusTreeError::data_integrity(
            context,
            &format!("elements {} and {} are out of order", i, i + 1),
        )),
        None => Ok(()),
    }
}

/// Every element must lie in `[lower, upper)`.
fn check_bounds<T: Ord>(
    context: &str,
    items: &[T],
    lower: Option<&T>,
    upper: Option<&T>,
) -> TreeResult<()> {
    let below = matches!((lower, items.first()), (Some(lower), Some(first)) if first < lower);
    let above = matches!((upper, items.last()), (Some(upper), Some(last)) if last >= upper);
    if below || above {
        return Err(BPlusTreeError::data_integrity(
            context,
            "elements outside the range routed to this node",
        ));
    }
    Ok(())
}
