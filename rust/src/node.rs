//! Node implementations for BPlusTree.
//!
//! This module contains the node-level operations of `LeafNode` and
//! `BranchNode`: checked insertion and deletion, occupancy predicates,
//! splitting, and the borrow/accept/merge helpers used by rebalancing.
//!
//! The checked operations refuse to push a node past its capacity or below its
//! minimum occupancy; the tree driver is responsible for splitting or
//! rebalancing first.

use crate::error::{BPlusTreeError, BTreeResult};
use crate::types::{BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};

/// Minimum number of elements a non-root node of the given fan-out must hold.
pub(crate) fn min_occupancy(fanout: usize) -> usize {
    fanout.div_ceil(2) - 1
}

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<T: Ord + Clone> LeafNode<T> {
    // ============================================================================
    // GET OPERATIONS
    // ============================================================================

    /// Returns true if the value is stored in this leaf.
    pub fn contains(&self, value: &T) -> bool {
        self.values.binary_search(value).is_ok()
    }

    /// Returns the number of values in this leaf.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this leaf holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a reference to the sorted values of this leaf.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    /// The branch that owns this leaf, `NULL_NODE` at the root.
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Right sibling in the leaf chain, `NULL_NODE` for the last leaf.
    pub fn next(&self) -> NodeId {
        self.next
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert a value at its sorted position.
    ///
    /// Returns `Ok(false)` without modifying the leaf if the value is already
    /// present, and `Err(NodeFull)` if the leaf already holds `M-1` values.
    pub fn insert(&mut self, value: T) -> BTreeResult<bool> {
        if self.is_full() {
            return Err(BPlusTreeError::node_full("Leaf", self.capacity()));
        }
        match self.values.binary_search(&value) {
            Ok(_) => Ok(false),
            Err(index) => {
                self.values.insert(index, value);
                Ok(true)
            }
        }
    }

    /// Split a full leaf, returning the new right sibling and a copy of its
    /// first value for promotion into the parent.
    ///
    /// The left half keeps `ceil(len/2)` values. The sibling inherits this
    /// leaf's parent and `next` link; the caller links this leaf to the
    /// sibling once the sibling has an arena slot.
    pub fn split(&mut self) -> BTreeResult<(LeafNode<T>, T)> {
        if !self.is_full() {
            return Err(BPlusTreeError::invalid_state(
                "split leaf",
                &format!("{} of {} values used", self.len(), self.capacity()),
            ));
        }

        let mid = self.values.len().div_ceil(2);
        let right_values = self.values.split_off(mid);
        let separator = right_values[0].clone();

        let sibling = LeafNode {
            fanout: self.fanout,
            values: right_values,
            parent: self.parent,
            next: self.next,
        };
        self.next = NULL_NODE;

        Ok((sibling, separator))
    }

    // ============================================================================
    // DELETE OPERATIONS
    // ============================================================================

    /// Remove a value from this leaf.
    ///
    /// Returns `Ok(false)` if the value is absent and `Err(NodeUnderflow)` if
    /// removing it would take a non-root leaf below minimum occupancy.
    pub fn delete(&mut self, value: &T) -> BTreeResult<bool> {
        let Ok(index) = self.values.binary_search(value) else {
            return Ok(false);
        };
        if !self.is_root() && !self.can_donate() {
            return Err(BPlusTreeError::node_underflow(
                "Leaf",
                self.len(),
                self.min_len(),
            ));
        }
        self.values.remove(index);
        Ok(true)
    }

    /// Remove the value at `index` without an occupancy check; the caller
    /// rebalances the leaf afterwards.
    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        self.values.remove(index)
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Maximum number of values, `M-1`.
    pub fn capacity(&self) -> usize {
        self.fanout - 1
    }

    /// Minimum number of values for a non-root leaf, `ceil(M/2)-1`.
    pub fn min_len(&self) -> usize {
        min_occupancy(self.fanout)
    }

    /// Returns true if this leaf is at capacity.
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity()
    }

    /// Returns true if this leaf is below minimum occupancy.
    pub fn is_underflow(&self) -> bool {
        self.values.len() < self.min_len()
    }

    /// Returns true if this leaf can give a value to a sibling.
    pub fn can_donate(&self) -> bool {
        self.values.len() > self.min_len()
    }

    pub fn is_root(&self) -> bool {
        self.parent == NULL_NODE
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Borrow the last value from this leaf (used when this is the left sibling)
    pub(crate) fn borrow_last(&mut self) -> Option<T> {
        if !self.can_donate() {
            return None;
        }
        self.values.pop()
    }

    /// Borrow the first value from this leaf (used when this is the right sibling)
    pub(crate) fn borrow_first(&mut self) -> Option<T> {
        if self.values.is_empty() || !self.can_donate() {
            return None;
        }
        Some(self.values.remove(0))
    }

    /// Accept a borrowed value at the beginning (from left sibling)
    pub(crate) fn accept_from_left(&mut self, value: T) {
        self.values.insert(0, value);
    }

    /// Accept a borrowed value at the end (from right sibling)
    pub(crate) fn accept_from_right(&mut self, value: T) {
        self.values.push(value);
    }

    /// Append every value of the right neighbour `other`, taking over its
    /// place in the leaf chain.
    pub(crate) fn merge_from(&mut self, other: &mut LeafNode<T>) {
        self.values.append(&mut other.values);
        self.next = other.next;
        other.next = NULL_NODE;
    }
}

// ============================================================================
// BRANCH NODE IMPLEMENTATION
// ============================================================================

impl<T: Ord + Clone> BranchNode<T> {
    // ============================================================================
    // ROUTING
    // ============================================================================

    /// Find the index of the child that should contain the given value: the
    /// first child whose upper-bound key exceeds it, or the last child.
    pub fn find_child_index(&self, value: &T) -> usize {
        match self.keys.binary_search(value) {
            Ok(index) => index + 1, // Key found, go to right child
            Err(index) => index,    // Key not found, index is the insertion point
        }
    }

    /// Get the child node for a given value.
    pub fn get_child(&self, value: &T) -> Option<&NodeRef<T>> {
        self.children.get(self.find_child_index(value))
    }

    /// Position of `child` among this branch's children.
    pub fn child_position(&self, child: NodeRef<T>) -> Option<usize> {
        self.children.iter().position(|candidate| *candidate == child)
    }

    pub fn keys(&self) -> &[T] {
        &self.keys
    }

    pub fn children(&self) -> &[NodeRef<T>] {
        &self.children
    }

    /// The branch that owns this one, `NULL_NODE` at the root.
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert a routing key and the child that follows it.
    ///
    /// Returns the index at which the key landed; the child sits at that
    /// index plus one. Fails with `NodeFull` when the branch holds `N-1` keys.
    pub fn insert_child(&mut self, key: T, child: NodeRef<T>) -> BTreeResult<usize> {
        if self.is_full() {
            return Err(BPlusTreeError::node_full("Branch", self.capacity()));
        }
        let index = self.key_slot(&key)?;
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
        Ok(index)
    }

    fn key_slot(&self, key: &T) -> BTreeResult<usize> {
        match self.keys.binary_search(key) {
            Ok(index) => Err(BPlusTreeError::data_integrity(
                "Branch insert",
                &format!("routing key already present at slot {}", index),
            )),
            Err(index) => Ok(index),
        }
    }

    /// Split a full branch while placing a pending key/child pair.
    ///
    /// The pending pair and the existing `N-1` keys form `N` keys; the key at
    /// position `N/2` of that combined sequence is removed from both halves and
    /// returned for promotion. The left half keeps `N/2` keys, the new right
    /// sibling gets the remaining `N-1-N/2`. Children of the sibling still name
    /// this branch as parent; the caller re-parents them after allocation.
    pub fn split_with(&mut self, key: T, child: NodeRef<T>) -> BTreeResult<(BranchNode<T>, T)> {
        if !self.is_full() {
            return Err(BPlusTreeError::invalid_state(
                "split branch",
                &format!("{} of {} keys used", self.keys.len(), self.capacity()),
            ));
        }

        let pos = self.key_slot(&key)?;
        let mid = self.fanout / 2;

        let (right_keys, right_children, promoted) = if pos < mid {
            // Pending pair lands in the left half.
            let right_keys = self.keys.split_off(mid);
            let right_children = self.children.split_off(mid);
            let promoted = self.keys.pop().ok_or_else(|| {
                BPlusTreeError::invalid_state("split branch", "no key left to promote")
            })?;
            self.keys.insert(pos, key);
            self.children.insert(pos + 1, child);
            (right_keys, right_children, promoted)
        } else if pos == mid {
            // Pending key itself is the middle one.
            let right_keys = self.keys.split_off(mid);
            let mut right_children = self.children.split_off(mid + 1);
            right_children.insert(0, child);
            (right_keys, right_children, key)
        } else {
            // Pending pair lands in the right half.
            let mut right_keys = self.keys.split_off(mid + 1);
            let mut right_children = self.children.split_off(mid + 1);
            let promoted = self.keys.pop().ok_or_else(|| {
                BPlusTreeError::invalid_state("split branch", "no key left to promote")
            })?;
            right_keys.insert(pos - mid - 1, key);
            right_children.insert(pos - mid, child);
            (right_keys, right_children, promoted)
        };

        let sibling = BranchNode {
            fanout: self.fanout,
            keys: right_keys,
            children: right_children,
            parent: self.parent,
        };

        Ok((sibling, promoted))
    }

    // ============================================================================
    // DELETE OPERATIONS
    // ============================================================================

    /// Remove the child at `child_index` (which must be at least 1) together
    /// with the routing key to its left.
    ///
    /// Fails with `NodeUnderflow` if that would take a non-root branch below
    /// minimum occupancy.
    pub fn delete_child(&mut self, child_index: usize) -> BTreeResult<(T, NodeRef<T>)> {
        if !self.is_root() && !self.can_donate() {
            return Err(BPlusTreeError::node_underflow(
                "Branch",
                self.keys.len(),
                self.min_keys(),
            ));
        }
        self.remove_child_at(child_index)
    }

    /// Remove the child at `child_index` and its left routing key without an
    /// occupancy check; the caller rebalances the branch afterwards.
    pub(crate) fn remove_child_at(&mut self, child_index: usize) -> BTreeResult<(T, NodeRef<T>)> {
        if child_index == 0 || child_index >= self.children.len() {
            return Err(BPlusTreeError::invalid_state(
                "remove child",
                &format!(
                    "index {} outside 1..{}",
                    child_index,
                    self.children.len()
                ),
            ));
        }
        let key = self.keys.remove(child_index - 1);
        let child = self.children.remove(child_index);
        Ok((key, child))
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Maximum number of routing keys, `N-1`.
    pub fn capacity(&self) -> usize {
        self.fanout - 1
    }

    /// Minimum number of keys for a non-root branch, `ceil(N/2)-1`.
    pub fn min_keys(&self) -> usize {
        min_occupancy(self.fanout)
    }

    /// Returns the number of keys in this branch node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if this branch node is at capacity.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.capacity()
    }

    /// Returns true if this branch node is below minimum occupancy.
    pub fn is_underflow(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this branch can donate a key to a sibling.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    pub fn is_root(&self) -> bool {
        self.parent == NULL_NODE
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Borrow the last key and child from this branch (used when this is the left sibling)
    pub(crate) fn borrow_last(&mut self) -> Option<(T, NodeRef<T>)> {
        if self.keys.is_empty() || !self.can_donate() {
            return None;
        }
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Borrow the first key and child from this branch (used when this is the right sibling)
    pub(crate) fn borrow_first(&mut self) -> Option<(T, NodeRef<T>)> {
        if self.keys.is_empty() || !self.can_donate() {
            return None;
        }
        let key = self.keys.remove(0);
        let child = self.children.remove(0);
        Some((key, child))
    }

    /// Accept a borrowed key and child at the beginning (from left sibling)
    /// The separator becomes the first key, and the moved child becomes the first child
    pub(crate) fn accept_from_left(&mut self, separator: T, moved_key: T, moved_child: NodeRef<T>) -> T {
        self.keys.insert(0, separator);
        self.children.insert(0, moved_child);
        moved_key // Return the new separator for parent
    }

    /// Accept a borrowed key and child at the end (from right sibling)
    /// The separator becomes the last key, and the moved child becomes the last child
    pub(crate) fn accept_from_right(&mut self, separator: T, moved_key: T, moved_child: NodeRef<T>) -> T {
        self.keys.push(separator);
        self.children.push(moved_child);
        moved_key // Return the new separator for parent
    }

    /// Merge all content from another branch into this one, with separator from parent
    pub(crate) fn merge_from(&mut self, separator: T, other: &mut BranchNode<T>) {
        self.keys.push(separator);
        self.keys.append(&mut other.keys);
        self.children.append(&mut other.children);
    }
}
