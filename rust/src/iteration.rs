//! Iterator implementations for BPlusTree.
//!
//! Iteration never walks the branches after the start position is found: it
//! follows the leaf `next` chain, caching a reference to the current leaf.

use crate::types::{BPlusTree, LeafNode, NodeId, NULL_NODE};
use std::ops::Bound;

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Ascending iterator over the values of a B+ tree.
pub struct Iter<'a, T> {
    tree: &'a BPlusTree<T>,
    current_leaf_ref: Option<&'a LeafNode<T>>,
    current_leaf_index: usize,
    end: Bound<T>,
    finished: bool,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<T: Ord + Clone> BPlusTree<T> {
    /// Returns an iterator over all values in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(3, 3).unwrap();
    /// for value in [5, 1, 4, 2, 3] {
    ///     tree.insert(value);
    /// }
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, self.get_first_leaf_id(), 0, Bound::Unbounded)
    }
}

// ============================================================================
// ITER IMPLEMENTATION
// ============================================================================

impl<'a, T: Ord + Clone> Iter<'a, T> {
    /// Start at `index` within `leaf_id` and stop at `end`.
    pub(crate) fn new(
        tree: &'a BPlusTree<T>,
        leaf_id: Option<NodeId>,
        index: usize,
        end: Bound<T>,
    ) -> Self {
        Self {
            tree,
            current_leaf_ref: leaf_id.and_then(|id| tree.get_leaf(id)),
            current_leaf_index: index,
            end,
            finished: false,
        }
    }

    fn beyond_end(&self, value: &T) -> bool {
        match &self.end {
            Bound::Included(end) => value > end,
            Bound::Excluded(end) => value >= end,
            Bound::Unbounded => false,
        }
    }

    /// Move to the next leaf in the chain; false once the chain ends.
    fn advance_to_next_leaf(&mut self) -> bool {
        let next_leaf_id = self
            .current_leaf_ref
            .and_then(|leaf| (leaf.next != NULL_NODE).then_some(leaf.next));

        self.current_leaf_ref = next_leaf_id.and_then(|id| self.tree.get_leaf(id));
        self.current_leaf_index = 0;
        self.current_leaf_ref.is_some()
    }
}

impl<'a, T: Ord + Clone> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let Some(leaf) = self.current_leaf_ref else {
                self.finished = true;
                return None;
            };

            match leaf.values.get(self.current_leaf_index) {
                Some(value) if self.beyond_end(value) => {
                    self.finished = true;
                    return None;
                }
                Some(value) => {
                    self.current_leaf_index += 1;
                    return Some(value);
                }
                None => {
                    if !self.advance_to_next_leaf() {
                        self.finished = true;
                        return None;
                    }
                }
            }
        }
    }
}

impl<'a, T: Ord + Clone> IntoIterator for &'a BPlusTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// COLLECTION TRAITS
// ============================================================================

impl<T: Ord + Clone> Extend<T> for BPlusTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord + Clone> FromIterator<T> for BPlusTree<T> {
    /// Build a tree with the default fan-out from any sequence of values.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}
