//! Range query operations for BPlusTree.
//!
//! A range query routes once from the root to the leaf holding the start
//! bound and then walks the leaf chain until the end bound.

use crate::iteration::Iter;
use crate::types::{BPlusTree, NodeId};
use std::ops::{Bound, RangeBounds};

// ============================================================================
// RANGE QUERY OPERATIONS
// ============================================================================

impl<T: Ord + Clone> BPlusTree<T> {
    /// Returns an iterator over the values within a range, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4, 4).unwrap();
    /// for i in 0..10 {
    ///     tree.insert(i);
    /// }
    ///
    /// let range1: Vec<_> = tree.range(3..7).copied().collect();
    /// assert_eq!(range1, vec![3, 4, 5, 6]);
    ///
    /// let range2: Vec<_> = tree.range(3..=7).copied().collect();
    /// assert_eq!(range2, vec![3, 4, 5, 6, 7]);
    ///
    /// let range3: Vec<_> = tree.range(5..).copied().collect();
    /// assert_eq!(range3, vec![5, 6, 7, 8, 9]);
    ///
    /// let range4: Vec<_> = tree.range(..5).copied().collect();
    /// assert_eq!(range4, vec![0, 1, 2, 3, 4]);
    /// ```
    pub fn range<R>(&self, range: R) -> Iter<'_, T>
    where
        R: RangeBounds<T>,
    {
        let (leaf_id, index) = match range.start_bound() {
            Bound::Included(value) => self.find_range_start(value, false),
            Bound::Excluded(value) => self.find_range_start(value, true),
            Bound::Unbounded => (self.get_first_leaf_id(), 0),
        };
        Iter::new(self, leaf_id, index, range.end_bound().cloned())
    }

    /// Returns the smallest value in the tree.
    pub fn first(&self) -> Option<&T> {
        self.get_first_leaf_id()
            .and_then(|id| self.get_leaf(id))
            .and_then(|leaf| leaf.first())
    }

    /// Returns the largest value in the tree.
    pub fn last(&self) -> Option<&T> {
        self.root
            .and_then(|root| self.rightmost_leaf(root).ok())
            .and_then(|id| self.get_leaf(id))
            .and_then(|leaf| leaf.last())
    }

    // ============================================================================
    // RANGE QUERY HELPERS
    // ============================================================================

    /// Leaf and position of the first value at or after `value` (strictly after
    /// when `exclusive`). The position may equal the leaf length, in which case
    /// iteration continues with the next leaf.
    fn find_range_start(&self, value: &T, exclusive: bool) -> (Option<NodeId>, usize) {
        let Some(leaf_id) = self.find_leaf(value).ok().flatten() else {
            return (None, 0);
        };
        let index = self
            .get_leaf(leaf_id)
            .map(|leaf| match leaf.values.binary_search(value) {
                Ok(index) if exclusive => index + 1,
                Ok(index) => index,
                Err(index) => index,
            })
            .unwrap_or(0);
        (Some(leaf_id), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sample_tree() -> BPlusTree<i32> {
        let mut tree = BPlusTree::new(3, 4).unwrap();
        for value in (0..100).map(|v| v * 2) {
            tree.insert(value);
        }
        tree
    }

    #[test]
    fn test_range_matches_btreeset() {
        let tree = sample_tree();
        let reference: BTreeSet<i32> = (0..100).map(|v| v * 2).collect();

        for (start, end) in [(0, 10), (3, 17), (50, 51), (190, 250), (-5, 3), (40, 40)] {
            let ours: Vec<i32> = tree.range(start..end).copied().collect();
            let expected: Vec<i32> = reference.range(start..end).copied().collect();
            assert_eq!(ours, expected, "range {}..{}", start, end);

            let ours: Vec<i32> = tree.range(start..=end).copied().collect();
            let expected: Vec<i32> = reference.range(start..=end).copied().collect();
            assert_eq!(ours, expected, "range {}..={}", start, end);
        }
    }

    #[test]
    fn test_range_excluded_start() {
        let tree = sample_tree();
        let bounds = (Bound::Excluded(10), Bound::Included(16));
        let values: Vec<i32> = tree.range(bounds).copied().collect();
        assert_eq!(values, vec![12, 14, 16]);

        // Excluded start at the end of a leaf continues into the next leaf
        let values: Vec<i32> = tree
            .range((Bound::Excluded(197), Bound::Unbounded))
            .copied()
            .collect();
        assert_eq!(values, vec![198]);
    }

    #[test]
    fn test_range_on_empty_tree() {
        let tree = BPlusTree::<i32>::new(4, 4).unwrap();
        assert_eq!(tree.range(..).next(), None);
        assert_eq!(tree.range(1..5).next(), None);
    }

    #[test]
    fn test_first_and_last() {
        let mut tree = BPlusTree::new(4, 4).unwrap();
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);

        for value in [50, 10, 90, 30, 70] {
            tree.insert(value);
        }
        assert_eq!(tree.first(), Some(&10));
        assert_eq!(tree.last(), Some(&90));

        tree.delete(&10);
        tree.delete(&90);
        assert_eq!(tree.first(), Some(&30));
        assert_eq!(tree.last(), Some(&70));
    }
}
