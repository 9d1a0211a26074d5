//! Structural traversal and diagnostic output for BPlusTree.
//!
//! `print_*` writes one line per node in depth-first order, indented four
//! spaces per level; `levels` takes a level-order snapshot of node contents.

use crate::types::{BPlusTree, NodeRef};
use std::fmt::Debug;
use std::io::{self, Write};

impl<T: Debug> BPlusTree<T> {
    /// Dump the whole tree to stdout.
    pub fn print(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.print_to(&mut out) {
            log::warn!("failed to print tree: {}", e);
        }
    }

    /// Dump the whole tree to `out`; an empty tree writes nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4, 4).unwrap();
    /// for value in [1, 2, 3, 4] {
    ///     tree.insert(value);
    /// }
    /// let mut out = Vec::new();
    /// tree.print_to(&mut out).unwrap();
    /// let text = String::from_utf8(out).unwrap();
    /// let lines: Vec<&str> = text.lines().collect();
    /// assert!(lines[0].starts_with("Branch["));
    /// assert!(lines[0].ends_with("] [3]"));
    /// assert!(lines[1].starts_with("    Leaf["));
    /// assert!(lines[1].ends_with("] [1, 2]"));
    /// ```
    pub fn print_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.root {
            Some(root) => self.print_subtree_to(root, out),
            None => Ok(()),
        }
    }

    /// Dump the subtree rooted at `node`, indented relative to that node.
    pub fn print_subtree_to<W: Write>(&self, node: NodeRef<T>, out: &mut W) -> io::Result<()> {
        self.print_node(node, 0, out)
    }

    fn print_node<W: Write>(&self, node: NodeRef<T>, depth: usize, out: &mut W) -> io::Result<()> {
        let indent = "    ".repeat(depth);
        match node {
            NodeRef::Leaf(id, _) => match self.get_leaf(id) {
                Some(leaf) => writeln!(out, "{}Leaf[{}] {:?}", indent, id, leaf.values),
                None => writeln!(out, "{}Leaf[{}] <missing>", indent, id),
            },
            NodeRef::Branch(id, _) => match self.get_branch(id) {
                Some(branch) => {
                    writeln!(out, "{}Branch[{}] {:?}", indent, id, branch.keys)?;
                    for child in &branch.children {
                        self.print_node(*child, depth + 1, out)?;
                    }
                    Ok(())
                }
                None => writeln!(out, "{}Branch[{}] <missing>", indent, id),
            },
        }
    }
}

impl<T: Clone> BPlusTree<T> {
    /// Level-order snapshot: for each depth, the keys of every branch or the
    /// values of every leaf, left to right.
    pub fn levels(&self) -> Vec<Vec<Vec<T>>> {
        let mut levels = Vec::new();
        let mut current: Vec<NodeRef<T>> = self.root.into_iter().collect();

        while !current.is_empty() {
            let mut level = Vec::with_capacity(current.len());
            let mut next = Vec::new();
            for node in current {
                match node {
                    NodeRef::Leaf(id, _) => {
                        if let Some(leaf) = self.get_leaf(id) {
                            level.push(leaf.values.clone());
                        }
                    }
                    NodeRef::Branch(id, _) => {
                        if let Some(branch) = self.get_branch(id) {
                            level.push(branch.keys.clone());
                            next.extend(branch.children.iter().copied());
                        }
                    }
                }
            }
            levels.push(level);
            current = next;
        }

        levels
    }

    /// Values of every leaf, left to right, following the leaf chain.
    pub fn leaf_values(&self) -> Vec<Vec<T>> {
        self.leaves().map(|leaf| leaf.values.clone()).collect()
    }
}

impl<T> BPlusTree<T> {
    /// Returns the sizes of all leaf nodes, left to right.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.leaves().map(|leaf| leaf.values.len()).collect()
    }

    fn leaves(&self) -> impl Iterator<Item = &crate::types::LeafNode<T>> + '_ {
        std::iter::successors(
            self.get_first_leaf_id().and_then(|id| self.get_leaf(id)),
            move |leaf| self.get_leaf(leaf.next),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::BPlusTree;

    fn printed(tree: &BPlusTree<i32>) -> String {
        let mut out = Vec::new();
        tree.print_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_print_empty_tree() {
        let tree = BPlusTree::<i32>::new(4, 4).unwrap();
        assert_eq!(printed(&tree), "");
        assert!(tree.levels().is_empty());
        assert!(tree.leaf_sizes().is_empty());
    }

    #[test]
    fn test_print_indents_by_depth() {
        let mut tree = BPlusTree::new(3, 3).unwrap();
        for value in 1..=5 {
            tree.insert(value);
        }
        let text = printed(&tree);
        let indents: Vec<usize> = text
            .lines()
            .map(|line| line.len() - line.trim_start().len())
            .collect();
        // root, branch, leaf, leaf, branch, leaf, leaf
        assert_eq!(indents, vec![0, 4, 8, 8, 4, 8, 8]);
        assert!(text.lines().last().unwrap().ends_with("[4, 5]"));
    }

    #[test]
    fn test_print_subtree() {
        let mut tree = BPlusTree::new(4, 4).unwrap();
        for value in 1..=4 {
            tree.insert(value);
        }
        let leaf_id = tree.find_leaf(&4).unwrap().unwrap();
        let mut out = Vec::new();
        tree.print_subtree_to(crate::types::NodeRef::leaf(leaf_id), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Leaf[{}] [3, 4]\n", leaf_id)
        );
    }

    #[test]
    fn test_leaf_snapshots() {
        let mut tree = BPlusTree::new(4, 4).unwrap();
        for value in 1..=7 {
            tree.insert(value);
        }
        assert_eq!(
            tree.leaf_values(),
            vec![vec![1, 2], vec![3, 4], vec![5, 6, 7]]
        );
        assert_eq!(tree.leaf_sizes(), vec![2, 2, 3]);
        assert_eq!(tree.levels()[0], vec![vec![3, 5]]);
    }
}
