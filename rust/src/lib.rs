//! Arena-backed B+ tree index in Rust.
//!
//! This crate provides an ordered set stored in a B+ tree with two node
//! kinds: leaves holding the values, linked left to right, and branches
//! holding routing keys. Nodes live in two arenas and refer to each other by
//! `NodeId`, including the parent back-reference every node keeps.
//!
//! Full nodes are split before an insertion reaches them and underfull nodes
//! are repaired by borrowing from or merging with a sibling, so every
//! non-root node stays between half full and full after each operation.
//!
//! ```
//! use bplus_index::BPlusTree;
//!
//! let mut tree = BPlusTree::new(4, 4).unwrap();
//! for value in [5, 3, 8, 1, 4] {
//!     tree.insert(value);
//! }
//! assert!(tree.search(&4));
//! assert_eq!(tree.range(3..6).copied().collect::<Vec<_>>(), vec![3, 4, 5]);
//!
//! tree.delete(&3);
//! assert_eq!(tree.len(), 4);
//! assert!(tree.check_invariants());
//! ```

mod compact_arena;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod macros;
mod node;
mod range_queries;
mod traversal;
mod tree_structure;
mod types;
mod validation;

pub use compact_arena::{CompactArena, CompactArenaStats};
pub use construction::validation::{recommended_fanout, validate_fanout};
pub use construction::DEFAULT_FANOUT;
pub use error::{BPlusTreeError, BTreeResult, BTreeResultExt, InitResult, ModifyResult};
pub use iteration::Iter;
pub use types::{BPlusTree, BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};
