//! Macros shared across the tree modules.

/// Generates the typed arena accessors of `BPlusTree` for one node kind:
/// the public read-only `get_<kind>` and the crate-internal `get_<kind>_mut`,
/// `<kind>_ref`, `<kind>_mut`, `allocate_<kind>`, `free_<kind>`. Nodes are only
/// mutated through the tree so their occupancy and order stay checked.
macro_rules! arena_accessors {
    ($($kind:ident => $node:ident in $arena:ident),* $(,)?) => {
        paste::paste! {
            impl<T> $crate::types::BPlusTree<T> {
                $(
                    /// Get a reference to a node in its arena.
                    pub fn [<get_ $kind>](&self, id: $crate::types::NodeId) -> Option<&$node<T>> {
                        self.$arena.get(id)
                    }

                    #[cfg(test)]
                    pub(crate) fn [<get_ $kind _mut>](
                        &mut self,
                        id: $crate::types::NodeId,
                    ) -> Option<&mut $node<T>> {
                        self.$arena.get_mut(id)
                    }

                    pub(crate) fn [<$kind _ref>](
                        &self,
                        id: $crate::types::NodeId,
                    ) -> $crate::error::TreeResult<&$node<T>> {
                        self.$arena.get(id).ok_or_else(|| {
                            $crate::error::BPlusTreeError::arena_error(
                                concat!(stringify!($kind), " lookup"),
                                &format!("node {} is not allocated", id),
                            )
                        })
                    }

                    pub(crate) fn [<$kind _mut>](
                        &mut self,
                        id: $crate::types::NodeId,
                    ) -> $crate::error::TreeResult<&mut $node<T>> {
                        self.$arena.get_mut(id).ok_or_else(|| {
                            $crate::error::BPlusTreeError::arena_error(
                                concat!(stringify!($kind), " lookup"),
                                &format!("node {} is not allocated", id),
                            )
                        })
                    }

                    pub(crate) fn [<allocate_ $kind>](
                        &mut self,
                        node: $node<T>,
                    ) -> $crate::error::TreeResult<$crate::types::NodeId> {
                        self.$arena.allocate(node)
                    }

                    pub(crate) fn [<free_ $kind>](
                        &mut self,
                        id: $crate::types::NodeId,
                    ) -> $crate::error::TreeResult<$node<T>> {
                        self.$arena.deallocate(id).ok_or_else(|| {
                            $crate::error::BPlusTreeError::arena_error(
                                concat!(stringify!($kind), " deallocation"),
                                &format!("node {} is not allocated", id),
                            )
                        })
                    }
                )*
            }
        }
    };
}

pub(crate) use arena_accessors;
