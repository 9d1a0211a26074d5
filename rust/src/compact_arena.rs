//! Compact arena holding tree nodes addressed by stable `NodeId`s.
//! Uses `Vec<T>` with an allocation mask instead of `Vec<Option<T>>`.

use crate::error::{BPlusTreeError, BTreeResult};
use crate::types::{NodeId, NULL_NODE};
use std::convert::TryFrom;

/// Statistics for a compact arena
#[derive(Debug, Clone, Copy)]
pub struct CompactArenaStats {
    pub total_capacity: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub utilization: f64,
    pub fragmentation: f64,
}

/// Slab allocator with a free list; freed slots are reused by later allocations.
#[derive(Debug)]
pub struct CompactArena<T> {
    storage: Vec<T>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
    /// Track which slots are actually allocated
    allocated_mask: Vec<bool>,
}

impl<T> CompactArena<T> {
    /// Create a new empty compact arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            allocated_mask: Vec::new(),
        }
    }

    /// Create a new compact arena with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            allocated_mask: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a new item in the arena and return its ID
    #[inline]
    pub fn allocate(&mut self, item: T) -> BTreeResult<NodeId> {
        if let Some(free_index) = self.free_list.pop() {
            self.storage[free_index] = item;
            self.allocated_mask[free_index] = true;
            return Self::to_node_id(free_index);
        }

        let index = self.storage.len();
        // NULL_NODE is reserved, so the last representable slot is u32::MAX - 1.
        let id = Self::to_node_id(index)?;
        self.storage.push(item);
        self.allocated_mask.push(true);
        Ok(id)
    }

    fn to_node_id(index: usize) -> BTreeResult<NodeId> {
        match NodeId::try_from(index) {
            Ok(id) if id != NULL_NODE => Ok(id),
            _ => Err(BPlusTreeError::arena_error(
                "Allocation",
                &format!("slot {} does not fit in a NodeId", index),
            )),
        }
    }

    fn allocated_index(&self, id: NodeId) -> Option<usize> {
        if id == NULL_NODE {
            return None;
        }
        let index = usize::try_from(id).ok()?;
        self.allocated_mask
            .get(index)
            .copied()
            .unwrap_or(false)
            .then_some(index)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.allocated_index(id).map(|index| &self.storage[index])
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let index = self.allocated_index(id)?;
        Some(&mut self.storage[index])
    }

    /// Check if an ID is valid and allocated
    pub fn contains(&self, id: NodeId) -> bool {
        self.allocated_index(id).is_some()
    }

    /// Get arena statistics
    pub fn stats(&self) -> CompactArenaStats {
        let total_capacity = self.storage.capacity();
        let allocated_count = self.allocated_count();
        let free_count = self.free_list.len();
        let utilization = if total_capacity > 0 {
            allocated_count as f64 / total_capacity as f64
        } else {
            0.0
        };
        let fragmentation = if allocated_count > 0 {
            free_count as f64 / (allocated_count + free_count) as f64
        } else {
            0.0
        };

        CompactArenaStats {
            total_capacity,
            allocated_count,
            free_count,
            utilization,
            fragmentation,
        }
    }

    /// Get the number of allocated items
    pub fn allocated_count(&self) -> usize {
        self.allocated_mask
            .iter()
            .filter(|&&allocated| allocated)
            .count()
    }

    /// Check if the arena holds no allocated items
    pub fn is_empty(&self) -> bool {
        self.allocated_count() == 0
    }

    /// Get the number of free slots
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Clear all items from the arena
    pub fn clear(&mut self) {
        self.storage.clear();
        self.allocated_mask.clear();
        self.free_list.clear();
    }
}

impl<T> Default for CompactArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> CompactArena<T> {
    /// Deallocate an item, returning it and leaving a default value in the slot.
    #[inline]
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let index = self.allocated_index(id)?;
        self.allocated_mask[index] = false;
        self.free_list.push(index);
        Some(std::mem::take(&mut self.storage[index]))
    }
}
