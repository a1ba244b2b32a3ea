//! Node storage strategies.
//!
//! A [`Tree`](crate::Tree) never allocates nodes itself; it goes through a [`NodeAlloc`].
//! Two strategies ship with the crate and behave identically apart from exhaustion:
//!
//! - [`HeapAlloc`] grows on demand (dynamic per-node allocation).
//! - [`PoolAlloc`] is sized once, scans linearly for a free slot and reports `OutOfMemory`
//!   when full instead of growing.

use alloc::vec::Vec;

use crate::alloc_util::{try_reserve, try_vec_with_capacity};
use crate::node::{Node, NodeId};
use crate::{Error, ErrorCode};

/// Storage backend for tree nodes.
pub trait NodeAlloc {
    /// Store `node` and return its handle.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if no slot can be provided.
    fn alloc(&mut self, node: Node) -> Result<NodeId, Error>;

    /// Remove and return the node behind `id`; `None` for a stale handle.
    fn free(&mut self, id: NodeId) -> Option<Node>;

    /// Borrow the node behind `id`; `None` for a stale handle.
    fn get(&self, id: NodeId) -> Option<&Node>;

    /// Mutably borrow the node behind `id`; `None` for a stale handle.
    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    /// Number of live nodes.
    fn live(&self) -> usize;
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

impl Slot {
    fn occupy(&mut self, index: usize, node: Node) -> Result<NodeId, Error> {
        let index = u32::try_from(index).map_err(|_| Error::code_only(ErrorCode::OutOfMemory))?;
        self.node = Some(node);
        Ok(NodeId {
            index,
            generation: self.generation,
        })
    }

    fn vacate(&mut self, generation: u32) -> Option<Node> {
        if self.generation != generation {
            return None;
        }
        let node = self.node.take()?;
        self.generation = self.generation.wrapping_add(1);
        Some(node)
    }

    fn get(&self, generation: u32) -> Option<&Node> {
        if self.generation != generation {
            return None;
        }
        self.node.as_ref()
    }

    fn get_mut(&mut self, generation: u32) -> Option<&mut Node> {
        if self.generation != generation {
            return None;
        }
        self.node.as_mut()
    }
}

fn slot_index(id: NodeId) -> usize {
    id.index as usize
}

/// Growable slab with a free list.
#[derive(Debug, Default)]
pub struct HeapAlloc {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl HeapAlloc {
    /// Create an empty allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl NodeAlloc for HeapAlloc {
    fn alloc(&mut self, node: Node) -> Result<NodeId, Error> {
        let index = if let Some(index) = self.free.pop() {
            index as usize
        } else {
            try_reserve(&mut self.slots, 1, 0)?;
            // The free list never holds more entries than there are slots.
            try_reserve(&mut self.free, self.slots.len() + 1, 0)?;
            self.slots.push(Slot::default());
            self.slots.len() - 1
        };
        let id = self.slots[index].occupy(index, node)?;
        self.live += 1;
        Ok(id)
    }

    fn free(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(slot_index(id))?.vacate(id.generation)?;
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(slot_index(id))?.get(id.generation)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(slot_index(id))?.get_mut(id.generation)
    }

    fn live(&self) -> usize {
        self.live
    }
}

/// Fixed-size node pool.
///
/// All slots are allocated up front; `alloc` scans for the first free one.
#[derive(Debug)]
pub struct PoolAlloc {
    slots: Vec<Slot>,
    live: usize,
}

impl PoolAlloc {
    /// Create a pool holding at most `capacity` nodes.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a zero capacity and `OutOfMemory` if the slot table
    /// itself cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 || u32::try_from(capacity).is_err() {
            return Err(Error::code_only(ErrorCode::PreconditionFailed));
        }
        let mut slots = try_vec_with_capacity(capacity)?;
        slots.resize_with(capacity, Slot::default);
        Ok(Self { slots, live: 0 })
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl NodeAlloc for PoolAlloc {
    fn alloc(&mut self, node: Node) -> Result<NodeId, Error> {
        let Some(index) = self.slots.iter().position(|s| s.node.is_none()) else {
            tracing::warn!(capacity = self.slots.len(), "node pool exhausted");
            return Err(Error::code_only(ErrorCode::OutOfMemory));
        };
        let id = self.slots[index].occupy(index, node)?;
        self.live += 1;
        Ok(id)
    }

    fn free(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(slot_index(id))?.vacate(id.generation)?;
        self.live -= 1;
        Some(node)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(slot_index(id))?.get(id.generation)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(slot_index(id))?.get_mut(id.generation)
    }

    fn live(&self) -> usize {
        self.live
    }
}
