//! Node ownership: creation, deep copy, reference counting and destruction.

use alloc::boxed::Box;

use crate::access::Value;
use crate::alloc_util::{try_box_str, try_vec_with_capacity};
use crate::node::{Node, NodeId, NodeType, Payload, ROOT_NAME};
use crate::store::{HeapAlloc, NodeAlloc, PoolAlloc};
use crate::{Error, ErrorCode, Limits};

/// An arena of message-tree nodes.
///
/// A `Tree` owns every node it hands out as a [`NodeId`]. Nodes are created through the
/// accessor layer (or [`Tree::create`] for roots) and released explicitly with
/// [`Tree::destroy`]; there is no implicit collection. Each node carries a reference count:
/// `destroy` only frees a node once its count reaches zero, and freeing a container destroys
/// each of its children the same way.
///
/// The tree is single-threaded. Share it across threads only behind external
/// synchronisation.
#[derive(Debug)]
pub struct Tree<A: NodeAlloc = HeapAlloc> {
    pub(crate) store: A,
    pub(crate) limits: Limits,
}

impl Tree<HeapAlloc> {
    /// Create a heap-backed tree with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_limits(Limits {
            max_name_len: crate::limits::DEFAULT_MAX_NAME_LEN,
            max_branches: crate::limits::DEFAULT_MAX_BRANCHES,
            max_string_len: crate::limits::DEFAULT_MAX_STRING_LEN,
            max_cert_len: crate::limits::DEFAULT_MAX_CERT_LEN,
            max_depth: crate::limits::DEFAULT_MAX_DEPTH,
        })
    }

    /// Create a heap-backed tree with explicit limits.
    #[must_use]
    pub const fn with_limits(limits: Limits) -> Self {
        Self {
            store: HeapAlloc::new(),
            limits,
        }
    }
}

impl Default for Tree<HeapAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree<PoolAlloc> {
    /// Create a tree backed by a fixed pool of `capacity` nodes.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a zero capacity, `OutOfMemory` if the pool cannot be
    /// allocated.
    pub fn with_pool(capacity: usize, limits: Limits) -> Result<Self, Error> {
        Ok(Self {
            store: PoolAlloc::with_capacity(capacity)?,
            limits,
        })
    }
}

impl<A: NodeAlloc> Tree<A> {
    /// Create a tree over a caller-provided allocator.
    #[must_use]
    pub const fn from_store(store: A, limits: Limits) -> Self {
        Self { store, limits }
    }

    /// Limits applied to this tree.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Number of nodes currently allocated.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.store.live()
    }

    /// Borrow a node.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a stale or foreign handle.
    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.store
            .get(id)
            .ok_or_else(|| Error::code_only(ErrorCode::PreconditionFailed))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.store
            .get_mut(id)
            .ok_or_else(|| Error::code_only(ErrorCode::PreconditionFailed))
    }

    /// Type tag of a node.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a stale handle.
    pub fn node_type(&self, id: NodeId) -> Result<NodeType, Error> {
        Ok(self.node(id)?.node_type())
    }

    /// Allocate an empty root `Message` with one reference.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` when the allocator is exhausted.
    pub fn create(&mut self) -> Result<NodeId, Error> {
        self.create_root(Value::Message)
    }

    /// Allocate a root of any type. Decoders use this for array and scalar documents.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` when the allocator is exhausted, `PayloadTooLarge` if a string
    /// exceeds its limit.
    pub fn create_root(&mut self, value: Value<'_>) -> Result<NodeId, Error> {
        self.build(ROOT_NAME, value)
    }

    /// Deep-copy `id` (type, name, value and every descendant) into a new node with one
    /// reference. The original is untouched and remains owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a stale handle and `OutOfMemory` on exhaustion. A
    /// failed copy leaves nothing allocated.
    pub fn create_copy(&mut self, id: NodeId) -> Result<NodeId, Error> {
        let name = try_box_str(self.node(id)?.name())?;
        self.copy_as(id, name)
    }

    /// Take an additional reference to `id`.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a stale handle.
    pub fn retain(&mut self, id: NodeId) -> Result<(), Error> {
        let node = self.node_mut(id)?;
        node.refs = node.refs.saturating_add(1);
        Ok(())
    }

    /// Drop one reference to `id`. When the count reaches zero the node is freed and each of
    /// its children is destroyed in turn.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for a stale handle.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), Error> {
        self.node(id)?;
        self.release(id);
        Ok(())
    }

    pub(crate) fn release(&mut self, id: NodeId) {
        let Some(node) = self.store.get_mut(id) else {
            return;
        };
        if node.refs > 1 {
            node.refs -= 1;
            return;
        }
        let Some(node) = self.store.free(id) else {
            return;
        };
        if let Some(children) = node.payload.slots() {
            for &child in children {
                self.release(child);
            }
        }
    }

    /// Allocate a fresh node named `name` holding `value`.
    pub(crate) fn build(&mut self, name: &str, value: Value<'_>) -> Result<NodeId, Error> {
        let name = try_box_str(name)?;
        let payload = match value {
            Value::Integer(v) => Payload::Integer(v),
            Value::Float(v) => Payload::Float(v),
            Value::Boolean(v) => Payload::Boolean(v),
            Value::String(s) => {
                if s.len() > self.limits.max_string_len {
                    return Err(Error::code_only(ErrorCode::PayloadTooLarge));
                }
                Payload::String(try_box_str(s)?)
            }
            Value::Cert(s) => {
                if s.len() > self.limits.max_cert_len {
                    return Err(Error::code_only(ErrorCode::PayloadTooLarge));
                }
                Payload::Cert(try_box_str(s)?)
            }
            Value::Null => Payload::Null,
            Value::Message => Payload::Message(try_vec_with_capacity(self.limits.max_branches)?),
            Value::Array => Payload::Array(try_vec_with_capacity(self.limits.max_branches)?),
            Value::Node(src) => return self.copy_as(src, name),
        };
        self.store.alloc(Node::new(name, payload))
    }

    fn copy_as(&mut self, src: NodeId, name: Box<str>) -> Result<NodeId, Error> {
        let payload = match &self.node(src)?.payload {
            Payload::Integer(v) => Payload::Integer(*v),
            Payload::Float(v) => Payload::Float(*v),
            Payload::Boolean(v) => Payload::Boolean(*v),
            Payload::String(s) => Payload::String(try_box_str(s)?),
            Payload::Cert(s) => Payload::Cert(try_box_str(s)?),
            Payload::Null => Payload::Null,
            Payload::Message(_) => Payload::Message(try_vec_with_capacity(self.limits.max_branches)?),
            Payload::Array(_) => Payload::Array(try_vec_with_capacity(self.limits.max_branches)?),
        };
        let is_container = payload.node_type().is_container();
        let copy = self.store.alloc(Node::new(name, payload))?;
        if is_container {
            if let Err(err) = self.copy_children(src, copy) {
                self.release(copy);
                return Err(err);
            }
        }
        Ok(copy)
    }

    fn copy_children(&mut self, src: NodeId, dst: NodeId) -> Result<(), Error> {
        let count = self.node(src)?.len();
        for i in 0..count {
            let child = self.slots(src)?[i];
            let name = try_box_str(self.node(child)?.name())?;
            let copied = self.copy_as(child, name)?;
            match &mut self.node_mut(dst)?.payload {
                Payload::Message(slots) | Payload::Array(slots) => slots.push(copied),
                _ => {
                    self.release(copied);
                    return Err(Error::code_only(ErrorCode::PreconditionFailed));
                }
            }
        }
        Ok(())
    }

    /// Children of a container, in slot order.
    pub(crate) fn slots(&self, id: NodeId) -> Result<&[NodeId], Error> {
        self.node(id)?
            .payload
            .slots()
            .ok_or_else(|| Error::code_only(ErrorCode::PreconditionFailed))
    }
}
