//! Path-addressed accessors over `Message` fields and `Array` slots.
//!
//! Every operation is relative to a container node plus a field name or index. Fields are
//! found by exact name with a linear scan of the occupied slots; arrays are gap-free, so
//! their size is simply the number of occupied slots.

use core::mem;

use crate::node::{Node, NodeId, NodeType, Payload};
use crate::store::NodeAlloc;
use crate::{Error, ErrorCode, Tree};

/// A value to store in a field or array slot.
///
/// `Message` and `Array` create empty containers. `Node` deep-copies an existing node
/// (and its subtree) into the target; the caller keeps ownership of the original and must
/// destroy it separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// 32-bit signed integer.
    Integer(i32),
    /// 32-bit float.
    Float(f32),
    /// Boolean.
    Boolean(bool),
    /// Ordinary string.
    String(&'a str),
    /// Certificate-sized string.
    Cert(&'a str),
    /// Typed placeholder without a value.
    Null,
    /// Empty `Message`.
    Message,
    /// Empty `Array`.
    Array,
    /// Deep copy of an existing node.
    Node(NodeId),
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Self::String(v)
    }
}

impl From<NodeId> for Value<'_> {
    fn from(v: NodeId) -> Self {
        Self::Node(v)
    }
}

fn precondition() -> Error {
    Error::code_only(ErrorCode::PreconditionFailed)
}

fn read_int(node: &Node) -> Result<i32, Error> {
    match node.payload {
        Payload::Integer(v) => Ok(v),
        // Truncates toward zero, saturating at the i32 range.
        #[allow(clippy::cast_possible_truncation)]
        Payload::Float(v) => Ok(v as i32),
        _ => Err(precondition()),
    }
}

fn read_float(node: &Node) -> Result<f32, Error> {
    match node.payload {
        Payload::Float(v) => Ok(v),
        #[allow(clippy::cast_precision_loss)]
        Payload::Integer(v) => Ok(v as f32),
        _ => Err(precondition()),
    }
}

fn read_bool(node: &Node) -> Result<bool, Error> {
    match node.payload {
        Payload::Boolean(v) => Ok(v),
        _ => Err(precondition()),
    }
}

fn read_str(node: &Node) -> Result<&str, Error> {
    match &node.payload {
        Payload::String(s) => Ok(s),
        _ => Err(precondition()),
    }
}

fn read_cert(node: &Node) -> Result<&str, Error> {
    match &node.payload {
        Payload::Cert(s) => Ok(s),
        _ => Err(precondition()),
    }
}

impl<A: NodeAlloc> Tree<A> {
    fn message_slots(&self, parent: NodeId) -> Result<&[NodeId], Error> {
        match &self.node(parent)?.payload {
            Payload::Message(slots) => Ok(slots),
            _ => Err(precondition()),
        }
    }

    fn array_slots(&self, array: NodeId) -> Result<&[NodeId], Error> {
        match &self.node(array)?.payload {
            Payload::Array(slots) => Ok(slots),
            _ => Err(precondition()),
        }
    }

    fn find(&self, parent: NodeId, name: &str) -> Result<Option<usize>, Error> {
        for (i, &child) in self.message_slots(parent)?.iter().enumerate() {
            if self.node(child)?.name() == name {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Install `child` at `pos` (or append) and release whatever it replaced.
    fn install(&mut self, parent: NodeId, pos: Option<usize>, child: NodeId) -> Result<(), Error> {
        let replaced = match &mut self.node_mut(parent)?.payload {
            Payload::Message(slots) | Payload::Array(slots) => match pos {
                Some(i) => Some(mem::replace(&mut slots[i], child)),
                None => {
                    slots.push(child);
                    None
                }
            },
            _ => None,
        };
        if let Some(old) = replaced {
            self.release(old);
        }
        Ok(())
    }

    /// Returns `true` if `parent` has a field called `name`.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if `parent` is not a `Message`.
    pub fn has(&self, parent: NodeId, name: &str) -> Result<bool, Error> {
        Ok(self.find(parent, name)?.is_some())
    }

    /// Look up the field `name` of `parent`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` if `parent` is not a `Message`.
    pub fn get(&self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        let pos = self
            .find(parent, name)?
            .ok_or_else(|| Error::code_only(ErrorCode::NotFound))?;
        Ok(self.message_slots(parent)?[pos])
    }

    /// Store `value` under `name`, replacing any existing field of that name in place.
    ///
    /// The new child is built before the old one is released, so a failed `set` leaves
    /// `parent` unchanged. Returns the handle of the stored child.
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` when `parent` has no free slot or a name/string exceeds its
    /// limit, `PreconditionFailed` if `parent` is not a `Message`.
    pub fn set(&mut self, parent: NodeId, name: &str, value: Value<'_>) -> Result<NodeId, Error> {
        self.limits.check_name(name)?;
        let pos = self.find(parent, name)?;
        if pos.is_none() && self.message_slots(parent)?.len() >= self.limits.max_branches {
            return Err(Error::code_only(ErrorCode::PayloadTooLarge));
        }
        let child = self.build(name, value)?;
        self.install(parent, pos, child)?;
        Ok(child)
    }

    /// Store an integer field.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_int(&mut self, parent: NodeId, name: &str, v: i32) -> Result<(), Error> {
        self.set(parent, name, Value::Integer(v)).map(drop)
    }

    /// Store a float field.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_float(&mut self, parent: NodeId, name: &str, v: f32) -> Result<(), Error> {
        self.set(parent, name, Value::Float(v)).map(drop)
    }

    /// Store a boolean field.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_bool(&mut self, parent: NodeId, name: &str, v: bool) -> Result<(), Error> {
        self.set(parent, name, Value::Boolean(v)).map(drop)
    }

    /// Store a string field.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_str(&mut self, parent: NodeId, name: &str, v: &str) -> Result<(), Error> {
        self.set(parent, name, Value::String(v)).map(drop)
    }

    /// Store a certificate field.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_cert(&mut self, parent: NodeId, name: &str, v: &str) -> Result<(), Error> {
        self.set(parent, name, Value::Cert(v)).map(drop)
    }

    /// Store a `Null` placeholder.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_null(&mut self, parent: NodeId, name: &str) -> Result<(), Error> {
        self.set(parent, name, Value::Null).map(drop)
    }

    /// Store a new empty `Message` under `name` and return it for in-place population.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_message(&mut self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        self.set(parent, name, Value::Message)
    }

    /// Store a new empty `Array` under `name` and return it for in-place population.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_array(&mut self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        self.set(parent, name, Value::Array)
    }

    /// Deep-copy `src` under `name`. `src` stays owned by the caller.
    ///
    /// # Errors
    ///
    /// See [`Tree::set`].
    pub fn set_node(&mut self, parent: NodeId, name: &str, src: NodeId) -> Result<NodeId, Error> {
        self.set(parent, name, Value::Node(src))
    }

    /// Read an integer field; a `Float` field is truncated.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` on any other type.
    pub fn get_int(&self, parent: NodeId, name: &str) -> Result<i32, Error> {
        read_int(self.node(self.get(parent, name)?)?)
    }

    /// Read a float field; an `Integer` field is widened.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` on any other type.
    pub fn get_float(&self, parent: NodeId, name: &str) -> Result<f32, Error> {
        read_float(self.node(self.get(parent, name)?)?)
    }

    /// Read a boolean field.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` on any other type.
    pub fn get_bool(&self, parent: NodeId, name: &str) -> Result<bool, Error> {
        read_bool(self.node(self.get(parent, name)?)?)
    }

    /// Read a string field.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` on any other type.
    pub fn get_str(&self, parent: NodeId, name: &str) -> Result<&str, Error> {
        read_str(self.node(self.get(parent, name)?)?)
    }

    /// Read a certificate field.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` on any other type.
    pub fn get_cert(&self, parent: NodeId, name: &str) -> Result<&str, Error> {
        read_cert(self.node(self.get(parent, name)?)?)
    }

    /// Look up a `Message` field.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` if the field is another type.
    pub fn get_message(&self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        self.typed(self.get(parent, name)?, NodeType::Message)
    }

    /// Look up an `Array` field.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `PreconditionFailed` if the field is another type.
    pub fn get_array(&self, parent: NodeId, name: &str) -> Result<NodeId, Error> {
        self.typed(self.get(parent, name)?, NodeType::Array)
    }

    fn typed(&self, id: NodeId, ty: NodeType) -> Result<NodeId, Error> {
        if self.node(id)?.node_type() == ty {
            Ok(id)
        } else {
            Err(precondition())
        }
    }

    /// Number of occupied slots of a container. For arrays this is the length.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` for scalar nodes.
    pub fn size(&self, container: NodeId) -> Result<usize, Error> {
        Ok(self.slots(container)?.len())
    }

    /// Element `index` of `array`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` past the end, `PreconditionFailed` if `array` is not an `Array`.
    pub fn get_at(&self, array: NodeId, index: usize) -> Result<NodeId, Error> {
        self.array_slots(array)?
            .get(index)
            .copied()
            .ok_or_else(|| Error::code_only(ErrorCode::NotFound))
    }

    /// Read an integer element; a `Float` element is truncated.
    ///
    /// # Errors
    ///
    /// See [`Tree::get_at`]; `PreconditionFailed` on a type mismatch.
    pub fn get_int_at(&self, array: NodeId, index: usize) -> Result<i32, Error> {
        read_int(self.node(self.get_at(array, index)?)?)
    }

    /// Read a float element; an `Integer` element is widened.
    ///
    /// # Errors
    ///
    /// See [`Tree::get_at`]; `PreconditionFailed` on a type mismatch.
    pub fn get_float_at(&self, array: NodeId, index: usize) -> Result<f32, Error> {
        read_float(self.node(self.get_at(array, index)?)?)
    }

    /// Read a boolean element.
    ///
    /// # Errors
    ///
    /// See [`Tree::get_at`]; `PreconditionFailed` on a type mismatch.
    pub fn get_bool_at(&self, array: NodeId, index: usize) -> Result<bool, Error> {
        read_bool(self.node(self.get_at(array, index)?)?)
    }

    /// Read a string element.
    ///
    /// # Errors
    ///
    /// See [`Tree::get_at`]; `PreconditionFailed` on a type mismatch.
    pub fn get_str_at(&self, array: NodeId, index: usize) -> Result<&str, Error> {
        read_str(self.node(self.get_at(array, index)?)?)
    }

    /// Write `value` at `index`. Writing at `size()` appends; writing further out would
    /// open a gap and is rejected.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for `index > size()`, `PayloadTooLarge` when appending to a
    /// full array, `PreconditionFailed` if `array` is not an `Array`.
    pub fn set_at(&mut self, array: NodeId, index: usize, value: Value<'_>) -> Result<NodeId, Error> {
        let size = self.array_slots(array)?.len();
        let pos = match index {
            i if i < size => Some(i),
            i if i == size => {
                if size >= self.limits.max_branches {
                    return Err(Error::code_only(ErrorCode::PayloadTooLarge));
                }
                None
            }
            _ => return Err(Error::code_only(ErrorCode::IndexOutOfRange)),
        };
        let child = self.build("", value)?;
        self.install(array, pos, child)?;
        Ok(child)
    }

    /// Append `value` to `array`.
    ///
    /// # Errors
    ///
    /// See [`Tree::set_at`].
    pub fn push(&mut self, array: NodeId, value: Value<'_>) -> Result<NodeId, Error> {
        let size = self.array_slots(array)?.len();
        self.set_at(array, size, value)
    }

    /// Clear slot `index`. Only the last element may be cleared; clearing any other slot would
    /// leave a gap.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` past the end, `BadRequest` for a non-final element,
    /// `PreconditionFailed` if `array` is not an `Array`.
    pub fn remove_at(&mut self, array: NodeId, index: usize) -> Result<(), Error> {
        let size = self.array_slots(array)?.len();
        if index >= size {
            return Err(Error::code_only(ErrorCode::NotFound));
        }
        if index + 1 != size {
            return Err(Error::code_only(ErrorCode::BadRequest));
        }
        let removed = match &mut self.node_mut(array)?.payload {
            Payload::Array(slots) => slots.pop(),
            _ => None,
        };
        if let Some(old) = removed {
            self.release(old);
        }
        Ok(())
    }

    /// Iterate the fields of a `Message` as `(name, handle)` in slot order.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if `parent` is not a `Message`.
    pub fn fields(
        &self,
        parent: NodeId,
    ) -> Result<impl Iterator<Item = (&str, NodeId)> + '_, Error> {
        let slots = self.message_slots(parent)?;
        Ok(slots
            .iter()
            .filter_map(move |&id| self.store.get(id).map(|n| (n.name(), id))))
    }

    /// Iterate the elements of an `Array` in order.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if `array` is not an `Array`.
    pub fn elements(&self, array: NodeId) -> Result<impl Iterator<Item = NodeId> + '_, Error> {
        Ok(self.array_slots(array)?.iter().copied())
    }
}
