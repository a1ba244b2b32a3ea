use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Name carried by root nodes. It is never emitted as a key by any encoder.
pub const ROOT_NAME: &str = "$root";

/// The type tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// 32-bit signed integer.
    Integer,
    /// 32-bit float.
    Float,
    /// Boolean.
    Boolean,
    /// UTF-8 string bounded by `Limits::max_string_len`.
    String,
    /// UTF-8 string bounded by the larger `Limits::max_cert_len` (certificates).
    Cert,
    /// Named children.
    Message,
    /// Positionally addressed children.
    Array,
    /// Typed placeholder without a value (JSON/CBOR `null`).
    Null,
}

impl NodeType {
    /// Short lower-case label used by the debug rendering.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Float => "float",
            Self::Boolean => "bool",
            Self::String => "string",
            Self::Cert => "cert",
            Self::Message => "message",
            Self::Array => "array",
            Self::Null => "null",
        }
    }

    /// Returns `true` for `Message` and `Array`.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Message | Self::Array)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Handle to a node owned by a [`Tree`](crate::Tree).
///
/// Handles carry a generation so a handle kept past `destroy` is reported as
/// `PreconditionFailed` rather than silently aliasing a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Stored node value. Scalars live inline; strings own an exactly-sized buffer; containers own
/// a slot table whose capacity is `Limits::max_branches` and which is always gap-free.
#[derive(Debug)]
pub(crate) enum Payload {
    Integer(i32),
    Float(f32),
    Boolean(bool),
    String(Box<str>),
    Cert(Box<str>),
    Message(Vec<NodeId>),
    Array(Vec<NodeId>),
    Null,
}

impl Payload {
    pub(crate) const fn node_type(&self) -> NodeType {
        match self {
            Self::Integer(_) => NodeType::Integer,
            Self::Float(_) => NodeType::Float,
            Self::Boolean(_) => NodeType::Boolean,
            Self::String(_) => NodeType::String,
            Self::Cert(_) => NodeType::Cert,
            Self::Message(_) => NodeType::Message,
            Self::Array(_) => NodeType::Array,
            Self::Null => NodeType::Null,
        }
    }

    pub(crate) fn slots(&self) -> Option<&[NodeId]> {
        match self {
            Self::Message(s) | Self::Array(s) => Some(s),
            _ => None,
        }
    }
}

/// A single typed node in a message tree.
#[derive(Debug)]
pub struct Node {
    pub(crate) name: Box<str>,
    pub(crate) refs: u32,
    pub(crate) payload: Payload,
}

impl Node {
    pub(crate) const fn new(name: Box<str>, payload: Payload) -> Self {
        Self {
            name,
            refs: 1,
            payload,
        }
    }

    /// Field name (`ROOT_NAME` for roots, empty for array elements).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        self.payload.node_type()
    }

    /// Current reference count.
    #[must_use]
    pub const fn refs(&self) -> u32 {
        self.refs
    }

    /// Number of occupied child slots (0 for scalars).
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.slots().map_or(0, <[NodeId]>::len)
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The integer value, if this is an `Integer` node.
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self.payload {
            Payload::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// The float value, if this is a `Float` node.
    #[must_use]
    pub const fn as_float(&self) -> Option<f32> {
        match self.payload {
            Payload::Float(v) => Some(v),
            _ => None,
        }
    }

    /// The boolean value, if this is a `Boolean` node.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// The text, if this is a `String` or `Cert` node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::String(s) | Payload::Cert(s) => Some(s),
            _ => None,
        }
    }
}
