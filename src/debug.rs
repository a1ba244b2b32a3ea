//! Human-readable dump of a tree: `name:type(value)` for scalars, `name:message{...}` and
//! `name:array[...]` for containers. Diagnostic only; there is no decoder.

use core::fmt;

use crate::node::{NodeId, Payload, ROOT_NAME};
use crate::store::NodeAlloc;
use crate::wire::Sink;
use crate::{Error, Tree};

/// `Display` adapter returned by [`Tree::dump`].
pub struct Dump<'t, A: NodeAlloc> {
    tree: &'t Tree<A>,
    id: NodeId,
}

impl<A: NodeAlloc> fmt::Display for Dump<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self.tree, self.id, f)
    }
}

impl<A: NodeAlloc> Tree<A> {
    /// Render `id` and its subtree for diagnostics.
    #[must_use]
    pub const fn dump(&self, id: NodeId) -> Dump<'_, A> {
        Dump { tree: self, id }
    }
}

fn render<A: NodeAlloc, W: fmt::Write>(tree: &Tree<A>, id: NodeId, w: &mut W) -> fmt::Result {
    let Ok(node) = tree.node(id) else {
        return w.write_str("<invalid>");
    };
    let name = node.name();
    if !name.is_empty() && name != ROOT_NAME {
        write!(w, "{name}:")?;
    }
    let label = node.node_type().label();
    match &node.payload {
        Payload::Integer(v) => write!(w, "{label}({v})"),
        Payload::Float(v) => write!(w, "{label}({v})"),
        Payload::Boolean(v) => write!(w, "{label}({v})"),
        Payload::String(s) | Payload::Cert(s) => write!(w, "{label}({s:?})"),
        Payload::Null => write!(w, "{label}()"),
        Payload::Message(slots) => {
            write!(w, "{label}{{")?;
            render_children(tree, slots, w)?;
            w.write_char('}')
        }
        Payload::Array(slots) => {
            write!(w, "{label}[")?;
            render_children(tree, slots, w)?;
            w.write_char(']')
        }
    }
}

fn render_children<A: NodeAlloc, W: fmt::Write>(
    tree: &Tree<A>,
    slots: &[NodeId],
    w: &mut W,
) -> fmt::Result {
    for (i, &child) in slots.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        render(tree, child, w)?;
    }
    Ok(())
}

struct SinkWriter<'s, S: Sink> {
    sink: &'s mut S,
    err: Option<Error>,
}

impl<S: Sink> fmt::Write for SinkWriter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.sink.write(s.as_bytes()).map_err(|err| {
            self.err = Some(err);
            fmt::Error
        })
    }
}

pub(crate) fn encode<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    sink: &mut S,
) -> Result<(), Error> {
    tree.node(id)?;
    let mut w = SinkWriter { sink, err: None };
    match render(tree, id, &mut w) {
        Ok(()) => Ok(()),
        Err(_) => Err(w
            .err
            .unwrap_or_else(|| Error::code_only(crate::ErrorCode::OutOfMemory))),
    }
}
