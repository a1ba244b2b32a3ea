//! Structural CBOR mapping of the tree.
//!
//! `Message` → map keyed by field name, `Array` → array, scalars → int/float32/bool/text/null.
//! The walkers here are shared with the compact codec: with `COMPACT = true` the fields of the
//! root message (depth 1) are handed to [`crate::tscbor`] for dictionary substitution and
//! everything deeper is plain structural CBOR.

use crate::access::Value;
use crate::node::{NodeId, Payload};
use crate::store::NodeAlloc;
use crate::tscbor;
use crate::wire::{self, Cursor, Item, Sink, MAJOR_ARRAY, MAJOR_MAP};
use crate::{Error, ErrorCode, Limits, Tree};

/// Encode `id`, which sits at `depth` below the root. Containers deeper than
/// `max_depth` are `PayloadTooLarge`, matching what the decoder accepts.
pub(crate) fn encode_node<const COMPACT: bool, A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    depth: usize,
    sink: &mut S,
) -> Result<(), Error> {
    match &tree.node(id)?.payload {
        Payload::Integer(v) => wire::encode_int(sink, *v),
        Payload::Float(v) => wire::encode_f32(sink, *v),
        Payload::Boolean(v) => wire::encode_bool(sink, *v),
        Payload::String(s) | Payload::Cert(s) => wire::encode_text(sink, s),
        Payload::Null => wire::encode_null(sink),
        Payload::Message(slots) => {
            tree.limits().check_depth(depth, 0)?;
            wire::encode_len(sink, MAJOR_MAP, slots.len())?;
            for &child in slots {
                if COMPACT && depth == 0 {
                    tscbor::encode_field(tree, child, sink)?;
                } else {
                    wire::encode_text(sink, tree.node(child)?.name())?;
                    encode_node::<COMPACT, A, S>(tree, child, depth + 1, sink)?;
                }
            }
            Ok(())
        }
        Payload::Array(slots) => {
            tree.limits().check_depth(depth, 0)?;
            wire::encode_len(sink, MAJOR_ARRAY, slots.len())?;
            for &child in slots {
                encode_node::<COMPACT, A, S>(tree, child, depth + 1, sink)?;
            }
            Ok(())
        }
    }
}

pub(crate) fn encode<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    sink: &mut S,
) -> Result<(), Error> {
    encode_node::<false, A, S>(tree, id, 0, sink)
}

/// Map a self-describing CBOR item onto a node value. Containers map to empty
/// `Message`/`Array` nodes that the walker then fills.
pub(crate) fn value_of<'a>(item: Item<'a>, off: usize, limits: &Limits) -> Result<Value<'a>, Error> {
    if let Some(v) = item.as_i32(off)? {
        return Ok(Value::Integer(v));
    }
    match item {
        Item::Text(s) if s.len() > limits.max_string_len => Ok(Value::Cert(s)),
        Item::Text(s) => Ok(Value::String(s)),
        Item::Float(v) => Ok(Value::Float(v)),
        Item::Bool(v) => Ok(Value::Boolean(v)),
        Item::Null => Ok(Value::Null),
        Item::Map(_) => Ok(Value::Message),
        Item::Array(_) => Ok(Value::Array),
        Item::Bytes(_) | Item::Unsigned(_) | Item::Negative(_) => {
            Err(Error::new(ErrorCode::NotImplemented, off))
        }
    }
}

/// Decode a single top-level item into a fresh root. A partially built tree is destroyed on
/// failure.
pub(crate) fn decode_root<const COMPACT: bool, A: NodeAlloc>(
    tree: &mut Tree<A>,
    bytes: &[u8],
) -> Result<NodeId, Error> {
    let limits = *tree.limits();
    let mut cur = Cursor::new(bytes);
    let off = cur.position();
    let item = cur.next_item()?;
    let root = tree
        .create_root(value_of(item, off, &limits)?)
        .map_err(|e| e.or_at(off))?;
    let res = fill::<COMPACT, A>(tree, &mut cur, root, item, off, 0).and_then(|()| cur.finish());
    if let Err(err) = res {
        tree.release(root);
        return Err(err);
    }
    Ok(root)
}

pub(crate) fn decode<A: NodeAlloc>(tree: &mut Tree<A>, bytes: &[u8]) -> Result<NodeId, Error> {
    decode_root::<false, A>(tree, bytes)
}

/// Populate `node` (at `depth`) from the container header `item` read at `off`.
fn fill<const COMPACT: bool, A: NodeAlloc>(
    tree: &mut Tree<A>,
    cur: &mut Cursor<'_>,
    node: NodeId,
    item: Item<'_>,
    off: usize,
    depth: usize,
) -> Result<(), Error> {
    let limits = *tree.limits();
    match item {
        Item::Map(len) => {
            limits.check_branches(len, off)?;
            for _ in 0..len {
                let key_off = cur.position();
                let key = cur.next_item()?;
                let value_off = cur.position();
                let value = cur.next_item()?;
                let child = if COMPACT && depth == 0 {
                    tscbor::decode_field(tree, node, (key, key_off), (value, value_off))?
                } else {
                    let Item::Text(name) = key else {
                        return Err(Error::new(ErrorCode::BadRequest, key_off));
                    };
                    tree.set(node, name, value_of(value, value_off, &limits)?)
                        .map_err(|e| e.or_at(value_off))?
                };
                descend::<COMPACT, A>(tree, cur, child, value, value_off, depth)?;
            }
        }
        Item::Array(len) => {
            limits.check_branches(len, off)?;
            for _ in 0..len {
                let value_off = cur.position();
                let value = cur.next_item()?;
                let child = tree
                    .push(node, value_of(value, value_off, &limits)?)
                    .map_err(|e| e.or_at(value_off))?;
                descend::<COMPACT, A>(tree, cur, child, value, value_off, depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn descend<const COMPACT: bool, A: NodeAlloc>(
    tree: &mut Tree<A>,
    cur: &mut Cursor<'_>,
    child: NodeId,
    item: Item<'_>,
    off: usize,
    depth: usize,
) -> Result<(), Error> {
    if matches!(item, Item::Map(_) | Item::Array(_)) {
        tree.limits().check_depth(depth + 1, off)?;
        fill::<COMPACT, A>(tree, cur, child, item, off, depth + 1)?;
    }
    Ok(())
}
