//! JSON text codec.
//!
//! The encoder writes compact JSON (no whitespace) directly into a sink. The decoder hands
//! tokenizing to `serde_json` and rebuilds the resulting value tree through the accessor
//! layer.

use core::fmt::Write as _;

use serde_json::Value as Json;

use crate::access::Value;
use crate::node::{NodeId, Payload};
use crate::store::NodeAlloc;
use crate::wire::{Sink, TextBuf};
use crate::{Error, ErrorCode, Limits, Tree};

pub(crate) fn encode<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    sink: &mut S,
) -> Result<(), Error> {
    encode_at(tree, id, 0, sink)
}

fn encode_at<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    depth: usize,
    sink: &mut S,
) -> Result<(), Error> {
    match &tree.node(id)?.payload {
        Payload::Integer(v) => {
            let mut text = TextBuf::new();
            write!(text, "{v}").map_err(|_| Error::code_only(ErrorCode::OutOfMemory))?;
            sink.write(text.as_bytes())
        }
        Payload::Float(v) => write_float(sink, *v),
        Payload::Boolean(true) => sink.write(b"true"),
        Payload::Boolean(false) => sink.write(b"false"),
        Payload::String(s) | Payload::Cert(s) => write_str(sink, s),
        Payload::Null => sink.write(b"null"),
        Payload::Message(slots) => {
            tree.limits().check_depth(depth, 0)?;
            sink.write_u8(b'{')?;
            for (i, &child) in slots.iter().enumerate() {
                if i > 0 {
                    sink.write_u8(b',')?;
                }
                write_str(sink, tree.node(child)?.name())?;
                sink.write_u8(b':')?;
                encode_at(tree, child, depth + 1, sink)?;
            }
            sink.write_u8(b'}')
        }
        Payload::Array(slots) => {
            tree.limits().check_depth(depth, 0)?;
            sink.write_u8(b'[')?;
            for (i, &child) in slots.iter().enumerate() {
                if i > 0 {
                    sink.write_u8(b',')?;
                }
                encode_at(tree, child, depth + 1, sink)?;
            }
            sink.write_u8(b']')
        }
    }
}

/// Floats always carry a fraction or exponent so they decode back as `Float`.
/// Non-finite values have no JSON spelling and are written as `null`.
fn write_float<S: Sink>(sink: &mut S, v: f32) -> Result<(), Error> {
    if !v.is_finite() {
        return sink.write(b"null");
    }
    let mut text = TextBuf::new();
    write!(text, "{v}").map_err(|_| Error::code_only(ErrorCode::OutOfMemory))?;
    sink.write(text.as_bytes())?;
    if !text.as_bytes().iter().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        sink.write(b".0")?;
    }
    Ok(())
}

fn write_str<S: Sink>(sink: &mut S, s: &str) -> Result<(), Error> {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    sink.write_u8(b'"')?;
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape: &[u8] = match b {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => b"",
            _ => continue,
        };
        sink.write(&bytes[start..i])?;
        if escape.is_empty() {
            sink.write(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[usize::from(b >> 4)],
                HEX[usize::from(b & 0x0f)],
            ])?;
        } else {
            sink.write(escape)?;
        }
        start = i + 1;
    }
    sink.write(&bytes[start..])?;
    sink.write_u8(b'"')
}

pub(crate) fn decode<A: NodeAlloc>(tree: &mut Tree<A>, bytes: &[u8]) -> Result<NodeId, Error> {
    let doc: Json =
        serde_json::from_slice(bytes).map_err(|_| Error::new(ErrorCode::BadRequest, 0))?;
    let limits = *tree.limits();
    let root = tree.create_root(value_of(&doc, &limits))?;
    if let Err(err) = fill(tree, root, &doc, 0) {
        tree.release(root);
        return Err(err);
    }
    Ok(root)
}

/// Map a JSON token to a node value. Integral tokens that fit in 32 bits become `Integer`;
/// every other number is a `Float`.
fn value_of<'j>(doc: &'j Json, limits: &Limits) -> Value<'j> {
    match doc {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Value::Integer(i),
            #[allow(clippy::cast_possible_truncation)]
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN) as f32),
        },
        Json::String(s) if s.len() > limits.max_string_len => Value::Cert(s),
        Json::String(s) => Value::String(s),
        Json::Array(_) => Value::Array,
        Json::Object(_) => Value::Message,
    }
}

fn fill<A: NodeAlloc>(
    tree: &mut Tree<A>,
    node: NodeId,
    doc: &Json,
    depth: usize,
) -> Result<(), Error> {
    let limits = *tree.limits();
    match doc {
        Json::Object(map) => {
            limits.check_branches(map.len(), 0)?;
            for (key, item) in map {
                let child = tree.set(node, key, value_of(item, &limits))?;
                descend(tree, child, item, depth)?;
            }
        }
        Json::Array(items) => {
            limits.check_branches(items.len(), 0)?;
            for item in items {
                let child = tree.push(node, value_of(item, &limits))?;
                descend(tree, child, item, depth)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn descend<A: NodeAlloc>(
    tree: &mut Tree<A>,
    child: NodeId,
    item: &Json,
    depth: usize,
) -> Result<(), Error> {
    if matches!(item, Json::Array(_) | Json::Object(_)) {
        tree.limits().check_depth(depth + 1, 0)?;
        fill(tree, child, item, depth + 1)?;
    }
    Ok(())
}
