//! TS-CBOR: CBOR with dictionary-substituted keys at the top level.
//!
//! Fields of the root message (depth 1) whose names appear in [`KEYS`](crate::dict::KEYS)
//! are written with a small integer key. Their values follow the key's [`KeyKind`]: UUIDs
//! become 16-byte byte strings, kinds and actions become 1-based dictionary indices. Anything
//! that cannot be represented that way falls back to plain CBOR, so unknown kinds/actions
//! and non-UUID identifiers still round-trip. Below depth 1 the encoding is plain structural
//! CBOR.

use crate::access::Value;
use crate::cbor::{self, encode_node};
use crate::dict::{self, KeyEntry, KeyKind, ACTIONS, KINDS};
use crate::node::{NodeId, Payload};
use crate::store::NodeAlloc;
use crate::uuid::{self, UUID_BYTES_LEN};
use crate::wire::{self, Item, Sink, MAJOR_UNSIGNED};
use crate::{Error, ErrorCode, Tree};

pub(crate) fn encode<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    sink: &mut S,
) -> Result<(), Error> {
    encode_node::<true, A, S>(tree, id, 0, sink)
}

pub(crate) fn decode<A: NodeAlloc>(tree: &mut Tree<A>, bytes: &[u8]) -> Result<NodeId, Error> {
    cbor::decode_root::<true, A>(tree, bytes)
}

fn write_token<S: Sink>(sink: &mut S, entry: &KeyEntry) -> Result<(), Error> {
    wire::encode_major_uint(sink, MAJOR_UNSIGNED, u64::from(entry.token))
}

/// Write one field of the root message (key and value).
pub(crate) fn encode_field<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    child: NodeId,
    sink: &mut S,
) -> Result<(), Error> {
    let node = tree.node(child)?;
    let name = node.name();
    let Some(entry) = dict::key_by_name(name) else {
        return encode_literal(tree, child, name, sink);
    };

    match (entry.kind, &node.payload) {
        (KeyKind::Default, _) => {
            write_token(sink, entry)?;
            encode_node::<true, A, S>(tree, child, 1, sink)
        }
        (KeyKind::Uuid, Payload::String(s)) => match uuid::pack(s) {
            Some(packed) => {
                write_token(sink, entry)?;
                wire::encode_bytes(sink, &packed)
            }
            None => {
                tracing::trace!(key = name, "value is not a packable uuid, writing text");
                encode_literal(tree, child, name, sink)
            }
        },
        (KeyKind::Kind, Payload::String(s)) => {
            write_token(sink, entry)?;
            write_enum(sink, &KINDS, s)
        }
        (KeyKind::Action, Payload::String(s)) => {
            write_token(sink, entry)?;
            write_enum(sink, &ACTIONS, s)
        }
        // The tagged kind demands a string; anything else keeps its text key.
        _ => encode_literal(tree, child, name, sink),
    }
}

fn encode_literal<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    child: NodeId,
    name: &str,
    sink: &mut S,
) -> Result<(), Error> {
    wire::encode_text(sink, name)?;
    encode_node::<true, A, S>(tree, child, 1, sink)
}

fn write_enum<S: Sink>(sink: &mut S, table: &[&str], value: &str) -> Result<(), Error> {
    match dict::token_of(table, value) {
        Some(token) => wire::encode_major_uint(sink, MAJOR_UNSIGNED, token),
        None => {
            tracing::trace!(value, "not in dictionary, writing text");
            wire::encode_text(sink, value)
        }
    }
}

/// Read one field of the root message and store it under `parent`.
///
/// An integer key is resolved through the key dictionary before the value is interpreted;
/// the value's major type must then agree with the key's kind.
pub(crate) fn decode_field<A: NodeAlloc>(
    tree: &mut Tree<A>,
    parent: NodeId,
    (key, key_off): (Item<'_>, usize),
    (value, value_off): (Item<'_>, usize),
) -> Result<NodeId, Error> {
    let limits = *tree.limits();
    let (name, kind) = match key {
        Item::Text(name) => (name, KeyKind::Default),
        Item::Unsigned(token) => {
            let entry = dict::key_by_token(token)
                .ok_or_else(|| Error::new(ErrorCode::BadRequest, key_off))?;
            (entry.name, entry.kind)
        }
        _ => return Err(Error::new(ErrorCode::BadRequest, key_off)),
    };
    let bad = || Error::new(ErrorCode::BadRequest, value_off);

    let stored = match (kind, value) {
        (KeyKind::Default, value) => {
            tree.set(parent, name, cbor::value_of(value, value_off, &limits)?)
        }
        (KeyKind::Uuid, Item::Bytes(bytes)) => {
            let packed: &[u8; UUID_BYTES_LEN] = bytes.try_into().map_err(|_| bad())?;
            let text = uuid::format(packed);
            tree.set(parent, name, Value::String(&text))
        }
        (KeyKind::Kind | KeyKind::Action, Item::Unsigned(token)) => {
            let table: &'static [&'static str] = if kind == KeyKind::Kind {
                &KINDS
            } else {
                &ACTIONS
            };
            let text = dict::entry_of(table, token).ok_or_else(bad)?;
            tree.set(parent, name, Value::String(text))
        }
        (KeyKind::Kind | KeyKind::Action, Item::Text(text)) => {
            tree.set(parent, name, Value::String(text))
        }
        _ => return Err(bad()),
    };
    stored.map_err(|e| e.or_at(value_off))
}
