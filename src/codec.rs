//! Wire-format selection: one entry point each for encoding a tree into bytes and decoding
//! bytes into a fresh tree.

use alloc::vec::Vec;
use core::fmt;

use crate::node::NodeId;
use crate::store::NodeAlloc;
use crate::wire::{Sink, SliceSink, VecSink};
use crate::{cbor, debug, json, tscbor, Error, ErrorCode, Tree};

/// A wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Diagnostic dump; encode only.
    Debug,
    /// Compact JSON text.
    Json,
    /// Structural CBOR with text keys.
    Cbor,
    /// CBOR with dictionary-substituted top-level keys and packed UUIDs.
    TsCbor,
}

impl Format {
    /// Bytes that must remain free after the encoded output in a caller buffer. Text formats
    /// keep one byte for a terminating NUL written by the caller.
    #[must_use]
    pub const fn slack(self) -> usize {
        match self {
            Self::Debug | Self::Json => 1,
            Self::Cbor | Self::TsCbor => 0,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Json => "json",
            Self::Cbor => "cbor",
            Self::TsCbor => "ts-cbor",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn encode_with<A: NodeAlloc, S: Sink>(
    tree: &Tree<A>,
    id: NodeId,
    format: Format,
    sink: &mut S,
) -> Result<(), Error> {
    match format {
        Format::Debug => debug::encode(tree, id, sink),
        Format::Json => json::encode(tree, id, sink),
        Format::Cbor => cbor::encode(tree, id, sink),
        Format::TsCbor => tscbor::encode(tree, id, sink),
    }
}

fn logged<T>(format: Format, op: &'static str, res: Result<T, Error>) -> Result<T, Error> {
    if let Err(err) = &res {
        tracing::debug!(%format, op, code = %err.code, offset = err.offset, "codec failed");
    }
    res
}

impl<A: NodeAlloc> Tree<A> {
    /// Encode `id` into `buf` and return the number of bytes written.
    ///
    /// The whole output (plus [`Format::slack`]) must fit; the check is made once the encoder
    /// has finished. On failure the contents of `buf` are unspecified.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if `buf` is too small, `PayloadTooLarge` if containers nest
    /// deeper than `max_depth` (except for [`Format::Debug`]) and `PreconditionFailed` for a
    /// stale handle.
    pub fn encode(&self, id: NodeId, format: Format, buf: &mut [u8]) -> Result<usize, Error> {
        let mut sink = SliceSink::new(buf);
        let res =
            encode_with(self, id, format, &mut sink).and_then(|()| sink.finish(format.slack()));
        if let Ok(len) = &res {
            tracing::trace!(%format, len, "encoded");
        }
        logged(format, "encode", res)
    }

    /// Encode `id` into a new vector (no slack byte is appended).
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` if the vector cannot grow, `PayloadTooLarge` if containers nest
    /// deeper than `max_depth` (except for [`Format::Debug`]) and `PreconditionFailed` for a
    /// stale handle.
    pub fn encode_to_vec(&self, id: NodeId, format: Format) -> Result<Vec<u8>, Error> {
        let mut sink = VecSink::new();
        let res = encode_with(self, id, format, &mut sink).map(|()| sink.into_vec());
        logged(format, "encode", res)
    }

    /// Decode `bytes` into a new root owned by the caller (destroy it with
    /// [`Tree::destroy`]). The root is a `Message` for a map/object, an `Array` for an array
    /// and a scalar node otherwise.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for malformed input, `NotImplemented` for unsupported constructs
    /// (and for [`Format::Debug`], which has no decoder), `PayloadTooLarge` when the document
    /// exceeds the tree's limits and `OutOfMemory` on allocation failure. Nothing stays
    /// allocated after a failure.
    pub fn decode(&mut self, bytes: &[u8], format: Format) -> Result<NodeId, Error> {
        let res = match format {
            Format::Debug => Err(Error::code_only(ErrorCode::NotImplemented)),
            Format::Json => json::decode(self, bytes),
            Format::Cbor => cbor::decode(self, bytes),
            Format::TsCbor => tscbor::decode(self, bytes),
        };
        if res.is_ok() {
            tracing::trace!(%format, len = bytes.len(), "decoded");
        }
        logged(format, "decode", res)
    }
}
