//! # ts-cbor
//!
//! A bounded message-tree model for constrained IoT endpoints, with four wire formats.
//!
//! ## Model
//!
//! A [`Tree`] is an arena of typed nodes addressed by [`NodeId`] handles. A node is a scalar
//! (`Integer`, `Float`, `Boolean`, `String`, `Cert`, `Null`) or a container (`Message`, keyed
//! by field name; `Array`, indexed). Containers hold at most [`Limits::max_branches`] children
//! and arrays never contain gaps.
//!
//! - **Explicit ownership.** Roots come from [`Tree::create`], [`Tree::create_copy`] or
//!   [`Tree::decode`] and are released with [`Tree::destroy`]. Each node carries a reference
//!   count ([`Tree::retain`]); storing a node into another container deep-copies it.
//! - **Stale handles are detected.** A handle to a freed node fails with `PreconditionFailed`
//!   instead of aliasing whatever reused the slot.
//! - **Pluggable storage.** [`HeapAlloc`] grows on demand; [`PoolAlloc`] is a fixed pool that
//!   reports `OutOfMemory` when exhausted.
//!
//! ## Formats
//!
//! | [`Format`] | Encode | Decode |
//! |---|---|---|
//! | `Debug` | `name:type(value)` dump | no |
//! | `Json` | compact JSON | yes |
//! | `Cbor` | structural CBOR, text keys, float32 | yes |
//! | `TsCbor` | CBOR with dictionary keys and packed UUIDs at the top level | yes |
//!
//! The TS-CBOR dictionaries live in [`dict`] and are versioned by [`WIRE_VERSION`].
//!
//! ```
//! use ts_cbor::{Format, Tree};
//!
//! let mut tree = Tree::new();
//! let msg = tree.create()?;
//! tree.set_str(msg, "action", "get")?;
//! tree.set_int(msg, "version", 1)?;
//!
//! let json = tree.encode_to_vec(msg, Format::Json)?;
//! assert_eq!(json, br#"{"action":"get","version":1}"#);
//!
//! let compact = tree.encode_to_vec(msg, Format::TsCbor)?;
//! let back = tree.decode(&compact, Format::TsCbor)?;
//! assert_eq!(tree.get_str(back, "action")?, "get");
//!
//! tree.destroy(back)?;
//! tree.destroy(msg)?;
//! assert_eq!(tree.live_nodes(), 0);
//! # Ok::<(), ts_cbor::Error>(())
//! ```
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`Error`].
//! - `simdutf8`: enables SIMD-accelerated UTF-8 validation of CBOR text strings.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible and requires `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

extern crate alloc;

mod access;
mod alloc_util;
mod cbor;
mod codec;
mod debug;
pub mod dict;
mod error;
mod json;
mod limits;
mod node;
mod store;
mod tree;
mod tscbor;
pub(crate) mod utf8;
pub mod uuid;
mod wire;

pub use crate::access::Value;
pub use crate::codec::Format;
pub use crate::debug::Dump;
pub use crate::dict::WIRE_VERSION;
pub use crate::error::{Error, ErrorCode};
pub use crate::limits::{
    Limits, DEFAULT_MAX_BRANCHES, DEFAULT_MAX_CERT_LEN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NAME_LEN,
    DEFAULT_MAX_STRING_LEN,
};
pub use crate::node::{Node, NodeId, NodeType, ROOT_NAME};
pub use crate::store::{HeapAlloc, NodeAlloc, PoolAlloc};
pub use crate::tree::Tree;
