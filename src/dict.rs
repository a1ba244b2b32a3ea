//! Static dictionaries of the TS-CBOR wire format.
//!
//! The three tables below are part of the wire contract. Reordering, removing or inserting an
//! entry changes the meaning of bytes already in flight; any such change must bump
//! [`WIRE_VERSION`].

/// Version of the dictionaries below.
pub const WIRE_VERSION: u32 = 1;

/// How the value of a dictionary key is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Value is encoded structurally, as-is.
    Default,
    /// 36-character UUID string packed into a 16-byte byte string.
    Uuid,
    /// Message kind, 1-based index into [`KINDS`].
    Kind,
    /// Action verb, 1-based index into [`ACTIONS`].
    Action,
}

/// A well-known top-level field name and its wire token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    /// Integer emitted in place of the text key.
    pub token: u8,
    /// Field name.
    pub name: &'static str,
    /// Value interpretation.
    pub kind: KeyKind,
}

const fn key(token: u8, name: &'static str, kind: KeyKind) -> KeyEntry {
    KeyEntry { token, name, kind }
}

/// Key dictionary.
pub static KEYS: [KeyEntry; 10] = [
    key(1, "id", KeyKind::Uuid),
    key(2, "transactionid", KeyKind::Uuid),
    key(3, "kind", KeyKind::Kind),
    key(4, "version", KeyKind::Default),
    key(5, "action", KeyKind::Action),
    key(6, "fields", KeyKind::Default),
    key(7, "status", KeyKind::Default),
    key(8, "error", KeyKind::Default),
    key(9, "createdon", KeyKind::Default),
    key(10, "statistics", KeyKind::Default),
];

/// Kind dictionary; position + 1 is the wire value.
pub static KINDS: [&str; 7] = [
    "ts.event",
    "ts.event.firewall",
    "ts.event.log",
    "ts.event.service",
    "ts.event.suspend",
    "ts.event.cert",
    "ts.event.version",
];

/// Action dictionary; position + 1 is the wire value.
pub static ACTIONS: [&str; 6] = ["get", "set", "update", "delete", "request", "response"];

/// Look up a key by field name.
#[must_use]
pub fn key_by_name(name: &str) -> Option<&'static KeyEntry> {
    KEYS.iter().find(|k| k.name == name)
}

/// Look up a key by wire token.
#[must_use]
pub fn key_by_token(token: u64) -> Option<&'static KeyEntry> {
    KEYS.iter().find(|k| u64::from(k.token) == token)
}

/// Wire value (1-based) of `value` in `table`.
#[must_use]
pub fn token_of(table: &[&str], value: &str) -> Option<u64> {
    table
        .iter()
        .position(|&v| v == value)
        .and_then(|i| u64::try_from(i + 1).ok())
}

/// Entry of `table` for a 1-based wire value.
#[must_use]
pub fn entry_of(table: &'static [&'static str], token: u64) -> Option<&'static str> {
    let index = usize::try_from(token).ok()?.checked_sub(1)?;
    table.get(index).copied()
}
