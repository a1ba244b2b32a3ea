//! Packing of textual UUIDs (`8-4-4-4-12` hex digits) into 16 raw bytes and back.

use alloc::string::String;

/// Length of the dashed textual form.
pub const UUID_TEXT_LEN: usize = 36;

/// Length of the packed form.
pub const UUID_BYTES_LEN: usize = 16;

const DASHES: [usize; 4] = [8, 13, 18, 23];
const HEX: &[u8; 16] = b"0123456789abcdef";

const fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Pack a 36-character dashed UUID into 16 bytes.
///
/// Returns `None` for anything that is not exactly 36 characters with dashes at positions
/// 8, 13, 18 and 23 and hex digits (either case) everywhere else.
#[must_use]
pub fn pack(text: &str) -> Option<[u8; UUID_BYTES_LEN]> {
    let bytes = text.as_bytes();
    if bytes.len() != UUID_TEXT_LEN {
        return None;
    }
    let mut out = [0u8; UUID_BYTES_LEN];
    let mut digits = 0usize;
    for (i, &c) in bytes.iter().enumerate() {
        if DASHES.contains(&i) {
            if c != b'-' {
                return None;
            }
            continue;
        }
        let n = nibble(c)?;
        out[digits / 2] |= if digits % 2 == 0 { n << 4 } else { n };
        digits += 1;
    }
    Some(out)
}

/// Format 16 bytes as a lower-case dashed UUID (dash after bytes 3, 5, 7 and 9).
#[must_use]
pub fn format(bytes: &[u8; UUID_BYTES_LEN]) -> String {
    let mut out = String::with_capacity(UUID_TEXT_LEN);
    for (i, &b) in bytes.iter().enumerate() {
        out.push(char::from(HEX[usize::from(b >> 4)]));
        out.push(char::from(HEX[usize::from(b & 0x0f)]));
        if matches!(i, 3 | 5 | 7 | 9) {
            out.push('-');
        }
    }
    out
}
