//! CBOR primitives shared by the generic and compact codecs: output sinks, the
//! major-type/argument encoder, and a pull-style decode cursor.

use alloc::vec::Vec;
use core::fmt;

use crate::alloc_util::try_reserve;
use crate::{Error, ErrorCode};

pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;

const SIMPLE_FALSE: u8 = 0xf4;
const SIMPLE_TRUE: u8 = 0xf5;
const SIMPLE_NULL: u8 = 0xf6;
const FLOAT32: u8 = 0xfa;

pub trait Sink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    fn write_u8(&mut self, byte: u8) -> Result<(), Error> {
        self.write(&[byte])
    }
}

/// Sink over a caller-owned buffer.
///
/// Writes never fail; the logical length keeps growing past the end of the buffer and
/// [`SliceSink::finish`] compares it against capacity once the encoder is done. Bytes past
/// capacity are dropped, so after a failed `finish` the buffer contents are unspecified.
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Check the final length (plus `slack` reserved bytes) against capacity.
    pub fn finish(self, slack: usize) -> Result<usize, Error> {
        let needed = self
            .len
            .checked_add(slack)
            .ok_or_else(|| Error::code_only(ErrorCode::OutOfMemory))?;
        if needed > self.buf.len() {
            return Err(Error::code_only(ErrorCode::OutOfMemory));
        }
        Ok(self.len)
    }
}

impl Sink for SliceSink<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let start = self.len;
        let end = start.saturating_add(bytes.len());
        if let Some(dst) = self.buf.get_mut(start..end) {
            dst.copy_from_slice(bytes);
        }
        self.len = end;
        Ok(())
    }
}

pub struct VecSink {
    buf: Vec<u8>,
}

impl VecSink {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let offset = self.buf.len();
        try_reserve(&mut self.buf, bytes.len(), offset)?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<(), Error> {
        let offset = self.buf.len();
        try_reserve(&mut self.buf, 1, offset)?;
        self.buf.push(byte);
        Ok(())
    }
}

/// Small stack buffer for rendering numbers with `core::fmt` before copying them to a sink.
pub struct TextBuf {
    buf: [u8; 64],
    len: usize,
}

impl TextBuf {
    pub const fn new() -> Self {
        Self {
            buf: [0; 64],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for TextBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len.checked_add(s.len()).ok_or(fmt::Error)?;
        let dst = self.buf.get_mut(self.len..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

pub fn encode_major_uint<S: Sink>(sink: &mut S, major: u8, value: u64) -> Result<(), Error> {
    debug_assert!(major <= 7);
    if let Ok(v8) = u8::try_from(value) {
        if v8 < 24 {
            return sink.write_u8((major << 5) | v8);
        }
        sink.write_u8((major << 5) | 24)?;
        return sink.write_u8(v8);
    }
    if let Ok(v16) = u16::try_from(value) {
        sink.write_u8((major << 5) | 25)?;
        return sink.write(&v16.to_be_bytes());
    }
    if let Ok(v32) = u32::try_from(value) {
        sink.write_u8((major << 5) | 26)?;
        return sink.write(&v32.to_be_bytes());
    }
    sink.write_u8((major << 5) | 27)?;
    sink.write(&value.to_be_bytes())
}

pub fn encode_len<S: Sink>(sink: &mut S, major: u8, len: usize) -> Result<(), Error> {
    let len = u64::try_from(len).map_err(|_| Error::code_only(ErrorCode::PayloadTooLarge))?;
    encode_major_uint(sink, major, len)
}

pub fn encode_int<S: Sink>(sink: &mut S, v: i32) -> Result<(), Error> {
    let v = i64::from(v);
    if v >= 0 {
        encode_major_uint(sink, MAJOR_UNSIGNED, v.unsigned_abs())
    } else {
        encode_major_uint(sink, MAJOR_NEGATIVE, (-1 - v).unsigned_abs())
    }
}

pub fn encode_text<S: Sink>(sink: &mut S, s: &str) -> Result<(), Error> {
    // `str` guarantees valid UTF-8.
    let b = s.as_bytes();
    encode_len(sink, MAJOR_TEXT, b.len())?;
    sink.write(b)
}

pub fn encode_bytes<S: Sink>(sink: &mut S, bytes: &[u8]) -> Result<(), Error> {
    encode_len(sink, MAJOR_BYTES, bytes.len())?;
    sink.write(bytes)
}

pub fn encode_f32<S: Sink>(sink: &mut S, v: f32) -> Result<(), Error> {
    let mut buf = [0u8; 5];
    buf[0] = FLOAT32;
    buf[1..5].copy_from_slice(&v.to_bits().to_be_bytes());
    sink.write(&buf)
}

pub fn encode_bool<S: Sink>(sink: &mut S, v: bool) -> Result<(), Error> {
    sink.write_u8(if v { SIMPLE_TRUE } else { SIMPLE_FALSE })
}

pub fn encode_null<S: Sink>(sink: &mut S) -> Result<(), Error> {
    sink.write_u8(SIMPLE_NULL)
}

/// One decoded CBOR data item header (plus payload for strings).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'a> {
    Unsigned(u64),
    /// Major type 1 argument `n`, representing `-1 - n`.
    Negative(u64),
    Bytes(&'a [u8]),
    Text(&'a str),
    Array(usize),
    Map(usize),
    Bool(bool),
    Null,
    Float(f32),
}

impl Item<'_> {
    /// The item as an `i32`, if it is an integer in range.
    pub fn as_i32(self, offset: usize) -> Result<Option<i32>, Error> {
        let v = match self {
            Self::Unsigned(v) => i64::try_from(v).ok(),
            Self::Negative(n) => i64::try_from(n).ok().map(|n| -1 - n),
            _ => return Ok(None),
        };
        v.and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| Error::new(ErrorCode::NotImplemented, offset))
    }
}

/// Pull-style cursor over a CBOR byte stream. Each call to [`Cursor::next_item`] consumes one
/// item header (and the payload of byte/text strings) and advances past it.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Fails with `BadRequest` if any bytes remain after the top-level item.
    pub const fn finish(&self) -> Result<(), Error> {
        if self.pos != self.data.len() {
            return Err(Error::new(ErrorCode::BadRequest, self.pos));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        let off = self.pos;
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::new(ErrorCode::BadRequest, off))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_exact(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let off = self.pos;
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| Error::new(ErrorCode::BadRequest, off))?;
        let s = self
            .data
            .get(self.pos..end)
            .ok_or_else(|| Error::new(ErrorCode::BadRequest, off))?;
        self.pos = end;
        Ok(s)
    }

    fn read_be<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let off = self.pos;
        self.read_exact(N)?
            .try_into()
            .map_err(|_| Error::new(ErrorCode::BadRequest, off))
    }

    fn read_arg(&mut self, ai: u8, off: usize) -> Result<u64, Error> {
        match ai {
            0..=23 => Ok(u64::from(ai)),
            24 => Ok(u64::from(self.read_u8()?)),
            25 => Ok(u64::from(u16::from_be_bytes(self.read_be()?))),
            26 => Ok(u64::from(u32::from_be_bytes(self.read_be()?))),
            27 => Ok(u64::from_be_bytes(self.read_be()?)),
            _ => Err(Error::new(ErrorCode::BadRequest, off)),
        }
    }

    fn read_len(&mut self, ai: u8, off: usize) -> Result<usize, Error> {
        if ai == 31 {
            return Err(Error::new(ErrorCode::NotImplemented, off));
        }
        let len = self.read_arg(ai, off)?;
        usize::try_from(len).map_err(|_| Error::new(ErrorCode::BadRequest, off))
    }

    /// Decode the next item.
    ///
    /// Tags, half-precision floats, `undefined`, other simple values and indefinite lengths
    /// are `NotImplemented`; truncated or reserved encodings are `BadRequest`.
    pub fn next_item(&mut self) -> Result<Item<'a>, Error> {
        let off = self.pos;
        let ib = self.read_u8()?;
        let major = ib >> 5;
        let ai = ib & 0x1f;

        match major {
            MAJOR_UNSIGNED => Ok(Item::Unsigned(self.read_arg(ai, off)?)),
            MAJOR_NEGATIVE => Ok(Item::Negative(self.read_arg(ai, off)?)),
            MAJOR_BYTES => {
                let len = self.read_len(ai, off)?;
                Ok(Item::Bytes(self.read_exact(len)?))
            }
            MAJOR_TEXT => {
                let len = self.read_len(ai, off)?;
                let bytes = self.read_exact(len)?;
                Ok(Item::Text(crate::utf8::validate(bytes, off)?))
            }
            MAJOR_ARRAY => Ok(Item::Array(self.read_len(ai, off)?)),
            MAJOR_MAP => Ok(Item::Map(self.read_len(ai, off)?)),
            MAJOR_TAG => Err(Error::new(ErrorCode::NotImplemented, off)),
            _ => match ai {
                20 => Ok(Item::Bool(false)),
                21 => Ok(Item::Bool(true)),
                22 => Ok(Item::Null),
                26 => Ok(Item::Float(f32::from_bits(u32::from_be_bytes(
                    self.read_be()?,
                )))),
                27 => {
                    #[allow(clippy::cast_possible_truncation)]
                    let v = f64::from_bits(u64::from_be_bytes(self.read_be()?)) as f32;
                    Ok(Item::Float(v))
                }
                28..=30 => Err(Error::new(ErrorCode::BadRequest, off)),
                // 25 is half precision; the rest are undefined/simple/break.
                _ => Err(Error::new(ErrorCode::NotImplemented, off)),
            },
        }
    }
}
