use core::fmt;

/// A structured status code identifying why an operation was rejected.
///
/// The set is closed and string-free so it stays usable on `no_std` targets and cheap to
/// branch on. Every code is local to a single accessor/encode/decode call; nothing is retried
/// internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Caller-side logic error: wrong node type for the operation, stale handle, invalid limits.
    PreconditionFailed,
    /// The requested field or array index is absent.
    NotFound,
    /// A configured limit was exceeded (branches, name/string length, depth).
    PayloadTooLarge,
    /// Storage was exhausted: node pool full, output buffer too small, allocation failure.
    OutOfMemory,
    /// Malformed decoder input, or removal of an array element other than the last.
    BadRequest,
    /// An array write past the current end (would create a gap).
    IndexOutOfRange,
    /// A wire construct that is recognised but not supported (half floats, tags, 64-bit ints).
    NotImplemented,
}

impl ErrorCode {
    const fn message(self) -> &'static str {
        match self {
            Self::PreconditionFailed => "precondition failed",
            Self::NotFound => "not found",
            Self::PayloadTooLarge => "payload too large",
            Self::OutOfMemory => "out of memory",
            Self::BadRequest => "bad request",
            Self::IndexOutOfRange => "index out of range",
            Self::NotImplemented => "not implemented",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// An error with a stable code and a byte offset.
///
/// Offsets are meaningful for decode errors (position in the input where the fault was
/// detected). Accessor and encoder errors carry offset `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset into decoder input (0 when not applicable).
    pub offset: usize,
}

impl Error {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// Construct an error that has no meaningful input offset.
    #[inline]
    #[must_use]
    pub const fn code_only(code: ErrorCode) -> Self {
        Self { code, offset: 0 }
    }

    /// Attach a decode offset to an error raised without one (accessor failures while
    /// rebuilding a tree).
    #[inline]
    #[must_use]
    pub(crate) const fn or_at(self, offset: usize) -> Self {
        if self.offset == 0 {
            Self::new(self.code, offset)
        } else {
            self
        }
    }

    /// Returns true iff the error is the expected "absent field/index" outcome.
    #[inline]
    #[must_use]
    pub const fn is_not_found(self) -> bool {
        matches!(self.code, ErrorCode::NotFound)
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Self::code_only(code)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset == 0 {
            write!(f, "ts-cbor: {}", self.code)
        } else {
            write!(f, "ts-cbor: {} at {}", self.code, self.offset)
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
