#[cfg(feature = "simdutf8")]
use simdutf8::basic as simd_utf8;

use crate::{Error, ErrorCode};

/// Validates UTF-8 bytes read off the wire and returns a borrowed `&str` on success.
///
/// Invalid text is malformed input (`BadRequest` at `offset`).
#[inline]
pub fn validate(bytes: &[u8], offset: usize) -> Result<&str, Error> {
    #[cfg(feature = "simdutf8")]
    {
        simd_utf8::from_utf8(bytes).map_err(|_| Error::new(ErrorCode::BadRequest, offset))
    }

    #[cfg(not(feature = "simdutf8"))]
    {
        core::str::from_utf8(bytes).map_err(|_| Error::new(ErrorCode::BadRequest, offset))
    }
}
