use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{Error, ErrorCode};

#[inline]
pub fn try_reserve<T>(v: &mut Vec<T>, additional: usize, offset: usize) -> Result<(), Error> {
    let needed = v
        .len()
        .checked_add(additional)
        .ok_or_else(|| Error::new(ErrorCode::OutOfMemory, offset))?;
    if needed <= v.capacity() {
        return Ok(());
    }
    v.try_reserve(additional)
        .map_err(|_| Error::new(ErrorCode::OutOfMemory, offset))
}

#[inline]
pub fn try_vec_with_capacity<T>(cap: usize) -> Result<Vec<T>, Error> {
    let mut v: Vec<T> = Vec::new();
    v.try_reserve_exact(cap)
        .map_err(|_| Error::code_only(ErrorCode::OutOfMemory))?;
    Ok(v)
}

/// Copy `s` into an exactly-sized owned buffer.
#[inline]
pub fn try_box_str(s: &str) -> Result<Box<str>, Error> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())
        .map_err(|_| Error::code_only(ErrorCode::OutOfMemory))?;
    out.push_str(s);
    Ok(out.into_boxed_str())
}
