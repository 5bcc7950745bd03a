//! Argument conversion helpers.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::slice;

use rosie_engine::{Error, Result};

use crate::descriptor::RosieString;

/// Borrow a NUL-terminated UTF-8 string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{what} is a null pointer")));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| Error::InvalidArgument(format!("{what} is not valid UTF-8: {e}")))
}

/// Borrow the bytes of an input descriptor. Code descriptors are rejected.
///
/// # Safety
/// `desc` must be null or point to a valid descriptor for `'a`.
pub unsafe fn descriptor_bytes<'a>(desc: *const RosieString, what: &str) -> Result<&'a [u8]> {
    let desc = unsafe { desc.as_ref() }
        .ok_or_else(|| Error::InvalidArgument(format!("{what} is a null pointer")))?;
    if desc.is_code() {
        return Err(Error::InvalidArgument(format!(
            "{what} has a null buffer but length {}",
            desc.len
        )));
    }
    Ok(unsafe { desc.as_bytes() })
}

/// Borrow the bytes of an input descriptor as UTF-8.
///
/// # Safety
/// Same as [`descriptor_bytes`].
pub unsafe fn descriptor_str<'a>(desc: *const RosieString, what: &str) -> Result<&'a str> {
    let bytes = unsafe { descriptor_bytes(desc, what) }?;
    std::str::from_utf8(bytes)
        .map_err(|e| Error::InvalidArgument(format!("{what} is not valid UTF-8: {e}")))
}

/// Borrow an array of `n` descriptors.
///
/// # Safety
/// `ptr` must be null (only when `n` is 0) or point to `n` valid descriptors.
pub unsafe fn descriptor_array<'a>(ptr: *const RosieString, n: u32) -> Result<Vec<&'a [u8]>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!(
            "args is a null pointer but nargs is {n}"
        )));
    }
    let descs = unsafe { slice::from_raw_parts(ptr, n as usize) };
    descs
        .iter()
        .enumerate()
        .map(|(i, d)| unsafe { descriptor_bytes(d, &format!("argument {}", i + 1)) })
        .collect()
}

/// Saturating conversion for counts reported as C `int`.
pub fn to_c_int(n: impl TryInto<i32>) -> i32 {
    n.try_into().unwrap_or(i32::MAX)
}
