//! Length-prefixed byte buffers passed across the C boundary.

use std::ptr;
use std::slice;

use rosie_engine::{Error, Result};

/// A byte buffer: `len` valid bytes at `ptr`, not NUL-terminated.
///
/// A null `ptr` with a non-zero `len` is a *code descriptor*: `len` carries
/// a small result code instead of a length.
#[repr(C)]
#[derive(Debug)]
pub struct RosieString {
    pub len: u32,
    pub ptr: *mut u8,
}

impl RosieString {
    /// `{0, null}`.
    pub const fn empty() -> Self {
        Self {
            len: 0,
            ptr: ptr::null_mut(),
        }
    }

    /// A code descriptor carrying `code` in `len`.
    pub const fn code(code: u32) -> Self {
        Self {
            len: code,
            ptr: ptr::null_mut(),
        }
    }

    /// Take ownership of `bytes`. Release with [`RosieString::free`].
    ///
    /// The pointer is non-null even for an empty buffer, which keeps an
    /// empty result apart from `{0, null}`.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            Error::InvalidArgument(format!(
                "buffer of {} bytes is too long for a descriptor",
                bytes.len()
            ))
        })?;
        let ptr = Box::into_raw(bytes.into_boxed_slice()).cast::<u8>();
        Ok(Self { len, ptr })
    }

    /// Copy `bytes` into a new descriptor.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_vec(bytes.to_vec())
    }

    pub fn is_code(&self) -> bool {
        self.ptr.is_null() && self.len != 0
    }

    /// View the buffer. Null descriptors (including code descriptors) are empty.
    ///
    /// # Safety
    /// `ptr` must be null or point to at least `len` readable bytes that stay
    /// valid and unmodified for the returned lifetime.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        if self.ptr.is_null() {
            return &[];
        }
        unsafe { slice::from_raw_parts(self.ptr, self.len as usize) }
    }

    /// Release a buffer created by this library and reset to `{0, null}`.
    ///
    /// # Safety
    /// The descriptor must be empty, a code descriptor, or own a buffer made
    /// by [`RosieString::from_vec`] that has not been freed yet.
    pub unsafe fn free(&mut self) {
        if !self.ptr.is_null() {
            let raw = ptr::slice_from_raw_parts_mut(self.ptr, self.len as usize);
            drop(unsafe { Box::from_raw(raw) });
        }
        *self = Self::empty();
    }
}

impl Default for RosieString {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of `rosie_match`.
///
/// When `data.ptr` is null, `data.len` is a [`MatchCode`].
#[repr(C)]
#[derive(Debug, Default)]
pub struct RosieMatch {
    pub data: RosieString,
    /// Input bytes after the match.
    pub leftover: i32,
    pub abend: i32,
    /// Microseconds for the whole call.
    pub ttotal: i32,
    /// Microseconds spent matching.
    pub tmatch: i32,
}

/// Codes carried by a null `RosieMatch::data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum MatchCode {
    NoMatch = 0,
    Matched = 1,
    InvalidEncoder = 2,
    InvalidPattern = 4,
}

impl MatchCode {
    pub fn descriptor(self) -> RosieString {
        RosieString::code(self as u32)
    }
}
