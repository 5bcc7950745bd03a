//! Thread-local last error for the C boundary.

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for `rosie_last_error`.
pub fn set_last_error(msg: impl Into<String>) {
    let msg = msg.into().replace('\0', "\\0");
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

pub fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Message of the last failed call on this thread, or null.
///
/// The pointer stays valid until the next `rosie_*` call on this thread.
/// Do not free it.
#[unsafe(no_mangle)]
pub extern "C" fn rosie_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        cell.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |s| s.as_ptr())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn rosie_last_error_clear() {
    clear_last_error();
}
