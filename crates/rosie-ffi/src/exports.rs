//! Exported `rosie_*` symbols.

use std::os::raw::{c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::ptr;
use std::str::FromStr;

use rosie_core::Status;
use rosie_engine::{Encoder, Error, PatternId, Result};

use crate::convert::{cstr_to_str, descriptor_array, descriptor_bytes, descriptor_str, to_c_int};
use crate::descriptor::{MatchCode, RosieMatch, RosieString};
use crate::error::{clear_last_error, set_last_error};
use crate::runtime;

/// Run `f` at the boundary: clear the last error, catch panics and turn
/// the outcome into a status code.
fn status(f: impl FnOnce() -> Result<()>) -> c_int {
    clear_last_error();
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Status::Ok.code(),
        Ok(Err(e)) => {
            set_last_error(e.to_string());
            e.status().code()
        }
        Err(_) => {
            set_last_error("internal error: panic in rosie");
            Status::Internal.code()
        }
    }
}

/// # Safety
/// `ptr` must be null or point to writable storage valid for `'a`.
unsafe fn out_param<'a, T>(ptr: *mut T, what: &str) -> Result<&'a mut T> {
    unsafe { ptr.as_mut() }.ok_or_else(|| Error::InvalidArgument(format!("{what} is a null pointer")))
}

/// Initialize rosie with its home directory.
///
/// # Returns
/// `0` on success (also when already initialized with the same home),
/// `AlreadyInitialized` for a different home.
///
/// # Safety
/// `home` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_initialize(home: *const c_char) -> c_int {
    status(|| {
        let home = unsafe { cstr_to_str(home, "home") }?;
        runtime::initialize(Path::new(home))
    })
}

/// Load a standard-library module; with non-zero `assign_name` it is bound
/// in every engine created afterwards.
///
/// # Safety
/// `name` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_require(name: *const c_char, assign_name: c_int) -> c_int {
    status(|| {
        let runtime = runtime::get()?;
        let name = unsafe { cstr_to_str(name, "name") }?;
        runtime.require(name, assign_name != 0)
    })
}

/// Execute operation `op` with `nargs` descriptors from `args`.
///
/// On success `out` owns the response bytes; release them with
/// `rosie_free_string`. On failure `out` is `{0, null}`.
///
/// # Safety
/// `op` must be a NUL-terminated string, `args` must point to `nargs`
/// valid descriptors (or be null when `nargs` is 0) and `out` must be
/// writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_api(
    op: *const c_char,
    args: *const RosieString,
    nargs: u32,
    out: *mut RosieString,
) -> c_int {
    status(|| {
        let out = unsafe { out_param(out, "out") }?;
        *out = RosieString::empty();
        let runtime = runtime::get()?;
        let op = unsafe { cstr_to_str(op, "op") }?;
        let args = unsafe { descriptor_array(args, nargs) }?;
        let response = runtime.dispatch_raw(op, &args)?;
        *out = RosieString::from_vec(response)?;
        Ok(())
    })
}

/// Create an engine and write its id to `eid`.
///
/// # Returns
/// `0` with a non-empty `eid` on success; `eid` stays `{0, null}` otherwise.
///
/// # Safety
/// `eid` must be writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_new_engine(eid: *mut RosieString) -> c_int {
    status(|| {
        let eid = unsafe { out_param(eid, "eid") }?;
        *eid = RosieString::empty();
        let id = runtime::get()?.new_engine()?;
        *eid = RosieString::from_vec(id.into_string().into_bytes())?;
        Ok(())
    })
}

/// Match `input` against compiled pattern `pat` of engine `eid`.
///
/// `out.data` holds the encoder output, or a [`MatchCode`] when its pointer
/// is null: no match, matched (`bool` encoder), invalid encoder or invalid
/// pattern. Those outcomes still return `0`.
///
/// # Safety
/// `eid` and `input` must be valid descriptors, `encoder` a NUL-terminated
/// string and `out` writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_match(
    eid: *const RosieString,
    pat: c_int,
    start: c_int,
    encoder: *const c_char,
    input: *const RosieString,
    out: *mut RosieMatch,
) -> c_int {
    status(|| {
        let out = unsafe { out_param(out, "out") }?;
        *out = RosieMatch::default();
        let runtime = runtime::get()?;
        let eid = unsafe { descriptor_str(eid, "eid") }?;
        let input = unsafe { descriptor_bytes(input, "input") }?;
        let encoder_name = unsafe { cstr_to_str(encoder, "encoder") }?;
        let start = usize::try_from(start)
            .map_err(|_| Error::InvalidArgument(format!("start position {start}")))?;

        let Ok(encoder) = Encoder::from_str(encoder_name) else {
            out.data = MatchCode::InvalidEncoder.descriptor();
            return Ok(());
        };
        let Some(pattern) = PatternId::new(pat) else {
            out.data = MatchCode::InvalidPattern.descriptor();
            return Ok(());
        };

        let result =
            match runtime.with_engine(eid, |e| e.match_input(pattern, input, start, encoder)) {
                Ok(result) => result,
                Err(Error::InvalidPattern(_)) => {
                    out.data = MatchCode::InvalidPattern.descriptor();
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

        out.data = match (result.matched, encoder) {
            (false, _) => MatchCode::NoMatch.descriptor(),
            (true, Encoder::Bool) => MatchCode::Matched.descriptor(),
            (true, _) => RosieString::from_vec(result.data)?,
        };
        out.leftover = to_c_int(result.leftover);
        out.abend = c_int::from(result.abend);
        out.ttotal = to_c_int(result.ttotal);
        out.tmatch = to_c_int(result.tmatch);
        Ok(())
    })
}

/// Log `msg` on behalf of program `pname`. Works before initialization.
///
/// # Safety
/// Both arguments must be null or NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_l_message(pname: *const c_char, msg: *const c_char) {
    status(|| {
        let pname = unsafe { cstr_to_str(pname, "pname") }?;
        let msg = unsafe { cstr_to_str(msg, "msg") }?;
        rosie_engine::log::message(pname, msg);
        Ok(())
    });
}

/// Raw pointer to the process-wide runtime, or null before initialization.
#[cfg(feature = "unstable-state")]
#[unsafe(no_mangle)]
pub extern "C" fn rosie_get_state() -> *const std::ffi::c_void {
    runtime::try_get().map_or(ptr::null(), |r| ptr::from_ref(r).cast())
}

/// Copy `len` bytes into a heap-allocated descriptor.
///
/// Release with `rosie_free_string_ptr`. Returns null on failure.
///
/// # Safety
/// `bytes` must point to `len` readable bytes (or be null when `len` is 0).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_string_ptr_from(bytes: *const u8, len: usize) -> *mut RosieString {
    let mut desc = ptr::null_mut();
    status(|| {
        let bytes = match (bytes.is_null(), len) {
            (_, 0) => &[][..],
            (true, _) => {
                return Err(Error::InvalidArgument("bytes is a null pointer".into()));
            }
            (false, _) => unsafe { std::slice::from_raw_parts(bytes, len) },
        };
        desc = Box::into_raw(Box::new(RosieString::from_bytes(bytes)?));
        Ok(())
    });
    desc
}

/// Release the buffer of a library-filled descriptor and reset it to `{0, null}`.
///
/// # Safety
/// `s` must be null or point to a descriptor filled by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_free_string(s: *mut RosieString) {
    if let Some(s) = unsafe { s.as_mut() } {
        unsafe { s.free() };
    }
}

/// Release a descriptor from `rosie_string_ptr_from`, buffer included.
///
/// # Safety
/// `s` must be null or a pointer returned by `rosie_string_ptr_from`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rosie_free_string_ptr(s: *mut RosieString) {
    if !s.is_null() {
        let mut desc = unsafe { Box::from_raw(s) };
        unsafe { desc.free() };
    }
}
