//! C ABI for embedding rosie.
//!
//! The library keeps one process-wide [`Runtime`](rosie_engine::Runtime),
//! installed by `rosie_initialize`. Every exported function follows the same
//! contract:
//!
//! 1. Clears the thread-local last error
//! 2. Performs the operation inside `catch_unwind`
//! 3. On failure: stores the message (see `rosie_last_error`) and returns a
//!    non-zero [`Status`](rosie_core::Status) code
//!
//! **Memory:**
//! - Descriptors passed in are borrowed for the duration of the call.
//! - Descriptors filled in by the library own their buffer and must be
//!   released with `rosie_free_string`.
//! - `rosie_last_error` returns a pointer owned by thread-local storage; do
//!   not free it.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod convert;
pub mod descriptor;
pub mod error;
pub mod exports;
pub mod runtime;


pub use descriptor::{MatchCode, RosieMatch, RosieString};
pub use error::{rosie_last_error, rosie_last_error_clear};
pub use exports::*;
