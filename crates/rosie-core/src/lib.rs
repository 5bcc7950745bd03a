#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared vocabulary for the rosie embedding library.
//!
//! - [`Status`]: integer result codes returned across the C boundary
//! - [`Colors`] / [`ColorMap`]: ANSI palettes for terminal output and the
//!   `color` match encoder

pub mod colors;
pub mod status;

#[cfg(test)]
mod status_tests;

pub use colors::{ColorMap, ColorSpecError, Colors};
pub use status::Status;

/// Library version reported by `config` and the `version` operation.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
